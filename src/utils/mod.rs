//! Text and time helpers shared by the index layers.

pub mod date;
pub mod html;
pub mod slug;
