//! Command-line interface module.

mod args;
pub mod common;
pub mod links;
pub mod rebuild;
pub mod seo;
pub mod sitemap;

pub use args::{Cli, Commands};
