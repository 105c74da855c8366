//! Core types - pure abstractions shared across the codebase.

mod context;
mod url;

pub use context::{IndexContext, RenderContext};
pub use url::UrlPath;
