//! Render-time post-processing of already rendered output.
//!
//! Runs once per render pass, after the page body is complete:
//!
//! ```text
//! rendered HTML ──▶ LinkInterpolator ──▶ HTML with absolute URLs
//! ```

mod link;

pub use link::LinkInterpolator;
