//! Collaborators shared by the resolution, SEO and sitemap layers.

use crate::content::{ContentRepository, MediaRepository};
use crate::db::Database;
use crate::index::UrlStore;
use crate::profile::ProfileRegistry;
use crate::rewriter::Rewriter;

/// Borrowed view of everything an index operation talks to.
///
/// Cheap to copy; scoped to one command or render pass.
#[derive(Clone, Copy)]
pub struct IndexContext<'a> {
    pub db: &'a dyn Database,
    pub store: &'a UrlStore<'a>,
    pub registry: &'a ProfileRegistry,
    pub rewriter: &'a dyn Rewriter,
    pub content: &'a dyn ContentRepository,
    pub media: &'a dyn MediaRepository,
}

/// What is being rendered, scoped to one render pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderContext {
    pub article_id: u32,
    pub clang_id: u32,
    /// Request path or full URL of the page.
    pub path: String,
}

impl RenderContext {
    pub fn new(article_id: u32, clang_id: u32, path: impl Into<String>) -> Self {
        Self {
            article_id,
            clang_id,
            path: path.into(),
        }
    }
}
