//! Rewriter contract: locator → path, path → absolute URL, generic tags.
//!
//! The rewriter is authoritative for path shape. The index only decides
//! which locators need a record and stores what the rewriter returns.
//!
//! Tag rendering is split in two: [`Rewriter::generic_seo`] produces the
//! values the rewriter would emit on its own, and the formatters on
//! [`GenericSeo`] turn those values into tags. The SEO layer overrides
//! values on a copy before formatting.

mod slug;

pub use slug::SlugRewriter;

use std::collections::BTreeMap;
use thiserror::Error;

use crate::config::TITLE_PLACEHOLDER;
use crate::core::UrlPath;

/// What to build a path for.
#[derive(Debug, Clone, Copy)]
pub struct Locator<'a> {
    /// Article the path is mounted under.
    pub article_id: u32,
    pub clang_id: u32,
    /// Dataset slug values appended below the article path.
    pub segments: &'a [String],
}

impl<'a> Locator<'a> {
    /// Locator of a whole article.
    pub const fn article(article_id: u32, clang_id: u32) -> Self {
        Self {
            article_id,
            clang_id,
            segments: &[],
        }
    }

    pub fn with_segments(mut self, segments: &'a [String]) -> Self {
        self.segments = segments;
        self
    }
}

/// Path building failures, isolated per item by callers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RewriteError {
    #[error("article {article_id} does not exist in language {clang_id}")]
    MissingArticle { article_id: u32, clang_id: u32 },

    #[error("no slug text for article {article_id} in language {clang_id}")]
    EmptyPath { article_id: u32, clang_id: u32 },
}

/// Path and URL primitives plus the generic tag values.
pub trait Rewriter {
    /// Encoded path (no scheme or host) for a locator.
    fn path(&self, locator: &Locator<'_>) -> Result<UrlPath, RewriteError>;

    /// Scheme and host for a language, without trailing slash.
    fn origin(&self, clang_id: u32) -> String;

    /// Absolute URL of a stored path.
    fn absolute(&self, path: &UrlPath, clang_id: u32) -> String {
        format!("{}{}", self.origin(clang_id), path)
    }

    /// Tag values the rewriter renders when no URL record applies.
    fn generic_seo(&self, article_id: u32, clang_id: u32) -> GenericSeo;
}

/// Tag values before formatting. Text fields are attribute-escaped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenericSeo {
    /// Page title substituted into `title_pattern`.
    pub title: String,
    /// Template containing [`TITLE_PLACEHOLDER`].
    pub title_pattern: String,
    pub description: String,
    pub robots: String,
    pub canonical: String,
    /// Site name for social cards.
    pub site_name: String,
    /// Language code → absolute URL.
    pub hreflang: BTreeMap<String, String>,
}

impl GenericSeo {
    /// Title with the pattern applied.
    pub fn title(&self) -> String {
        if self.title_pattern.is_empty() {
            return self.title.clone();
        }
        self.title_pattern.replace(TITLE_PLACEHOLDER, &self.title)
    }

    pub fn title_tag(&self) -> String {
        format!("<title>{}</title>", self.title())
    }

    pub fn description_tag(&self) -> String {
        format!(r#"<meta name="description" content="{}" />"#, self.description)
    }

    pub fn robots_tag(&self) -> String {
        format!(r#"<meta name="robots" content="{}" />"#, self.robots)
    }

    pub fn canonical_tag(&self) -> String {
        format!(r#"<link rel="canonical" href="{}" />"#, self.canonical)
    }

    /// One alternate link per language, ordered by code.
    pub fn hreflang_tags(&self) -> String {
        self.hreflang
            .iter()
            .map(|(code, url)| format!(r#"<link rel="alternate" hreflang="{code}" href="{url}" />"#))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
