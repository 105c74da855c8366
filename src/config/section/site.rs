//! `[site]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [site]
//! url = "https://example.com"          # Origin used for absolute URLs
//! name = "Example"                     # Site name (og:site_name, default title)
//! title_pattern = "%T | Example"       # Generic title template, `%T` = page title
//! description = "Default description"
//! start_article = 1                    # Article whose path is `/`
//! lang_prefix = "auto"                 # auto | always | never
//!
//! [site.domains]                       # Optional per-language origins
//! de = "https://example.de"
//! ```

use crate::config::{ConfigDiagnostics, FieldPath};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Placeholder for the page title inside `title_pattern`.
pub const TITLE_PLACEHOLDER: &str = "%T";

/// When to prefix paths with the language code.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LangPrefix {
    /// Prefix only when more than one language exists (default).
    #[default]
    Auto,
    Always,
    Never,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Scheme and host, e.g. `https://example.com`.
    pub url: String,
    pub name: String,
    pub title_pattern: Option<String>,
    pub description: String,
    pub start_article: u32,
    pub lang_prefix: LangPrefix,
    /// Language code → origin, for sites served from several hosts.
    pub domains: BTreeMap<String, String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost".into(),
            name: String::new(),
            title_pattern: None,
            description: String::new(),
            start_article: 1,
            lang_prefix: LangPrefix::Auto,
            domains: BTreeMap::new(),
        }
    }
}

impl SiteConfig {
    /// Origin (scheme + host, no trailing slash) for a language code.
    pub fn origin(&self, code: Option<&str>) -> &str {
        code.and_then(|c| self.domains.get(c))
            .unwrap_or(&self.url)
            .trim_end_matches('/')
    }

    /// Generic title template with the `%T` placeholder.
    pub fn title_pattern(&self) -> String {
        match &self.title_pattern {
            Some(pattern) => pattern.clone(),
            None if self.name.is_empty() => TITLE_PLACEHOLDER.to_string(),
            None => format!("{TITLE_PLACEHOLDER} / {}", self.name),
        }
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        for (field, origin) in std::iter::once((FieldPath::new("site.url"), &self.url))
            .chain(self.domains.values().map(|d| (FieldPath::new("site.domains"), d)))
        {
            let valid = url::Url::parse(origin).is_ok_and(|u| u.has_host());
            if !valid {
                diag.error_with_hint(
                    field,
                    format!("`{origin}` is not an absolute URL"),
                    "use scheme and host, e.g. \"https://example.com\"",
                );
            }
        }

        if let Some(pattern) = &self.title_pattern
            && !pattern.contains(TITLE_PLACEHOLDER)
        {
            diag.error(
                FieldPath::new("site.title_pattern"),
                format!("pattern must contain the `{TITLE_PLACEHOLDER}` placeholder"),
            );
        }
    }
}
