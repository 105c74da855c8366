//! The tag set of one rendered page.

use super::og::{ImageTag, SocialTags};
use crate::rewriter::GenericSeo;
use crate::utils::html::{escape_attr, strip_tags, unescape};

/// Formatted head tags. Values are attribute-safe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeoTags {
    /// Rewriter values, with overrides applied for managed pages.
    pub values: GenericSeo,
    pub social: Option<SocialTags>,
    pub image: Option<ImageTag>,
}

impl SeoTags {
    /// Tags exactly as the rewriter renders them.
    pub fn generic(values: GenericSeo) -> Self {
        Self {
            values,
            social: None,
            image: None,
        }
    }

    pub fn title_tag(&self) -> String {
        self.values.title_tag()
    }

    pub fn description_tag(&self) -> String {
        self.values.description_tag()
    }

    pub fn robots_tag(&self) -> String {
        self.values.robots_tag()
    }

    pub fn canonical_tag(&self) -> String {
        self.values.canonical_tag()
    }

    /// Every tag in head order.
    pub fn tags(&self) -> Vec<String> {
        let mut tags = vec![
            self.title_tag(),
            self.description_tag(),
            self.robots_tag(),
            self.canonical_tag(),
        ];
        tags.extend(
            self.values
                .hreflang_tags()
                .lines()
                .filter(|line| !line.is_empty())
                .map(str::to_string),
        );
        if let Some(social) = &self.social {
            tags.extend(social.tags());
        }
        if let Some(image) = &self.image {
            tags.extend(image.tags());
        }
        tags
    }

    pub fn render(&self) -> String {
        self.tags().join("\n")
    }
}

/// Stored text → attribute-safe single line.
///
/// Markup is stripped, line breaks become spaces, entities are decoded and
/// the result is escaped again.
pub fn normalize(text: &str) -> String {
    let plain = strip_tags(text);
    let single_line: String = plain
        .chars()
        .filter(|&c| c != '\r')
        .map(|c| if c == '\n' { ' ' } else { c })
        .collect();
    let decoded = unescape(&single_line);
    escape_attr(decoded.trim()).into_owned()
}
