//! Index generators.
//!
//! - **Resolve**: content items → URL records ([`resolve::UrlBuilder`])
//! - **Regen**: invalidation and rebuild per trigger ([`regen::Generator`])
//! - **Sitemap**: URL records → `sitemap.xml` ([`sitemap::SitemapBuilder`])
//!
//! Every generator works on a borrowed [`IndexContext`](crate::core::IndexContext).

pub mod regen;
pub mod resolve;
pub mod sitemap;

use std::borrow::Cow;

/// Escape the five XML special characters.
pub fn escape_xml(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 16);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Strip indentation and line breaks between elements when enabled.
pub fn minify_xml(content: &str, enabled: bool) -> Cow<'_, str> {
    if !enabled {
        return Cow::Borrowed(content);
    }
    Cow::Owned(
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect(),
    )
}
