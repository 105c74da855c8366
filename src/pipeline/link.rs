//! Structured locator substitution.
//!
//! Authors embed `table://<table>-<id>[-<clang>]` in content. Each locator
//! is replaced by the absolute canonical URL of that row, or removed when
//! no record exists.
//!
//! | Locator                | Language used       |
//! |------------------------|---------------------|
//! | `table://news-42`      | the rendered page's |
//! | `table://news-42-2`    | 2                   |
//! | `TABLE://News-42`      | matched as `news`   |
//!
//! A slash right after the locator belongs to it.

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;

use crate::core::{IndexContext, RenderContext};
use crate::debug;

static LOCATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)table://(\w+?)-(\d+)(?:-(\d+))?\b/?").unwrap());

/// Replaces structured locators with URLs from the store.
pub struct LinkInterpolator<'a> {
    ctx: IndexContext<'a>,
}

impl<'a> LinkInterpolator<'a> {
    pub fn new(ctx: IndexContext<'a>) -> Self {
        Self { ctx }
    }

    /// Substitute every locator in `text`.
    ///
    /// Resolved URLs never match the locator pattern, so a second pass over
    /// the output is a no-op.
    pub fn interpolate<'t>(&self, text: &'t str, render: &RenderContext) -> Cow<'t, str> {
        LOCATOR.replace_all(text, |caps: &Captures<'_>| self.resolve(caps, render.clang_id))
    }

    fn resolve(&self, caps: &Captures<'_>, default_clang: u32) -> String {
        let table = &caps[1];
        let Ok(data_id) = caps[2].parse::<u64>() else {
            return String::new();
        };
        let clang_id = caps
            .get(3)
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .unwrap_or(default_clang);

        self.lookup(table, data_id, clang_id).unwrap_or_default()
    }

    /// Absolute canonical URL of one row, if indexed.
    pub fn lookup(&self, table: &str, data_id: u64, clang_id: u32) -> Option<String> {
        let profile = self.ctx.registry.by_table_for_lang(table, clang_id)?;
        let record = match self.ctx.store.origin(profile.id, data_id, clang_id) {
            Ok(record) => record?,
            Err(e) => {
                debug!("links"; "{}-{}-{}: {}", table, data_id, clang_id, e);
                return None;
            }
        };
        Some(self.ctx.rewriter.absolute(&record.url, clang_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::regen::{Generator, Mode};
    use crate::testing::Fixture;

    fn interpolate(fixture: &Fixture, text: &str, clang_id: u32) -> String {
        let parts = fixture.parts();
        let ctx = parts.context();
        Generator::new(ctx).execute(&Mode::All).unwrap();
        let render = RenderContext::new(3, clang_id, "/");
        LinkInterpolator::new(ctx).interpolate(text, &render).into_owned()
    }

    #[test]
    fn test_explicit_language() {
        let fixture = Fixture::new();
        assert_eq!(
            interpolate(&fixture, r#"<a href="table://news-42-2">x</a>"#, 1),
            r#"<a href="https://example.com/de/neuigkeiten/hello-world/">x</a>"#
        );
    }

    #[test]
    fn test_render_language_and_case() {
        let fixture = Fixture::new();
        assert_eq!(
            interpolate(&fixture, "see TABLE://News-43.", 1),
            "see https://example.com/en/news/second-post/."
        );
    }

    #[test]
    fn test_trailing_slash_consumed() {
        let fixture = Fixture::new();
        assert_eq!(
            interpolate(&fixture, r#"<a href="table://news-42/">x</a>"#, 1),
            r#"<a href="https://example.com/en/news/hello-world/">x</a>"#
        );
        assert_eq!(
            interpolate(&fixture, r#"<a href="table://news-42-2/">x</a>"#, 1),
            r#"<a href="https://example.com/de/neuigkeiten/hello-world/">x</a>"#
        );
    }

    #[test]
    fn test_unknown_row_is_removed() {
        let fixture = Fixture::new();
        assert_eq!(interpolate(&fixture, "[table://news-99]", 1), "[]");
        assert_eq!(interpolate(&fixture, "[table://shop-1-1]", 1), "[]");
        // Outside the dataset
        assert_eq!(interpolate(&fixture, "[table://news-44]", 1), "[]");
    }

    #[test]
    fn test_malformed_locator_untouched() {
        let fixture = Fixture::new();
        let text = "table://news-abc and table:/news-42";
        assert_eq!(interpolate(&fixture, text, 1), text);
    }

    #[test]
    fn test_idempotent() {
        let fixture = Fixture::new();
        let parts = fixture.parts();
        let ctx = parts.context();
        Generator::new(ctx).execute(&Mode::All).unwrap();
        let links = LinkInterpolator::new(ctx);
        let render = RenderContext::new(1, 3, "/fr/");

        let once = links.interpolate("a table://news-42 b table://news-45-1", &render);
        assert_eq!(
            once,
            "a https://example.com/fr/actualit%C3%A9s/hello-world/ b https://example.com/en/news/hello-world/45/"
        );
        let twice = links.interpolate(&once, &render);
        assert_eq!(twice, once);
    }
}
