//! Rewriter building paths from the article tree.
//!
//! An article's path is the chain of its ancestors' slugified names,
//! optionally prefixed with the language code. The start article maps to
//! the site root. Dataset segments are appended below the article path.
//!
//! ```text
//! article 5 "Summer Fest" (parent 4 "Events"), clang en
//!   → /en/events/summer-fest/
//! + segments ["Hello World"]
//!   → /en/events/summer-fest/hello-world/
//! ```

use std::collections::BTreeMap;

use super::{GenericSeo, Locator, RewriteError, Rewriter};
use crate::config::{IndexConfig, LangPrefix, SiteConfig, SlugConfig};
use crate::content::{ContentRepository, TableContent};
use crate::core::UrlPath;
use crate::db::{Database, column_text, column_u64};
use crate::utils::html::escape_attr;
use crate::utils::slug::slugify;

/// Parent chains deeper than this are treated as cycles.
const MAX_DEPTH: usize = 64;

pub struct SlugRewriter<'a> {
    content: TableContent<'a>,
    site: &'a SiteConfig,
    slug: &'a SlugConfig,
}

impl<'a> SlugRewriter<'a> {
    pub fn new(db: &'a dyn Database, config: &'a IndexConfig) -> Self {
        Self {
            content: TableContent::new(db),
            site: &config.site,
            slug: &config.slug,
        }
    }

    /// Language code prefix, if the policy asks for one.
    fn prefix(&self, clang_id: u32) -> Option<String> {
        let wanted = match self.site.lang_prefix {
            LangPrefix::Never => false,
            LangPrefix::Always => true,
            LangPrefix::Auto => self.content.languages().len() > 1,
        };
        if !wanted {
            return None;
        }
        self.content.language(clang_id).map(|l| l.code)
    }

    /// Slugified names from the root down to `article_id`.
    fn article_segments(&self, article_id: u32, clang_id: u32) -> Result<Vec<String>, RewriteError> {
        let mut names = Vec::new();
        let mut current = article_id;

        for _ in 0..MAX_DEPTH {
            if current == 0 {
                break;
            }
            let row = self
                .content
                .article(current, clang_id)
                .ok_or(RewriteError::MissingArticle {
                    article_id: current,
                    clang_id,
                })?;

            if current != self.site.start_article {
                let name = column_text(&row, "name").unwrap_or_default();
                let slug = slugify(&name, self.slug);
                if !slug.is_empty() {
                    names.push(slug);
                }
            }

            current = column_u64(&row, "parent_id")
                .and_then(|id| u32::try_from(id).ok())
                .unwrap_or(0);
        }

        names.reverse();
        Ok(names)
    }

    fn text_or(&self, article_id: u32, clang_id: u32, column: &str, fallback: &str) -> String {
        self.content
            .article(article_id, clang_id)
            .and_then(|row| column_text(&row, column))
            .filter(|text| !text.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string())
    }
}

impl Rewriter for SlugRewriter<'_> {
    fn path(&self, locator: &Locator<'_>) -> Result<UrlPath, RewriteError> {
        let Locator {
            article_id,
            clang_id,
            segments,
        } = *locator;

        let mut parts: Vec<String> = self.prefix(clang_id).into_iter().collect();
        parts.extend(self.article_segments(article_id, clang_id)?);

        if !segments.is_empty() {
            let slugs: Vec<String> = segments
                .iter()
                .map(|segment| slugify(segment, self.slug))
                .filter(|slug| !slug.is_empty())
                .collect();
            if slugs.is_empty() {
                return Err(RewriteError::EmptyPath {
                    article_id,
                    clang_id,
                });
            }
            parts.extend(slugs);
        }

        if parts.is_empty() {
            return Ok(UrlPath::new("/"));
        }
        Ok(UrlPath::new(&format!("/{}/", parts.join("/"))))
    }

    fn origin(&self, clang_id: u32) -> String {
        let code = self.content.language(clang_id).map(|l| l.code);
        self.site.origin(code.as_deref()).to_string()
    }

    fn generic_seo(&self, article_id: u32, clang_id: u32) -> GenericSeo {
        let title = self.text_or(article_id, clang_id, "name", &self.site.name);
        let description = self.text_or(article_id, clang_id, "description", &self.site.description);

        let public = self
            .content
            .status(article_id, clang_id)
            .is_some_and(|s| s.is_public());

        let canonical = match self.path(&Locator::article(article_id, clang_id)) {
            Ok(path) => self.absolute(&path, clang_id),
            Err(_) => format!("{}/", self.origin(clang_id)),
        };

        let hreflang: BTreeMap<String, String> = self
            .content
            .languages()
            .into_iter()
            .filter(|lang| lang.online)
            .filter(|lang| {
                self.content
                    .status(article_id, lang.id)
                    .is_some_and(|s| s.online)
            })
            .filter_map(|lang| {
                let path = self.path(&Locator::article(article_id, lang.id)).ok()?;
                Some((lang.code, self.absolute(&path, lang.id)))
            })
            .collect();

        GenericSeo {
            title: escape_attr(&title).into_owned(),
            title_pattern: escape_attr(&self.site.title_pattern()).into_owned(),
            description: escape_attr(&description).into_owned(),
            robots: if public { "index, follow" } else { "noindex, nofollow" }.into(),
            canonical,
            site_name: escape_attr(&self.site.name).into_owned(),
            hreflang,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;

    #[test]
    fn test_article_paths() {
        let fixture = Fixture::new();
        let rewriter = fixture.rewriter();

        let path = |article_id, clang_id| {
            rewriter
                .path(&Locator::article(article_id, clang_id))
                .map(|p| p.to_string())
        };
        assert_eq!(path(1, 1).unwrap(), "/en/");
        assert_eq!(path(3, 1).unwrap(), "/en/news/");
        assert_eq!(path(5, 1).unwrap(), "/en/events/summer-fest/");
        assert_eq!(path(5, 2).unwrap(), "/de/veranstaltungen/sommerfest/");
    }

    #[test]
    fn test_path_is_encoded() {
        let fixture = Fixture::new();
        let rewriter = fixture.rewriter();
        let path = rewriter.path(&Locator::article(7, 2)).unwrap();
        assert_eq!(path.as_str(), "/de/%C3%BCber-uns/");
        assert_eq!(path.decoded(), "/de/über-uns/");
    }

    #[test]
    fn test_dataset_segments() {
        let fixture = Fixture::new();
        let rewriter = fixture.rewriter();

        let segments = vec!["Hello World!".to_string()];
        let path = rewriter
            .path(&Locator::article(3, 1).with_segments(&segments))
            .unwrap();
        assert_eq!(path, "/en/news/hello-world/");

        let blank = vec!["  ".to_string()];
        let err = rewriter
            .path(&Locator::article(3, 1).with_segments(&blank))
            .unwrap_err();
        assert_eq!(err, RewriteError::EmptyPath { article_id: 3, clang_id: 1 });
    }

    #[test]
    fn test_missing_article() {
        let fixture = Fixture::new();
        let rewriter = fixture.rewriter();
        let err = rewriter.path(&Locator::article(99, 1)).unwrap_err();
        assert_eq!(err, RewriteError::MissingArticle { article_id: 99, clang_id: 1 });
    }

    #[test]
    fn test_lang_prefix_never() {
        let mut fixture = Fixture::new();
        fixture.config.site.lang_prefix = LangPrefix::Never;
        let rewriter = fixture.rewriter();
        let path = rewriter.path(&Locator::article(3, 1)).unwrap();
        assert_eq!(path, "/news/");
        assert_eq!(rewriter.path(&Locator::article(1, 1)).unwrap(), "/");
    }

    #[test]
    fn test_absolute() {
        let fixture = Fixture::new();
        let rewriter = fixture.rewriter();
        let path = UrlPath::new("/en/news/");
        assert_eq!(rewriter.absolute(&path, 1), "https://example.com/en/news/");
    }

    #[test]
    fn test_generic_seo() {
        let fixture = Fixture::new();
        let rewriter = fixture.rewriter();

        let seo = rewriter.generic_seo(3, 1);
        assert_eq!(seo.title(), "News / Example");
        assert_eq!(seo.robots, "index, follow");
        assert_eq!(seo.canonical, "https://example.com/en/news/");
        // German article is offline
        assert_eq!(seo.hreflang.keys().collect::<Vec<_>>(), ["en", "fr"]);
        assert_eq!(seo.hreflang["fr"], "https://example.com/fr/actualit%C3%A9s/");

        let offline = rewriter.generic_seo(3, 2);
        assert_eq!(offline.robots, "noindex, nofollow");
    }

    #[test]
    fn test_generic_seo_falls_back_to_site() {
        let fixture = Fixture::new();
        let rewriter = fixture.rewriter();
        let seo = rewriter.generic_seo(99, 1);
        assert_eq!(seo.title, "Example");
        assert_eq!(seo.description, "Example site");
        assert_eq!(seo.canonical, "https://example.com/");
        assert!(seo.hreflang.is_empty());
    }
}
