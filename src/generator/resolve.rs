//! Resolution engine: one content item → stored URL records.
//!
//! For every language a profile applies to, an item gets:
//!
//! | Record    | Flags           | Path                                       |
//! |-----------|-----------------|--------------------------------------------|
//! | canonical | -               | rewriter path below the profile's article  |
//! | alias     | `is_user_path`  | operator-entered path from the source row  |
//! | structure | `is_structure`  | rewriter path below each structure article |
//!
//! Only canonical records are sitemap candidates.

use std::ops::AddAssign;
use thiserror::Error;

use crate::core::{IndexContext, UrlPath};
use crate::db::{DbError, Row, column_text};
use crate::debug;
use crate::index::SeoPayload;
use crate::profile::Profile;
use crate::rewriter::{Locator, RewriteError};

/// Counts of one build run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub saved: usize,
    pub failed: usize,
    /// Items without a record in some language (e.g. missing translation).
    pub skipped: usize,
}

impl BuildReport {
    fn record(&mut self, saved: bool) {
        if saved {
            self.saved += 1;
        } else {
            self.failed += 1;
        }
    }
}

impl AddAssign for BuildReport {
    fn add_assign(&mut self, other: Self) {
        self.saved += other.saved;
        self.failed += other.failed;
        self.skipped += other.skipped;
    }
}

/// Per-item failure, counted and logged but never fatal for the batch.
#[derive(Debug, Error)]
enum ItemError {
    #[error(transparent)]
    Rewrite(#[from] RewriteError),
    #[error(transparent)]
    Db(#[from] DbError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PathKind {
    Canonical,
    UserPath,
    /// Mounted under another article.
    Structure(u32),
}

/// One thing to resolve: a dataset row or a whole article.
#[derive(Debug, Clone)]
struct Item {
    /// Article the canonical path is mounted under.
    article_id: u32,
    /// Row id, `0` for article items.
    data_id: u64,
    is_row: bool,
    segments: Vec<String>,
    seo: SeoPayload,
    lastmod: Option<String>,
    user_path: Option<String>,
    /// Language the row is bound to.
    language: Option<u32>,
}

impl Item {
    fn article(article_id: u32) -> Self {
        Self {
            article_id,
            data_id: 0,
            is_row: false,
            segments: Vec::new(),
            seo: SeoPayload::default(),
            lastmod: None,
            user_path: None,
            language: None,
        }
    }

    fn row(profile: &Profile, row: &Row) -> Option<Self> {
        let table = profile.table.as_ref()?;
        let data_id = profile.row_id(row)?;
        let text = |column: &Option<String>| {
            column
                .as_deref()
                .and_then(|c| column_text(row, c))
                .unwrap_or_default()
        };

        Some(Self {
            article_id: profile.article_id,
            data_id,
            is_row: true,
            segments: table
                .segments
                .iter()
                .filter_map(|column| column_text(row, column))
                .collect(),
            seo: SeoPayload {
                title: text(&profile.seo.title),
                description: text(&profile.seo.description),
                image: text(&profile.seo.image),
            },
            lastmod: table.lastmod.as_deref().and_then(|c| column_text(row, c)),
            user_path: Some(text(&table.user_path)).filter(|p| !p.trim().is_empty()),
            language: profile.row_language(row),
        })
    }
}

/// Writes the records of profiles, rows and articles.
pub struct UrlBuilder<'a> {
    ctx: IndexContext<'a>,
}

impl<'a> UrlBuilder<'a> {
    pub fn new(ctx: IndexContext<'a>) -> Self {
        Self { ctx }
    }

    /// Resolve every item a profile selects.
    ///
    /// Only reading the source table can fail; item failures are counted.
    pub fn build_profile(&self, profile: &Profile) -> Result<BuildReport, DbError> {
        let items: Vec<Item> = if profile.table.is_some() {
            profile
                .rows(self.ctx.db)?
                .iter()
                .filter_map(|row| Item::row(profile, row))
                .collect()
        } else {
            self.article_ids(profile)
                .into_iter()
                .map(Item::article)
                .collect()
        };

        let mut report = BuildReport::default();
        for item in &items {
            report += self.build_item(profile, item);
        }
        Ok(report)
    }

    /// Resolve one source row. A row outside the dataset yields no records.
    pub fn build_dataset(&self, profile: &Profile, data_id: u64) -> Result<BuildReport, DbError> {
        let item = profile
            .row(self.ctx.db, data_id)?
            .and_then(|row| Item::row(profile, &row));
        Ok(item.map_or_else(BuildReport::default, |item| {
            self.build_item(profile, &item)
        }))
    }

    fn article_ids(&self, profile: &Profile) -> Vec<u32> {
        let mut ids = profile
            .content_type
            .as_deref()
            .map(|t| self.ctx.content.articles_of_type(t))
            .unwrap_or_default();
        if profile.article_id != 0 {
            ids.push(profile.article_id);
        }
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    fn build_item(&self, profile: &Profile, item: &Item) -> BuildReport {
        let mut report = BuildReport::default();

        for clang_id in self.ctx.registry.languages(profile, self.ctx.content) {
            if item.language.is_some_and(|lang| lang != clang_id) {
                continue;
            }
            if !item.is_row && self.ctx.content.status(item.article_id, clang_id).is_none() {
                report.skipped += 1;
                continue;
            }
            match self.build_language(profile, item, clang_id) {
                Ok(language_report) => report += language_report,
                Err(e) => {
                    debug!(
                        "rebuild";
                        "profile {} item {}/{} clang {}: {}",
                        profile.id, item.article_id, item.data_id, clang_id, e
                    );
                    report.failed += 1;
                }
            }
        }

        report
    }

    fn build_language(
        &self,
        profile: &Profile,
        item: &Item,
        clang_id: u32,
    ) -> Result<BuildReport, ItemError> {
        let mut report = BuildReport::default();

        let path = self.resolve(profile, item, item.article_id, clang_id)?;
        report.record(self.save(profile, item, clang_id, &path, PathKind::Canonical));

        if let Some(alias) = &item.user_path {
            let alias = UrlPath::new(alias);
            report.record(self.save(profile, item, clang_id, &alias, PathKind::UserPath));
        }

        if item.is_row {
            for &article_id in &profile.structure_articles {
                match self.resolve(profile, item, article_id, clang_id) {
                    Ok(path) => report.record(self.save(
                        profile,
                        item,
                        clang_id,
                        &path,
                        PathKind::Structure(article_id),
                    )),
                    Err(e) => {
                        debug!("rebuild"; "profile {} structure {}: {}", profile.id, article_id, e);
                        report.failed += 1;
                    }
                }
            }
        }

        Ok(report)
    }

    /// Rewriter path, made unique for dataset rows.
    ///
    /// When the path already belongs to other content, the row id is
    /// appended as an extra segment.
    fn resolve(
        &self,
        profile: &Profile,
        item: &Item,
        article_id: u32,
        clang_id: u32,
    ) -> Result<UrlPath, ItemError> {
        let locator = Locator::article(article_id, clang_id).with_segments(&item.segments);
        let path = self.ctx.rewriter.path(&locator)?;

        if item.is_row && self.ctx.store.is_taken(&path, profile.id, item.data_id)? {
            return Ok(path.join(&item.data_id.to_string()));
        }
        Ok(path)
    }

    fn save(
        &self,
        profile: &Profile,
        item: &Item,
        clang_id: u32,
        path: &UrlPath,
        kind: PathKind,
    ) -> bool {
        let article_id = match kind {
            PathKind::Structure(article_id) => article_id,
            _ => item.article_id,
        };

        let mut pending = self.ctx.store.factory();
        pending
            .set_profile_id(profile.id)
            .set_article_id(article_id)
            .set_clang_id(clang_id)
            .set_data_id(item.data_id)
            .set_url(path)
            .set_seo(&item.seo)
            .set_sitemap(kind == PathKind::Canonical && profile.sitemap.add)
            .set_user_path(kind == PathKind::UserPath)
            .set_structure(matches!(kind, PathKind::Structure(_)))
            .set_lastmod(item.lastmod.as_deref());
        pending.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;

    #[test]
    fn test_build_news_profile() {
        let fixture = Fixture::new();
        let parts = fixture.parts();
        let builder = UrlBuilder::new(parts.context());
        let profile = parts.registry.get(1).unwrap();

        let report = builder.build_profile(profile).unwrap();
        // rows 42, 43, 45 in en/de/fr: canonical + structure, alias for 42
        assert_eq!(report.saved, 3 * 3 * 2 + 3);
        assert_eq!(report.failed, 0);

        let store = &parts.store;
        let origin = store.origin(1, 42, 1).unwrap().unwrap();
        assert_eq!(origin.url, "/en/news/hello-world/");
        assert_eq!(origin.seo.title, "Hello World");
        assert_eq!(origin.lastmod, "2024-01-05T10:00:00+00:00");
        assert!(origin.sitemap);

        let expanded = store.origin_and_expanded(1, 42, 1).unwrap();
        let urls: Vec<&str> = expanded.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, ["/en/news/hello-world/", "/hello", "/en/events/hello-world/"]);
        assert!(expanded[1].is_user_path && !expanded[1].sitemap);
        assert!(expanded[2].is_structure);
        assert_eq!(expanded[2].article_id, 4);
    }

    #[test]
    fn test_colliding_slug_gets_row_id() {
        let fixture = Fixture::new();
        let parts = fixture.parts();
        let builder = UrlBuilder::new(parts.context());
        builder.build_profile(parts.registry.get(1).unwrap()).unwrap();

        let store = &parts.store;
        let second = store.origin(1, 45, 1).unwrap().unwrap();
        assert_eq!(second.url, "/en/news/hello-world/45/");

        let records = store.by_url("/en/news/hello-world/").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].data_id, 42);
    }

    #[test]
    fn test_build_article_profile() {
        let fixture = Fixture::new();
        let parts = fixture.parts();
        let builder = UrlBuilder::new(parts.context());

        let report = builder.build_profile(parts.registry.get(2).unwrap()).unwrap();
        // article 5 in en/de/fr, article 6 only in en
        assert_eq!(report.saved, 4);
        assert_eq!(report.skipped, 2);

        let record = parts.store.by_article(5, 2).unwrap().unwrap();
        assert_eq!(record.url, "/de/veranstaltungen/sommerfest/");
        assert_eq!(record.data_id, 0);
    }

    #[test]
    fn test_build_dataset_outside_restriction() {
        let fixture = Fixture::new();
        let parts = fixture.parts();
        let builder = UrlBuilder::new(parts.context());
        let profile = parts.registry.get(1).unwrap();

        assert_eq!(builder.build_dataset(profile, 44).unwrap(), BuildReport::default());
        assert_eq!(builder.build_dataset(profile, 99).unwrap(), BuildReport::default());
        assert!(parts.store.all().unwrap().is_empty());
    }

    #[test]
    fn test_rewrite_failure_is_isolated() {
        let fixture = Fixture::new();
        fixture
            .db
            .seed("news", [serde_json::json!({"id": 50, "title": "!!!", "status": 1})])
            .unwrap();
        let parts = fixture.parts();
        let builder = UrlBuilder::new(parts.context());

        let report = builder.build_profile(parts.registry.get(1).unwrap()).unwrap();
        // Row 50 has no slug text: canonical fails in each language
        assert_eq!(report.failed, 3);
        assert_eq!(report.saved, 21);
        assert!(parts.store.origin(1, 50, 1).unwrap().is_none());
    }

    #[test]
    fn test_report_add_assign() {
        let mut total = BuildReport { saved: 1, failed: 2, skipped: 0 };
        total += BuildReport { saved: 3, failed: 0, skipped: 1 };
        assert_eq!(total, BuildReport { saved: 4, failed: 2, skipped: 1 });
    }
}
