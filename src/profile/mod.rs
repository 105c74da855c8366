//! Profile registry: one profile per indexed content type.
//!
//! A profile says where the items of a content type come from (a source
//! table, or articles selected by id / content type), which columns carry
//! SEO data, timestamps and images, and how entries appear in the sitemap.
//!
//! # Example
//!
//! ```toml
//! [[profiles]]
//! id = 1
//! namespace = "news"
//! article_id = 3                      # Rows are mounted under article 3
//! table = { name = "news", segments = ["title"], lastmod = "updatedate", media = ["image"] }
//! seo = { title = "title", description = "teaser", image = "image" }
//! sitemap = { add = true, frequency = "daily", priority = 0.8 }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::content::ContentRepository;
use crate::db::{Database, DbError, Row, Where, column_u64};

// ============================================================================
// Profile
// ============================================================================

/// Indexing policy for one content type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: u32,
    /// Query key the rewriter uses for this type, e.g. `news`.
    #[serde(default)]
    pub namespace: String,
    /// Article the items are mounted under (the item itself for article profiles).
    #[serde(default)]
    pub article_id: u32,
    /// Language the profile applies to; `0` means every language.
    #[serde(default)]
    pub clang_id: u32,
    /// Bind every article of this type to the profile.
    #[serde(default)]
    pub content_type: Option<String>,
    /// Source table. Without one the profile addresses whole articles.
    #[serde(default)]
    pub table: Option<TableSource>,
    #[serde(default)]
    pub seo: SeoColumns,
    #[serde(default)]
    pub sitemap: SitemapPolicy,
    /// Further articles the items are reachable under, stored as structure records.
    #[serde(default)]
    pub structure_articles: Vec<u32>,
}

/// Where the rows of a dataset profile live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSource {
    pub name: String,
    #[serde(default = "default_column_id")]
    pub column_id: String,
    /// Column holding the row's language; rows without one apply to all.
    #[serde(default)]
    pub column_clang_id: Option<String>,
    /// Columns whose values form the URL slug, in order.
    #[serde(default)]
    pub segments: Vec<String>,
    /// Column = value filter selecting the dataset.
    #[serde(default)]
    pub restriction: BTreeMap<String, Value>,
    /// Column holding the modification timestamp.
    #[serde(default)]
    pub lastmod: Option<String>,
    /// Columns holding comma-separated image names.
    #[serde(default)]
    pub media: Vec<String>,
    /// Column holding an operator-entered alias path.
    #[serde(default)]
    pub user_path: Option<String>,
}

fn default_column_id() -> String {
    "id".into()
}

/// Columns copied into the record's SEO payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SeoColumns {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

/// `<changefreq>` values of the sitemap protocol.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFrequency {
    Always,
    Hourly,
    Daily,
    #[default]
    Weekly,
    Monthly,
    Yearly,
    Never,
}

impl ChangeFrequency {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
            Self::Never => "never",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SitemapPolicy {
    pub add: bool,
    pub frequency: ChangeFrequency,
    pub priority: f32,
}

impl Default for SitemapPolicy {
    fn default() -> Self {
        Self {
            add: true,
            frequency: ChangeFrequency::Weekly,
            priority: 0.5,
        }
    }
}

impl Profile {
    /// Whether records of this profile exist in `clang_id`.
    #[inline]
    pub fn is_for_language(&self, clang_id: u32) -> bool {
        self.clang_id == 0 || self.clang_id == clang_id
    }

    /// Case-insensitive source table match.
    pub fn table_matches(&self, table: &str) -> bool {
        self.table
            .as_ref()
            .is_some_and(|t| t.name.eq_ignore_ascii_case(table))
    }

    /// Rows selected by the profile, ordered by primary key.
    ///
    /// Article profiles have no rows.
    pub fn rows(&self, db: &dyn Database) -> Result<Vec<Row>, DbError> {
        let Some(table) = &self.table else {
            return Ok(Vec::new());
        };
        let filter = table
            .restriction
            .iter()
            .fold(Where::new(), |w, (column, value)| w.eq(column, value.clone()));
        let mut rows = db.select(&table.name, &filter)?;
        rows.sort_by_key(|row| column_u64(row, &table.column_id).unwrap_or(0));
        Ok(rows)
    }

    /// One row by primary key, if it still belongs to the dataset.
    pub fn row(&self, db: &dyn Database, data_id: u64) -> Result<Option<Row>, DbError> {
        let Some(table) = &self.table else {
            return Ok(None);
        };
        let filter = table
            .restriction
            .iter()
            .fold(Where::new().eq(&table.column_id, data_id), |w, (column, value)| {
                w.eq(column, value.clone())
            });
        Ok(db.select(&table.name, &filter)?.into_iter().next())
    }

    /// Primary key of a source row.
    pub fn row_id(&self, row: &Row) -> Option<u64> {
        let table = self.table.as_ref()?;
        column_u64(row, &table.column_id)
    }

    /// Language a row is bound to, `None` when it applies to all.
    pub fn row_language(&self, row: &Row) -> Option<u32> {
        let column = self.table.as_ref()?.column_clang_id.as_deref()?;
        column_u64(row, column)
            .and_then(|id| u32::try_from(id).ok())
            .filter(|&id| id != 0)
    }
}

// ============================================================================
// ProfileRegistry
// ============================================================================

/// Ordered, read-only set of profiles.
#[derive(Debug, Clone, Default)]
pub struct ProfileRegistry {
    profiles: Vec<Profile>,
}

impl ProfileRegistry {
    pub fn new(profiles: Vec<Profile>) -> Self {
        Self { profiles }
    }

    /// Profiles in configuration order.
    pub fn all(&self) -> &[Profile] {
        &self.profiles
    }

    pub fn get(&self, id: u32) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.id == id)
    }

    /// Profiles reading from `table` (case-insensitive).
    pub fn by_table<'a>(&'a self, table: &'a str) -> impl Iterator<Item = &'a Profile> + 'a {
        self.profiles.iter().filter(move |p| p.table_matches(table))
    }

    /// First profile reading from `table` that applies to `clang_id`.
    pub fn by_table_for_lang(&self, table: &str, clang_id: u32) -> Option<&Profile> {
        self.profiles
            .iter()
            .find(|p| p.table_matches(table) && p.is_for_language(clang_id))
    }

    /// Profiles whose records depend on an article.
    ///
    /// A profile is bound when the article is its mount point, one of its
    /// structure articles, or of its content type. `clang_id == 0` checks
    /// the content type in every active language.
    pub fn bound_to_content(
        &self,
        article_id: u32,
        clang_id: u32,
        content: &dyn ContentRepository,
    ) -> Vec<&Profile> {
        let types: Vec<String> = if clang_id == 0 {
            content
                .active_language_ids()
                .into_iter()
                .filter_map(|clang| content.status(article_id, clang)?.content_type)
                .collect()
        } else {
            content
                .status(article_id, clang_id)
                .and_then(|s| s.content_type)
                .into_iter()
                .collect()
        };

        self.profiles
            .iter()
            .filter(|p| clang_id == 0 || p.is_for_language(clang_id))
            .filter(|p| {
                p.article_id == article_id
                    || p.structure_articles.contains(&article_id)
                    || p.content_type.as_ref().is_some_and(|t| types.contains(t))
            })
            .collect()
    }

    /// Active languages a profile produces records for.
    pub fn languages(&self, profile: &Profile, content: &dyn ContentRepository) -> Vec<u32> {
        content
            .active_language_ids()
            .into_iter()
            .filter(|&clang| profile.is_for_language(clang))
            .collect()
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.profiles.is_empty() {
            diag.warn(FieldPath::new("profiles"), "no profiles configured, the index stays empty");
        }

        let mut seen = Vec::with_capacity(self.profiles.len());
        for profile in &self.profiles {
            if seen.contains(&profile.id) {
                diag.error_with_hint(
                    FieldPath::new("profiles.id"),
                    format!("duplicate profile id {}", profile.id),
                    "every [[profiles]] entry needs its own id",
                );
            }
            seen.push(profile.id);

            if let Some(table) = &profile.table {
                if table.name.trim().is_empty() {
                    diag.error(
                        FieldPath::new("profiles.table.name"),
                        format!("profile {}: table name is empty", profile.id),
                    );
                }
                if table.segments.is_empty() {
                    diag.warn(
                        FieldPath::new("profiles.table.segments"),
                        format!("profile {}: no segments, rows are told apart by id only", profile.id),
                    );
                }
            } else if profile.article_id == 0 && profile.content_type.is_none() {
                diag.error_with_hint(
                    FieldPath::new("profiles"),
                    format!("profile {} selects no content", profile.id),
                    "set `table`, `article_id` or `content_type`",
                );
            }

            let priority = profile.sitemap.priority;
            if !(0.0..=1.0).contains(&priority) {
                diag.error(
                    FieldPath::new("profiles.sitemap.priority"),
                    format!("profile {}: priority {priority} outside 0.0..=1.0", profile.id),
                );
            }
        }
    }
}

// ============================================================================
// tests
// ============================================================================
