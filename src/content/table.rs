//! Repositories backed by tables of the storage engine.
//!
//! | Table     | Columns                                                   |
//! |-----------|-----------------------------------------------------------|
//! | `article` | id, clang_id, name, parent_id, status, permitted, type, description |
//! | `clang`   | id, code, status                                          |
//! | `media`   | filename, title, width, height                            |

use serde_json::Value;

use super::{ContentRepository, ContentStatus, Language, Media, MediaRepository};
use crate::db::{Database, Row, Where, column_bool, column_text, column_u64};
use crate::debug;

pub const ARTICLE_TABLE: &str = "article";
pub const CLANG_TABLE: &str = "clang";
pub const MEDIA_TABLE: &str = "media";

/// URL prefix of the media directory.
const MEDIA_PREFIX: &str = "/media/";

/// Content and media repository over the storage engine.
pub struct TableContent<'a> {
    db: &'a dyn Database,
}

impl<'a> TableContent<'a> {
    pub fn new(db: &'a dyn Database) -> Self {
        Self { db }
    }

    /// Raw article row for one language.
    pub fn article(&self, article_id: u32, clang_id: u32) -> Option<Row> {
        let filter = Where::new()
            .eq("id", article_id)
            .eq("clang_id", clang_id);
        self.select(ARTICLE_TABLE, &filter).into_iter().next()
    }

    /// Storage failures read as "nothing there"; these lookups feed
    /// exclusion checks, never writes.
    fn select(&self, table: &str, filter: &Where) -> Vec<Row> {
        self.db.select(table, filter).unwrap_or_else(|e| {
            debug!("content"; "{} lookup failed: {}", table, e);
            Vec::new()
        })
    }
}

impl ContentRepository for TableContent<'_> {
    fn status(&self, article_id: u32, clang_id: u32) -> Option<ContentStatus> {
        let row = self.article(article_id, clang_id)?;
        Some(ContentStatus {
            online: column_bool(&row, "status"),
            // A missing column means no restriction is configured
            permitted: row
                .get("permitted")
                .is_none_or(|_| column_bool(&row, "permitted")),
            content_type: column_text(&row, "type").filter(|t| !t.is_empty()),
        })
    }

    fn articles_of_type(&self, content_type: &str) -> Vec<u32> {
        let filter = Where::new().eq("type", content_type);
        let mut ids: Vec<u32> = self
            .select(ARTICLE_TABLE, &filter)
            .iter()
            .filter_map(|row| column_u64(row, "id"))
            .filter_map(|id| u32::try_from(id).ok())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    fn languages(&self) -> Vec<Language> {
        let mut languages: Vec<Language> = self
            .select(CLANG_TABLE, &Where::new())
            .iter()
            .filter_map(|row| {
                Some(Language {
                    id: u32::try_from(column_u64(row, "id")?).ok()?,
                    code: column_text(row, "code")?,
                    online: column_bool(row, "status"),
                })
            })
            .collect();
        languages.sort_by_key(|l| l.id);
        languages
    }
}

impl MediaRepository for TableContent<'_> {
    fn media(&self, name: &str) -> Option<Media> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let row = self
            .db
            .row(MEDIA_TABLE, "filename", &Value::from(name))
            .ok()
            .flatten()?;

        let dimension = |column: &str| {
            column_u64(&row, column)
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(0)
        };

        Some(Media {
            url: format!("{MEDIA_PREFIX}{name}"),
            title: column_text(&row, "title").unwrap_or_default(),
            width: dimension("width"),
            height: dimension("height"),
            extension: name.rsplit('.').next().unwrap_or_default().to_lowercase(),
        })
    }
}
