//! Data-access layer over the URL index table.

use serde_json::Value;

use crate::content::ContentRepository;
use crate::core::UrlPath;
use crate::db::{Database, DbError, Row, Where};
use crate::debug;
use crate::utils::date::{DateTimeUtc, now_epoch, w3c_from_value};

use super::record::{RecordKey, SeoPayload, UrlRecord, seo_blob_string};
use super::{INDEXED_COLUMNS, TABLE_NAME, UNIQUE_KEY};

/// URL record store.
///
/// Writes go through [`PendingRecord`]; every other method is a query.
pub struct UrlStore<'a> {
    db: &'a dyn Database,
    user: String,
}

impl<'a> UrlStore<'a> {
    pub fn new(db: &'a dyn Database, user: impl Into<String>) -> Self {
        Self {
            db,
            user: user.into(),
        }
    }

    /// Create the index table and its lookup indexes if missing.
    pub fn install(&self) -> Result<(), DbError> {
        self.db.create_table(TABLE_NAME, &[UNIQUE_KEY])?;
        for column in INDEXED_COLUMNS {
            self.db.create_index(TABLE_NAME, column)?;
        }
        Ok(())
    }

    /// Start a new record.
    pub fn factory(&self) -> PendingRecord<'_> {
        PendingRecord {
            db: self.db,
            user: &self.user,
            row: Row::new(),
            saved: None,
        }
    }

    // ========================================================================
    // Invalidation
    // ========================================================================

    /// Drop every record in one step.
    pub fn delete_all(&self) -> Result<(), DbError> {
        self.db.truncate(TABLE_NAME)
    }

    pub fn delete_by_profile(&self, profile_id: u32) -> Result<usize, DbError> {
        self.db
            .delete(TABLE_NAME, &Where::new().eq("profile_id", profile_id))
    }

    pub fn delete_by_profile_and_dataset(
        &self,
        profile_id: u32,
        data_id: u64,
    ) -> Result<usize, DbError> {
        let filter = Where::new()
            .eq("profile_id", profile_id)
            .eq("data_id", data_id);
        self.db.delete(TABLE_NAME, &filter)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Every record, ordered by id.
    pub fn all(&self) -> Result<Vec<UrlRecord>, DbError> {
        self.query(&Where::new())
    }

    /// Records of a profile whose language and article are online.
    pub fn by_profile(
        &self,
        profile_id: u32,
        content: &dyn ContentRepository,
    ) -> Result<Vec<UrlRecord>, DbError> {
        let records = self.query(&Where::new().eq("profile_id", profile_id))?;
        Ok(records
            .into_iter()
            .filter(|r| content.is_language_online(r.clang_id))
            .filter(|r| {
                content
                    .status(r.article_id, r.clang_id)
                    .is_some_and(|s| s.online)
            })
            .collect())
    }

    /// The same content in each of `clang_ids`.
    ///
    /// Records stored with language `0` apply to every language and match
    /// any requested id.
    pub fn hreflang(&self, key: &RecordKey, clang_ids: &[u32]) -> Result<Vec<UrlRecord>, DbError> {
        let filter = Where::new()
            .eq("profile_id", key.profile_id)
            .eq("data_id", key.data_id)
            .eq("article_id", key.article_id)
            .eq("is_user_path", key.is_user_path)
            .eq("is_structure", key.is_structure)
            .any_of("clang_id", clang_ids.iter().copied().chain([0]));
        self.query(&filter)
    }

    /// The canonical record of a dataset row in one language.
    pub fn origin(
        &self,
        profile_id: u32,
        data_id: u64,
        clang_id: u32,
    ) -> Result<Option<UrlRecord>, DbError> {
        let filter = Self::dataset_filter(profile_id, data_id, clang_id)
            .eq("is_user_path", false)
            .eq("is_structure", false);
        Ok(self.query(&filter)?.into_iter().next())
    }

    /// Canonical, alias and structure records of a dataset row in one language.
    pub fn origin_and_expanded(
        &self,
        profile_id: u32,
        data_id: u64,
        clang_id: u32,
    ) -> Result<Vec<UrlRecord>, DbError> {
        self.query(&Self::dataset_filter(profile_id, data_id, clang_id))
    }

    /// Canonical record of a whole article in one language.
    pub fn by_article(&self, article_id: u32, clang_id: u32) -> Result<Option<UrlRecord>, DbError> {
        let filter = Where::new()
            .eq("article_id", article_id)
            .eq("clang_id", clang_id)
            .eq("data_id", 0)
            .eq("is_user_path", false)
            .eq("is_structure", false);
        Ok(self.query(&filter)?.into_iter().next())
    }

    /// Records stored under a request URL.
    ///
    /// Scheme, host and query string are stripped before matching. The
    /// canonical record comes first, then aliases by id.
    pub fn by_url(&self, input: &str) -> Result<Vec<UrlRecord>, DbError> {
        let path = UrlPath::from_request(input);
        if path.is_empty() {
            return Ok(Vec::new());
        }
        let mut records = self.query(&Where::new().eq("url", path.as_str()))?;
        records.sort_by_key(|r| (!r.is_canonical(), r.id));
        Ok(records)
    }

    /// Whether `url` already belongs to content other than `(profile_id, data_id)`.
    pub fn is_taken(&self, url: &UrlPath, profile_id: u32, data_id: u64) -> Result<bool, DbError> {
        let records = self.query(&Where::new().eq("url", url.as_str()))?;
        Ok(records
            .iter()
            .any(|r| r.profile_id != profile_id || r.data_id != data_id))
    }

    fn dataset_filter(profile_id: u32, data_id: u64, clang_id: u32) -> Where {
        Where::new()
            .eq("profile_id", profile_id)
            .eq("data_id", data_id)
            .eq("clang_id", clang_id)
    }

    fn query(&self, filter: &Where) -> Result<Vec<UrlRecord>, DbError> {
        let mut records = self
            .db
            .select(TABLE_NAME, filter)?
            .into_iter()
            .map(UrlRecord::from_row)
            .collect::<Result<Vec<_>, _>>()?;
        records.sort_by_key(|r| r.id);
        Ok(records)
    }
}

// ============================================================================
// PendingRecord
// ============================================================================

/// A record being assembled by typed setters.
pub struct PendingRecord<'s> {
    db: &'s dyn Database,
    user: &'s str,
    row: Row,
    saved: Option<Row>,
}

impl PendingRecord<'_> {
    fn set(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.row.insert(column.to_string(), value.into());
        self
    }

    pub fn set_article_id(&mut self, article_id: u32) -> &mut Self {
        self.set("article_id", article_id)
    }

    pub fn set_clang_id(&mut self, clang_id: u32) -> &mut Self {
        self.set("clang_id", clang_id)
    }

    pub fn set_data_id(&mut self, data_id: u64) -> &mut Self {
        self.set("data_id", data_id)
    }

    pub fn set_profile_id(&mut self, profile_id: u32) -> &mut Self {
        self.set("profile_id", profile_id)
    }

    pub fn set_seo(&mut self, seo: &SeoPayload) -> &mut Self {
        self.set("seo", seo_blob_string(seo))
    }

    pub fn set_sitemap(&mut self, sitemap: bool) -> &mut Self {
        self.set("sitemap", sitemap)
    }

    pub fn set_structure(&mut self, is_structure: bool) -> &mut Self {
        self.set("is_structure", is_structure)
    }

    pub fn set_url(&mut self, url: &UrlPath) -> &mut Self {
        self.set("url", url.as_str())
    }

    pub fn set_user_path(&mut self, is_user_path: bool) -> &mut Self {
        self.set("is_user_path", is_user_path)
    }

    /// Stored W3C; the raw value may be a database timestamp or epoch.
    /// Missing or unreadable values mean "now".
    pub fn set_lastmod(&mut self, value: Option<&str>) -> &mut Self {
        let lastmod = w3c_from_value(value, now_epoch());
        self.set("lastmod", lastmod)
    }

    /// Insert the record. Storage failures are logged and reported as `false`.
    pub fn save(&mut self) -> bool {
        let now = DateTimeUtc::now().to_w3c();
        let mut row = self.row.clone();
        for (column, default) in [
            ("data_id", Value::from(0)),
            ("sitemap", Value::from(false)),
            ("is_structure", Value::from(false)),
            ("is_user_path", Value::from(false)),
        ] {
            row.entry(column).or_insert(default);
        }
        if !row.contains_key("lastmod") {
            row.insert("lastmod".into(), now.clone().into());
        }
        row.insert("createdate".into(), now.clone().into());
        row.insert("updatedate".into(), now.into());
        row.insert("createuser".into(), self.user.into());
        row.insert("updateuser".into(), self.user.into());

        match self.db.insert(TABLE_NAME, row) {
            Ok(stored) => {
                self.saved = Some(stored);
                true
            }
            Err(e) => {
                debug!("index"; "insert failed: {}", e);
                self.saved = None;
                false
            }
        }
    }

    /// The row as stored by the last successful [`save`](Self::save).
    pub fn fetch(&self) -> Option<&Row> {
        self.saved.as_ref()
    }

    /// Typed view of [`fetch`](Self::fetch).
    pub fn record(&self) -> Option<UrlRecord> {
        self.saved
            .clone()
            .and_then(|row| UrlRecord::from_row(row).ok())
    }
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryDatabase;
    use crate::testing::Fixture;

    fn save(
        store: &UrlStore,
        profile_id: u32,
        data_id: u64,
        clang_id: u32,
        url: &str,
        user_path: bool,
    ) -> bool {
        store
            .factory()
            .set_profile_id(profile_id)
            .set_article_id(3)
            .set_clang_id(clang_id)
            .set_data_id(data_id)
            .set_url(&UrlPath::new(url))
            .set_user_path(user_path)
            .set_sitemap(!user_path)
            .save()
    }

    fn store(db: &MemoryDatabase) -> UrlStore<'_> {
        let store = UrlStore::new(db, "tester");
        store.install().unwrap();
        store
    }

    #[test]
    fn test_save_and_fetch() {
        let db = MemoryDatabase::new();
        let store = store(&db);

        let mut pending = store.factory();
        pending
            .set_profile_id(1)
            .set_article_id(3)
            .set_clang_id(1)
            .set_data_id(42)
            .set_url(&UrlPath::new("/news/hello/"))
            .set_lastmod(Some("2024-01-05 10:00:00"));
        assert!(pending.fetch().is_none());
        assert!(pending.save());

        let row = pending.fetch().unwrap();
        assert_eq!(row["id"], 1);
        assert_eq!(row["createuser"], "tester");
        assert_eq!(row["lastmod"], "2024-01-05T10:00:00+00:00");
        assert!(row.contains_key("createdate"));

        let record = pending.record().unwrap();
        assert_eq!(record.url, "/news/hello/");
        assert!(record.seo.is_empty());
    }

    #[test]
    fn test_save_swallows_constraint_violation() {
        let db = MemoryDatabase::new();
        let store = store(&db);

        assert!(save(&store, 1, 42, 1, "/a/", false));
        assert!(!save(&store, 1, 42, 1, "/b/", false));
        // Differs in path kind only
        assert!(save(&store, 1, 42, 1, "/c/", true));
        assert_eq!(store.all().unwrap().len(), 2);
    }

    #[test]
    fn test_save_without_table_fails_quietly() {
        let db = MemoryDatabase::new();
        let store = UrlStore::new(&db, "tester");
        let mut pending = store.factory();
        pending.set_url(&UrlPath::new("/x/"));
        assert!(!pending.save());
        assert!(pending.fetch().is_none());
    }

    #[test]
    fn test_scoped_deletes() {
        let db = MemoryDatabase::new();
        let store = store(&db);
        save(&store, 1, 1, 1, "/a/", false);
        save(&store, 1, 2, 1, "/b/", false);
        save(&store, 2, 1, 1, "/c/", false);

        assert_eq!(store.delete_by_profile_and_dataset(1, 2).unwrap(), 1);
        assert_eq!(store.delete_by_profile(1).unwrap(), 1);
        assert_eq!(store.all().unwrap().len(), 1);

        store.delete_all().unwrap();
        assert!(store.all().unwrap().is_empty());
    }

    #[test]
    fn test_by_url_round_trip() {
        let db = MemoryDatabase::new();
        let store = store(&db);
        save(&store, 1, 42, 1, "/news/über/", true);
        save(&store, 1, 42, 1, "/news/über/", false);

        let records = store
            .by_url("https://example.com/news/%C3%BCber/?page=2")
            .unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[0].is_canonical());
        assert_eq!(records[0].data_id, 42);

        assert!(store.by_url("/missing/").unwrap().is_empty());
        assert!(store.by_url("").unwrap().is_empty());
    }

    #[test]
    fn test_origin_and_expanded() {
        let db = MemoryDatabase::new();
        let store = store(&db);
        save(&store, 1, 42, 1, "/a/", true);
        save(&store, 1, 42, 1, "/b/", false);
        save(&store, 1, 42, 2, "/c/", false);

        let origin = store.origin(1, 42, 1).unwrap().unwrap();
        assert_eq!(origin.url, "/b/");
        assert!(store.origin(1, 42, 3).unwrap().is_none());
        assert_eq!(store.origin_and_expanded(1, 42, 1).unwrap().len(), 2);
    }

    #[test]
    fn test_hreflang_wildcard_language() {
        let db = MemoryDatabase::new();
        let store = store(&db);
        save(&store, 1, 42, 1, "/en/a/", false);
        save(&store, 1, 42, 2, "/de/a/", false);
        save(&store, 1, 42, 0, "/all/a/", false);
        save(&store, 1, 43, 1, "/en/b/", false);

        let key = store.origin(1, 42, 1).unwrap().unwrap().key();
        let urls: Vec<String> = store
            .hreflang(&key, &[1])
            .unwrap()
            .iter()
            .map(|r| r.url.to_string())
            .collect();
        assert_eq!(urls, ["/en/a/", "/all/a/"]);
    }

    #[test]
    fn test_is_taken() {
        let db = MemoryDatabase::new();
        let store = store(&db);
        save(&store, 1, 42, 1, "/a/", false);

        let url = UrlPath::new("/a/");
        assert!(!store.is_taken(&url, 1, 42).unwrap());
        assert!(store.is_taken(&url, 1, 43).unwrap());
        assert!(store.is_taken(&url, 2, 42).unwrap());
    }

    #[test]
    fn test_bulk_build_with_uniqueness_checks() {
        let db = MemoryDatabase::new();
        let store = store(&db);

        let start = std::time::Instant::now();
        for data_id in 0..8_000u64 {
            let url = format!("/news/{data_id}/");
            assert!(!store.is_taken(&UrlPath::new(&url), 1, data_id).unwrap());
            assert!(save(&store, 1, data_id, 1, &url, false));
        }
        assert!(start.elapsed().as_secs() < 20);

        store.delete_by_profile_and_dataset(1, 7).unwrap();
        assert!(!store.is_taken(&UrlPath::new("/news/7/"), 2, 7).unwrap());
        assert!(store.is_taken(&UrlPath::new("/news/8/"), 2, 8).unwrap());
        assert!(store.origin(1, 8, 1).unwrap().is_some());
    }

    #[test]
    fn test_by_profile_filters_offline() {
        let fixture = Fixture::new();
        let content = fixture.content();
        let store = fixture.store();
        // Article 3 is offline in language 2
        save(&store, 9, 1, 1, "/en/x/", false);
        save(&store, 9, 1, 2, "/de/x/", false);

        let records = store.by_profile(9, &content).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].clang_id, 1);
    }
}
