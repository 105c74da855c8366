//! Persisted URL record.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::core::UrlPath;
use crate::db::{DbError, Row};

use super::TABLE_NAME;

/// SEO data copied from the source row at resolution time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeoPayload {
    pub title: String,
    pub description: String,
    /// Comma-separated media names; only the first is used for tags.
    pub image: String,
}

impl SeoPayload {
    /// First image of the comma-separated list.
    pub fn first_image(&self) -> Option<&str> {
        self.image
            .split(',')
            .map(str::trim)
            .find(|name| !name.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.description.is_empty() && self.image.is_empty()
    }
}

/// Columns that identify a record's content, independent of language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordKey {
    pub profile_id: u32,
    pub article_id: u32,
    pub data_id: u64,
    pub is_user_path: bool,
    pub is_structure: bool,
}

/// One row of the URL index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlRecord {
    pub id: u64,
    pub profile_id: u32,
    pub article_id: u32,
    pub clang_id: u32,
    /// Source row id, `0` for records addressing a whole article.
    #[serde(default)]
    pub data_id: u64,
    pub url: UrlPath,
    #[serde(default, with = "seo_blob")]
    pub seo: SeoPayload,
    #[serde(default, deserialize_with = "flag")]
    pub sitemap: bool,
    #[serde(default, deserialize_with = "flag")]
    pub is_structure: bool,
    #[serde(default, deserialize_with = "flag")]
    pub is_user_path: bool,
    #[serde(default)]
    pub lastmod: String,
    #[serde(default)]
    pub createdate: String,
    #[serde(default)]
    pub updatedate: String,
    #[serde(default)]
    pub createuser: String,
    #[serde(default)]
    pub updateuser: String,
}

impl UrlRecord {
    pub fn from_row(row: Row) -> Result<Self, DbError> {
        serde_json::from_value(Value::Object(row)).map_err(|e| DbError::Malformed {
            table: TABLE_NAME.to_string(),
            message: e.to_string(),
        })
    }

    pub fn key(&self) -> RecordKey {
        RecordKey {
            profile_id: self.profile_id,
            article_id: self.article_id,
            data_id: self.data_id,
            is_user_path: self.is_user_path,
            is_structure: self.is_structure,
        }
    }

    /// The generated path, as opposed to an alias or structure path.
    #[inline]
    pub fn is_canonical(&self) -> bool {
        !self.is_user_path && !self.is_structure
    }
}

/// Flags are stored as booleans but may arrive as `0`/`1`.
fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !matches!(s.trim(), "" | "0" | "false"),
        _ => false,
    })
}

/// The SEO payload column holds a serialized JSON object.
mod seo_blob {
    use super::SeoPayload;
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _, ser::Error as _};
    use serde_json::Value;

    pub fn serialize<S: Serializer>(seo: &SeoPayload, serializer: S) -> Result<S::Ok, S::Error> {
        let blob = serde_json::to_string(seo).map_err(S::Error::custom)?;
        serializer.serialize_str(&blob)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SeoPayload, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(s) if s.trim().is_empty() => Ok(SeoPayload::default()),
            Value::String(s) => serde_json::from_str(&s).map_err(D::Error::custom),
            Value::Null => Ok(SeoPayload::default()),
            other => serde_json::from_value(other).map_err(D::Error::custom),
        }
    }
}

pub(super) fn seo_blob_string(seo: &SeoPayload) -> String {
    serde_json::to_string(seo).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_from_row_with_blob_and_int_flags() {
        let record = UrlRecord::from_row(row(json!({
            "id": 7,
            "profile_id": 1,
            "article_id": 3,
            "clang_id": 2,
            "data_id": 42,
            "url": "/en/news/hello/",
            "seo": "{\"title\":\"Hello\",\"description\":\"\",\"image\":\"a.jpg,b.jpg\"}",
            "sitemap": 1,
            "is_structure": 0,
            "is_user_path": "0",
        })))
        .unwrap();

        assert_eq!(record.url, "/en/news/hello/");
        assert_eq!(record.seo.title, "Hello");
        assert_eq!(record.seo.first_image(), Some("a.jpg"));
        assert!(record.sitemap);
        assert!(record.is_canonical());
    }

    #[test]
    fn test_from_row_malformed() {
        let err = UrlRecord::from_row(row(json!({"id": "x"}))).unwrap_err();
        assert!(matches!(err, DbError::Malformed { .. }));
    }

    #[test]
    fn test_seo_blob_round_trip() {
        let seo = SeoPayload {
            title: "T".into(),
            description: "D".into(),
            image: String::new(),
        };
        let blob = seo_blob_string(&seo);
        let record = UrlRecord::from_row(row(json!({
            "id": 1, "profile_id": 1, "article_id": 1, "clang_id": 1,
            "url": "/", "seo": blob,
        })))
        .unwrap();
        assert_eq!(record.seo, seo);
        assert_eq!(record.seo.first_image(), None);
    }
}
