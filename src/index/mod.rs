//! URL index: the persisted content ⇄ URL mapping.
//!
//! | Item          | Purpose                                   |
//! |---------------|-------------------------------------------|
//! | [`UrlRecord`] | One resolved URL for (profile, content, language, kind) |
//! | [`UrlStore`]  | Typed writes and the lookup queries       |

mod record;
mod store;

pub use record::{SeoPayload, UrlRecord};
pub use store::UrlStore;

/// Table holding the index.
pub const TABLE_NAME: &str = "url_generator_url";

/// Columns queried by equality on every build or render.
pub const INDEXED_COLUMNS: &[&str] = &["url", "article_id", "data_id", "profile_id"];

/// At most one record per content item, language and path kind.
pub const UNIQUE_KEY: &[&str] = &[
    "profile_id",
    "article_id",
    "clang_id",
    "data_id",
    "is_user_path",
    "is_structure",
];
