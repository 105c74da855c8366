//! Shared command setup: open the store and wire the collaborators.

use anyhow::{Context, Result};

use crate::config::IndexConfig;
use crate::content::TableContent;
use crate::core::IndexContext;
use crate::db::MemoryDatabase;
use crate::debug;
use crate::index::UrlStore;
use crate::rewriter::SlugRewriter;

/// Open the configured storage file.
pub fn open_database(config: &IndexConfig) -> Result<MemoryDatabase> {
    let path = &config.store.path;
    let db = MemoryDatabase::open(path)
        .with_context(|| format!("Failed to open store {}", path.display()))?;
    debug!("store"; "{} ({})", path.display(), db.table_names().join(", "));
    Ok(db)
}

/// Run `command` against an [`IndexContext`] over `db`.
pub fn with_index<T>(
    config: &IndexConfig,
    db: &MemoryDatabase,
    command: impl FnOnce(IndexContext<'_>) -> Result<T>,
) -> Result<T> {
    let store = UrlStore::new(db, config.store.user.clone());
    store.install().context("Failed to install the URL index table")?;

    let content = TableContent::new(db);
    let rewriter = SlugRewriter::new(db, config);
    let registry = config.registry();

    command(IndexContext {
        db,
        store: &store,
        registry: &registry,
        rewriter: &rewriter,
        content: &content,
        media: &content,
    })
}
