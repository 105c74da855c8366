//! `[store]` section configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Storage file (relative to the config file's directory).
    pub path: PathBuf,
    /// Name written to the audit columns of new records.
    pub user: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: "urlindex.json".into(),
            user: "urlindex".into(),
        }
    }
}
