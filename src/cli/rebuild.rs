//! `rebuild` command.

use anyhow::{Context, Result};

use super::args::RebuildArgs;
use super::common::{open_database, with_index};
use crate::config::IndexConfig;
use crate::generator::regen::{Generator, Mode};
use crate::generator::resolve::BuildReport;

impl RebuildArgs {
    /// Regeneration mode selected by the flags.
    pub fn mode(&self) -> Mode {
        match (self.article, &self.table, self.row) {
            (Some(article_id), _, _) => Mode::Content {
                article_id,
                clang_id: self.clang,
            },
            (None, Some(table), Some(data_id)) => Mode::Dataset {
                table: table.clone(),
                data_id,
            },
            _ => Mode::All,
        }
    }
}

/// Run one regeneration pass and persist the store.
pub fn rebuild(args: &RebuildArgs, config: &IndexConfig) -> Result<BuildReport> {
    let db = open_database(config)?;
    let report = with_index(config, &db, |ctx| {
        Generator::new(ctx)
            .execute(&args.mode())
            .context("Rebuild failed")
    })?;

    db.flush()
        .with_context(|| format!("Failed to write store {}", config.store.path.display()))?;
    Ok(report)
}
