//! `seo` and `lookup` commands.

use anyhow::{Context, Result};
use std::io::{Write, stdout};

use super::common::{open_database, with_index};
use crate::config::IndexConfig;
use crate::core::RenderContext;
use crate::seo::{ResolvedContent, SeoLayer};

/// Print the head tags a render of `url` would carry.
pub fn print_tags(url: &str, article_id: u32, clang_id: u32, config: &IndexConfig) -> Result<()> {
    let db = open_database(config)?;
    let rendered = with_index(config, &db, |ctx| {
        let layer = SeoLayer::new(ctx);
        let mut render = RenderContext::new(article_id, clang_id, url);

        // Render the indexed content itself, not the requested fallback
        let resolved = layer.resolve(&render);
        if let ResolvedContent::Managed(record) = &resolved {
            render.article_id = record.article_id;
            render.clang_id = record.clang_id;
        }
        Ok(layer.tags_for(&render, &resolved).render())
    })?;

    writeln!(stdout(), "{rendered}").context("Failed to write tags")
}

/// Print the records stored under `url`, or the online records of
/// `profile`, as JSON.
pub fn print_records(url: Option<&str>, profile: Option<u32>, config: &IndexConfig) -> Result<()> {
    let db = open_database(config)?;
    let records = with_index(config, &db, |ctx| match (url, profile) {
        (_, Some(profile_id)) => Ok(ctx.store.by_profile(profile_id, ctx.content)?),
        (Some(url), None) => Ok(ctx.store.by_url(url)?),
        (None, None) => Ok(Vec::new()),
    })?;
    let json = serde_json::to_string_pretty(&records)?;
    writeln!(stdout(), "{json}").context("Failed to write records")
}
