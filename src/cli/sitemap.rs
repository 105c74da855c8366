//! `sitemap` command.

use anyhow::Result;

use super::common::{open_database, with_index};
use crate::config::IndexConfig;
use crate::generator::sitemap::SitemapBuilder;
use crate::log;

/// Build and write the sitemap. `now` pins the fallback `lastmod`.
pub fn write_sitemap(config: &IndexConfig, now: Option<i64>) -> Result<()> {
    if !config.sitemap.enable {
        log!("sitemap"; "disabled in config, nothing written");
        return Ok(());
    }
    let db = open_database(config)?;
    with_index(config, &db, |ctx| {
        let mut builder = SitemapBuilder::new(ctx);
        if let Some(epoch) = now {
            builder = builder.with_now(epoch);
        }
        builder.build()?.write(&config.sitemap)
    })
}
