//! `links` command.

use anyhow::{Context, Result};
use std::fs;
use std::io::{Read, Write, stdin, stdout};
use std::path::Path;

use super::common::{open_database, with_index};
use crate::config::IndexConfig;
use crate::core::RenderContext;
use crate::pipeline::LinkInterpolator;

/// Interpolate locators in a file (or stdin) and print the result.
pub fn interpolate_file(input: Option<&Path>, clang_id: u32, config: &IndexConfig) -> Result<()> {
    let text = match input.filter(|p| p.as_os_str() != "-") {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };

    let db = open_database(config)?;
    let output = with_index(config, &db, |ctx| {
        let render = RenderContext::new(0, clang_id, "");
        Ok(LinkInterpolator::new(ctx)
            .interpolate(&text, &render)
            .into_owned())
    })?;

    stdout()
        .write_all(output.as_bytes())
        .context("Failed to write output")
}
