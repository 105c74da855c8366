//! urlindex - URL index and resolution engine for structured content.

mod cli;
mod config;
mod content;
mod core;
mod db;
mod generator;
mod index;
mod logger;
mod pipeline;
mod profile;
mod rewriter;
mod seo;
mod utils;

#[cfg(test)]
mod testing;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::IndexConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = IndexConfig::load(&cli)?;

    match &cli.command {
        Commands::Rebuild { args } => cli::rebuild::rebuild(args, &config).map(|_| ()),
        Commands::Sitemap { now, .. } => cli::sitemap::write_sitemap(&config, *now),
        Commands::Seo { url, article, clang } => {
            cli::seo::print_tags(url, *article, *clang, &config)
        }
        Commands::Lookup { url, profile } => {
            cli::seo::print_records(url.as_deref(), *profile, &config)
        }
        Commands::Links { input, clang } => {
            cli::links::interpolate_file(input.as_deref(), *clang, &config)
        }
    }
}
