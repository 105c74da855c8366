//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// URL index and resolution engine CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path (default: urlindex.toml)
    #[arg(short = 'C', long, default_value = "urlindex.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Regenerate URL records (all, one article, or one dataset row)
    #[command(visible_alias = "r")]
    Rebuild {
        #[command(flatten)]
        args: RebuildArgs,
    },

    /// Write the sitemap XML
    #[command(visible_alias = "s")]
    Sitemap {
        /// Output file (default: [sitemap].path)
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        output: Option<PathBuf>,

        /// Unix timestamp used as `lastmod` when no date is known (default: now)
        #[arg(long, value_name = "EPOCH")]
        now: Option<i64>,
    },

    /// Print the SEO head tags for a request URL
    Seo {
        /// Request URL or path
        url: String,

        /// Article being rendered, used when the URL is not indexed
        #[arg(short, long, default_value_t = 0)]
        article: u32,

        /// Language being rendered
        #[arg(short = 'l', long, default_value_t = 1)]
        clang: u32,
    },

    /// Print the records stored under a URL, or listed for a profile, as JSON
    #[command(visible_alias = "l")]
    Lookup {
        /// Request URL or path
        #[arg(required_unless_present = "profile")]
        url: Option<String>,

        /// List the online records of a profile instead
        #[arg(short, long, conflicts_with = "url")]
        profile: Option<u32>,
    },

    /// Replace `table://` locators in a file with indexed URLs
    Links {
        /// Input file; `-` or omitted reads stdin
        #[arg(value_hint = clap::ValueHint::FilePath)]
        input: Option<PathBuf>,

        /// Language for locators without one
        #[arg(short = 'l', long, default_value_t = 1)]
        clang: u32,
    },
}

/// Rebuild scope. Without options everything is rebuilt.
#[derive(clap::Args, Debug, Clone)]
pub struct RebuildArgs {
    /// Rebuild the profiles bound to this article
    #[arg(short, long, conflicts_with_all = ["table", "row"])]
    pub article: Option<u32>,

    /// Language of `--article` (0: any)
    #[arg(short = 'l', long, default_value_t = 0)]
    pub clang: u32,

    /// Source table of a changed row
    #[arg(short, long, requires = "row")]
    pub table: Option<String>,

    /// Primary key of the changed row
    #[arg(short, long, requires = "table")]
    pub row: Option<u64>,
}
