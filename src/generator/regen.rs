//! Regeneration passes.
//!
//! Every pass deletes before it builds, so no stale record outlives the
//! pass that covers its key:
//!
//! ```text
//! All                 truncate ──▶ build every profile
//! Content(a, c)       per bound profile: delete profile ──▶ build profile
//! Dataset(t, id)      per table profile: delete (profile, id) ──▶ build row
//! ```
//!
//! A failing profile is logged and skipped; the pass continues.

use std::fmt;

use super::resolve::{BuildReport, UrlBuilder};
use crate::core::IndexContext;
use crate::db::DbError;
use crate::log;
use crate::profile::Profile;

/// What triggered a regeneration pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Rebuild the whole index.
    All,
    /// An article changed (`clang_id == 0`: in any language).
    Content { article_id: u32, clang_id: u32 },
    /// A row of a source table changed.
    Dataset { table: String, data_id: u64 },
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Content {
                article_id,
                clang_id,
            } => write!(f, "article {article_id} (clang {clang_id})"),
            Self::Dataset { table, data_id } => write!(f, "{table} row {data_id}"),
        }
    }
}

/// Drives [`UrlBuilder`] over the profiles a [`Mode`] selects.
pub struct Generator<'a> {
    ctx: IndexContext<'a>,
    builder: UrlBuilder<'a>,
}

impl<'a> Generator<'a> {
    pub fn new(ctx: IndexContext<'a>) -> Self {
        Self {
            ctx,
            builder: UrlBuilder::new(ctx),
        }
    }

    /// Run one pass.
    ///
    /// Only the global truncate of [`Mode::All`] aborts the pass; per
    /// profile failures are logged and leave that profile's prior state.
    pub fn execute(&self, mode: &Mode) -> Result<BuildReport, DbError> {
        let mut total = BuildReport::default();

        match mode {
            Mode::All => {
                self.ctx.store.delete_all()?;
                for profile in self.ctx.registry.all() {
                    total += self.run(profile, || self.builder.build_profile(profile));
                }
            }
            Mode::Content {
                article_id,
                clang_id,
            } => {
                let profiles =
                    self.ctx
                        .registry
                        .bound_to_content(*article_id, *clang_id, self.ctx.content);
                for profile in profiles {
                    total += self.run(profile, || {
                        self.ctx.store.delete_by_profile(profile.id)?;
                        self.builder.build_profile(profile)
                    });
                }
            }
            Mode::Dataset { table, data_id } => {
                for profile in self.ctx.registry.by_table(table) {
                    total += self.run(profile, || {
                        self.ctx
                            .store
                            .delete_by_profile_and_dataset(profile.id, *data_id)?;
                        self.builder.build_dataset(profile, *data_id)
                    });
                }
            }
        }

        log!(
            "rebuild";
            "{}: {} saved, {} failed, {} skipped",
            mode, total.saved, total.failed, total.skipped
        );
        Ok(total)
    }

    fn run(
        &self,
        profile: &Profile,
        pass: impl FnOnce() -> Result<BuildReport, DbError>,
    ) -> BuildReport {
        match pass() {
            Ok(report) => {
                log!(
                    "rebuild";
                    "profile {} ({}): {} saved, {} failed",
                    profile.id, profile.namespace, report.saved, report.failed
                );
                report
            }
            Err(e) => {
                log!("error"; "profile {} ({}): {}", profile.id, profile.namespace, e);
                BuildReport::default()
            }
        }
    }
}
