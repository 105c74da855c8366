//! Which URL record, if any, backs the page being rendered.

use crate::core::{IndexContext, RenderContext};
use crate::db::DbError;
use crate::debug;
use crate::index::UrlRecord;

/// Outcome of matching a render against the index.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedContent {
    /// No record; tags come from the rewriter unchanged.
    Unmanaged,
    /// The canonical record of the rendered content.
    Managed(UrlRecord),
}

impl ResolvedContent {
    /// Match the request path first, then the rendered article.
    ///
    /// Alias hits are traded for their canonical record. Store failures
    /// degrade to [`ResolvedContent::Unmanaged`].
    pub fn resolve(ctx: IndexContext<'_>, render: &RenderContext) -> Self {
        match Self::lookup(ctx, render) {
            Ok(Some(record)) => Self::Managed(record),
            Ok(None) => Self::Unmanaged,
            Err(e) => {
                debug!("seo"; "{}: {}", render.path, e);
                Self::Unmanaged
            }
        }
    }

    pub fn record(&self) -> Option<&UrlRecord> {
        match self {
            Self::Managed(record) => Some(record),
            Self::Unmanaged => None,
        }
    }

    fn lookup(ctx: IndexContext<'_>, render: &RenderContext) -> Result<Option<UrlRecord>, DbError> {
        let store = ctx.store;
        let Some(hit) = store.by_url(&render.path)?.into_iter().next() else {
            return store.by_article(render.article_id, render.clang_id);
        };
        if hit.is_canonical() {
            return Ok(Some(hit));
        }

        let canonical = if hit.data_id == 0 {
            store.by_article(hit.article_id, hit.clang_id)?
        } else {
            store.origin(hit.profile_id, hit.data_id, hit.clang_id)?
        };
        Ok(Some(canonical.unwrap_or(hit)))
    }
}
