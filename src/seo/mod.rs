//! SEO tag derivation.
//!
//! Two states per render:
//!
//! - **Unmanaged**: no URL record backs the page; every tag is the
//!   rewriter's generic rendering.
//! - **Managed**: a record exists; its values override the generic ones
//!   before the rewriter's formatters render them.
//!
//! | Tag         | Managed override                                    |
//! |-------------|-----------------------------------------------------|
//! | title       | stored title into the title pattern, if non-empty   |
//! | description | stored description, if non-empty                    |
//! | canonical   | record URL                                          |
//! | hreflang    | sibling records in online languages                 |
//! | og/twitter  | stored title and description, canonical as full URL |
//! | image       | first stored image, if it resolves to a display image |
//! | robots      | never                                               |

mod og;
mod resolve;
mod tags;

pub use og::{ImageTag, SocialTags};
pub use resolve::ResolvedContent;
pub use tags::{SeoTags, normalize};

use std::collections::BTreeMap;

use crate::core::{IndexContext, RenderContext};
use crate::debug;
use crate::index::UrlRecord;
use crate::rewriter::GenericSeo;

/// Outcome of resolving a URL for an alternate language.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Resolution {
    Resolved(String),
    /// No page to point at.
    Unresolved,
}

/// Derives the tag set of a render from the index.
pub struct SeoLayer<'a> {
    ctx: IndexContext<'a>,
}

impl<'a> SeoLayer<'a> {
    pub fn new(ctx: IndexContext<'a>) -> Self {
        Self { ctx }
    }

    pub fn resolve(&self, render: &RenderContext) -> ResolvedContent {
        ResolvedContent::resolve(self.ctx, render)
    }

    /// Tags for an already resolved render.
    pub fn tags_for(&self, render: &RenderContext, resolved: &ResolvedContent) -> SeoTags {
        let generic = self
            .ctx
            .rewriter
            .generic_seo(render.article_id, render.clang_id);

        match resolved {
            ResolvedContent::Unmanaged => SeoTags::generic(generic),
            ResolvedContent::Managed(record) => self.managed(generic, record),
        }
    }

    fn managed(&self, mut values: GenericSeo, record: &UrlRecord) -> SeoTags {
        let title = normalize(&record.seo.title);
        if !title.is_empty() {
            values.title = title.clone();
        }
        let description = normalize(&record.seo.description);
        if !description.is_empty() {
            values.description = description.clone();
        }
        values.canonical = self.ctx.rewriter.absolute(&record.url, record.clang_id);
        values.hreflang = self.hreflang(record);

        let image = self.image(record);
        let social = SocialTags {
            og_type: "website",
            site_name: values.site_name.clone(),
            title,
            description,
            full_url: values.canonical.clone(),
            twitter_card: if image.is_some() {
                "summary_large_image"
            } else {
                "summary"
            },
        };

        SeoTags {
            values,
            social: Some(social),
            image,
        }
    }

    /// Language code → URL of the same content, for languages where it is online.
    fn hreflang(&self, record: &UrlRecord) -> BTreeMap<String, String> {
        let content = self.ctx.content;
        let active = content.active_language_ids();

        let siblings = match self.ctx.store.hreflang(&record.key(), &active) {
            Ok(siblings) => siblings,
            Err(e) => {
                debug!("seo"; "hreflang of record {}: {}", record.id, e);
                return BTreeMap::new();
            }
        };

        let mut alternates = BTreeMap::new();
        for &clang_id in &active {
            // A language's own record wins over a language-neutral one
            let Some(sibling) = siblings
                .iter()
                .find(|s| s.clang_id == clang_id)
                .or_else(|| siblings.iter().find(|s| s.clang_id == 0))
            else {
                continue;
            };
            let online = content
                .status(sibling.article_id, clang_id)
                .is_some_and(|s| s.online);
            if !online {
                continue;
            }
            let Some(language) = content.language(clang_id) else {
                continue;
            };
            if let Resolution::Resolved(url) = self.resolution(sibling, clang_id) {
                alternates.insert(language.code, url);
            }
        }
        alternates
    }

    fn resolution(&self, record: &UrlRecord, clang_id: u32) -> Resolution {
        if record.url.is_empty() {
            return Resolution::Unresolved;
        }
        Resolution::Resolved(self.ctx.rewriter.absolute(&record.url, clang_id))
    }

    fn image(&self, record: &UrlRecord) -> Option<ImageTag> {
        let name = record.seo.first_image()?;
        let media = self.ctx.media.media(name).filter(|m| m.is_image())?;
        Some(ImageTag::from_media(
            &media,
            &self.ctx.rewriter.origin(record.clang_id),
        ))
    }
}
