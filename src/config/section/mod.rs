//! Configuration section definitions.

mod site;
mod sitemap;
mod slug;
mod store;

pub use site::{LangPrefix, SiteConfig, TITLE_PLACEHOLDER};
pub use sitemap::SitemapConfig;
pub use slug::{SlugCase, SlugConfig, SlugMode, SlugSeparator};
pub use store::StoreConfig;
