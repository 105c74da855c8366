//! Sitemap generation.
//!
//! Lists every sitemap-eligible URL record whose language and content are
//! public, with the image extension for records that carry images.
//!
//! # Sitemap Format
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"
//!         xmlns:image="http://www.google.com/schemas/sitemap-image/1.1">
//!   <url>
//!     <loc>https://example.com/en/news/hello-world/</loc>
//!     <lastmod>2024-01-05T10:00:00+00:00</lastmod>
//!     <changefreq>daily</changefreq>
//!     <priority>0.8</priority>
//!     <image:image>
//!       <image:loc>https://example.com/media/a.jpg</image:loc>
//!       <image:title>Sunset view</image:title>
//!     </image:image>
//!   </url>
//! </urlset>
//! ```

use anyhow::{Context, Result};
use rustc_hash::FxHashSet;
use serde_json::Value;
use std::fs;

use crate::config::SitemapConfig;
use crate::content::is_image_name;
use crate::core::IndexContext;
use crate::db::DbError;
use crate::generator::{escape_xml, minify_xml};
use crate::index::UrlRecord;
use crate::log;
use crate::profile::{ChangeFrequency, Profile};
use crate::utils::date::{DateTimeUtc, epoch_from_value, now_epoch};
use crate::utils::html::strip_tags;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";
const IMAGE_NS: &str = "http://www.google.com/schemas/sitemap-image/1.1";

#[derive(Debug, Clone, PartialEq)]
pub struct Sitemap {
    pub urls: Vec<UrlEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UrlEntry {
    pub loc: String,
    pub lastmod: String,
    pub changefreq: ChangeFrequency,
    pub priority: f32,
    pub images: Vec<ImageEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEntry {
    pub loc: String,
    /// Plain text, markup stripped.
    pub title: String,
}

/// Collects sitemap entries from the URL store.
pub struct SitemapBuilder<'a> {
    ctx: IndexContext<'a>,
    now: i64,
}

impl<'a> SitemapBuilder<'a> {
    pub fn new(ctx: IndexContext<'a>) -> Self {
        Self {
            ctx,
            now: now_epoch(),
        }
    }

    /// Pin the fallback `lastmod` timestamp.
    pub fn with_now(mut self, epoch: i64) -> Self {
        self.now = epoch;
        self
    }

    pub fn build(&self) -> Result<Sitemap, DbError> {
        let mut seen = FxHashSet::default();
        let mut urls = Vec::new();

        for record in self.ctx.store.all()? {
            if !record.sitemap {
                continue;
            }
            let Some(profile) = self.ctx.registry.get(record.profile_id) else {
                continue;
            };
            if !profile.sitemap.add || !self.is_public(&record) || record.url.is_empty() {
                continue;
            }

            let origin = self.ctx.rewriter.origin(record.clang_id);
            let entry = UrlEntry {
                loc: format!("{}{}", origin, record.url.decoded()),
                lastmod: self.lastmod(profile, &record)?,
                changefreq: profile.sitemap.frequency,
                priority: profile.sitemap.priority,
                images: self.images(profile, &record, &origin)?,
            };

            // Alias and structure paths of the same row
            let extra: Vec<String> = if record.data_id == 0 {
                Vec::new()
            } else {
                self.ctx
                    .store
                    .origin_and_expanded(record.profile_id, record.data_id, record.clang_id)?
                    .into_iter()
                    .filter(|other| !other.url.is_empty() && other.url != record.url)
                    .map(|other| format!("{}{}", origin, other.url.decoded()))
                    .collect()
            };

            for loc in extra {
                let synthetic = UrlEntry {
                    loc,
                    images: Vec::new(),
                    ..entry.clone()
                };
                if seen.insert(synthetic.loc.clone()) {
                    urls.push(synthetic);
                }
            }
            if seen.insert(entry.loc.clone()) {
                urls.push(entry);
            }
        }

        Ok(Sitemap { urls })
    }

    /// Language online and content online and permitted.
    ///
    /// Language-neutral records count when public in any active language.
    fn is_public(&self, record: &UrlRecord) -> bool {
        let content = self.ctx.content;
        let public = |clang_id| {
            content
                .status(record.article_id, clang_id)
                .is_some_and(|s| s.is_public())
        };

        if record.clang_id == 0 {
            return content.active_language_ids().into_iter().any(public);
        }
        content.is_language_online(record.clang_id) && public(record.clang_id)
    }

    /// Source row timestamp, then the stored value, then now.
    fn lastmod(&self, profile: &Profile, record: &UrlRecord) -> Result<String, DbError> {
        let live = match profile.table.as_ref() {
            Some(table) => match &table.lastmod {
                Some(column) => self
                    .ctx
                    .db
                    .value(&table.name, &table.column_id, &Value::from(record.data_id), column)?
                    .as_ref()
                    .and_then(value_text)
                    .and_then(|text| epoch_from_value(&text)),
                None => None,
            },
            None => None,
        };

        let epoch = live
            .or_else(|| DateTimeUtc::parse(&record.lastmod).map(DateTimeUtc::to_epoch))
            .unwrap_or(self.now);
        Ok(DateTimeUtc::from_epoch(epoch).to_w3c())
    }

    /// Images from the profile's media columns, else from the stored SEO image.
    fn images(
        &self,
        profile: &Profile,
        record: &UrlRecord,
        origin: &str,
    ) -> Result<Vec<ImageEntry>, DbError> {
        let names = match profile.table.as_ref().filter(|t| !t.media.is_empty()) {
            Some(table) => self
                .ctx
                .db
                .row(&table.name, &table.column_id, &Value::from(record.data_id))?
                .map(|row| {
                    table
                        .media
                        .iter()
                        .filter_map(|column| row.get(column).and_then(value_text))
                        .collect::<Vec<_>>()
                        .join(",")
                })
                .unwrap_or_default(),
            None => record.seo.image.clone(),
        };

        let mut seen = FxHashSet::default();
        Ok(names
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty() && is_image_name(name))
            .filter(|name| seen.insert(*name))
            .filter_map(|name| self.ctx.media.media(name))
            .map(|media| ImageEntry {
                loc: format!("{}{}", origin, media.url),
                title: strip_tags(&media.title).trim().to_string(),
            })
            .collect())
    }
}

/// Two decimals at most, one at least: `0.75`, `0.8`, `1.0`.
fn format_priority(priority: f32) -> String {
    let fixed = format!("{priority:.2}");
    let trimmed = fixed.trim_end_matches('0');
    if trimmed.ends_with('.') {
        format!("{trimmed}0")
    } else {
        trimmed.to_string()
    }
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl Sitemap {
    pub fn into_xml(self) -> String {
        let mut xml = String::with_capacity(4096);

        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str("<urlset xmlns=\"");
        xml.push_str(SITEMAP_NS);
        xml.push_str("\" xmlns:image=\"");
        xml.push_str(IMAGE_NS);
        xml.push_str("\">\n");

        for entry in self.urls {
            xml.push_str("  <url>\n    <loc>");
            xml.push_str(&escape_xml(&entry.loc));
            xml.push_str("</loc>\n    <lastmod>");
            xml.push_str(&entry.lastmod);
            xml.push_str("</lastmod>\n    <changefreq>");
            xml.push_str(entry.changefreq.as_str());
            xml.push_str("</changefreq>\n    <priority>");
            xml.push_str(&format_priority(entry.priority));
            xml.push_str("</priority>\n");
            for image in entry.images {
                xml.push_str("    <image:image>\n      <image:loc>");
                xml.push_str(&escape_xml(&image.loc));
                xml.push_str("</image:loc>\n");
                if !image.title.is_empty() {
                    xml.push_str("      <image:title>");
                    xml.push_str(&escape_xml(&image.title));
                    xml.push_str("</image:title>\n");
                }
                xml.push_str("    </image:image>\n");
            }
            xml.push_str("  </url>\n");
        }

        xml.push_str("</urlset>\n");
        xml
    }

    pub fn write(self, config: &SitemapConfig) -> Result<()> {
        let path = &config.path;
        let count = self.urls.len();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let xml = self.into_xml();
        let xml = minify_xml(&xml, config.minify);
        fs::write(path, xml.as_bytes())
            .with_context(|| format!("Failed to write sitemap to {}", path.display()))?;

        log!("sitemap"; "{} ({} urls)", path.display(), count);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Database, Where};
    use crate::generator::regen::{Generator, Mode};
    use crate::rewriter::{Locator, Rewriter};
    use crate::testing::Fixture;
    use serde_json::json;

    const NOW: i64 = 1_700_000_000;

    fn sitemap(fixture: &Fixture) -> Sitemap {
        let parts = fixture.parts();
        Generator::new(parts.context()).execute(&Mode::All).unwrap();
        SitemapBuilder::new(parts.context()).with_now(NOW).build().unwrap()
    }

    fn entry<'s>(sitemap: &'s Sitemap, loc: &str) -> Option<&'s UrlEntry> {
        sitemap.urls.iter().find(|u| u.loc == loc)
    }

    #[test]
    fn test_entry_from_row() {
        let fixture = Fixture::new();
        let sitemap = sitemap(&fixture);

        let hello = entry(&sitemap, "https://example.com/en/news/hello-world/").unwrap();
        assert_eq!(hello.lastmod, "2024-01-05T10:00:00+00:00");
        assert_eq!(hello.changefreq, ChangeFrequency::Daily);
        assert!((hello.priority - 0.8).abs() < f32::EPSILON);
        assert_eq!(
            hello.images,
            [
                ImageEntry {
                    loc: "https://example.com/media/a.jpg".into(),
                    title: "Sunset view".into(),
                },
                ImageEntry {
                    loc: "https://example.com/media/b.jpg".into(),
                    title: "B".into(),
                },
            ]
        );
    }

    #[test]
    fn test_images_listed_once() {
        let fixture = Fixture::new();
        let row = json!({"id": 42, "title": "Hello World", "image": "a.jpg, b.jpg,a.jpg",
                         "updatedate": "2024-01-05 10:00:00", "status": 1});
        fixture.db.delete("news", &Where::new().eq("id", 42)).unwrap();
        fixture
            .db
            .insert("news", row.as_object().cloned().unwrap())
            .unwrap();

        let sitemap = sitemap(&fixture);
        let hello = entry(&sitemap, "https://example.com/en/news/hello-world/").unwrap();
        let locs: Vec<&str> = hello.images.iter().map(|i| i.loc.as_str()).collect();
        assert_eq!(
            locs,
            ["https://example.com/media/a.jpg", "https://example.com/media/b.jpg"]
        );
    }

    #[test]
    fn test_priority_keeps_configured_precision() {
        assert_eq!(format_priority(0.75), "0.75");
        assert_eq!(format_priority(0.8), "0.8");
        assert_eq!(format_priority(1.0), "1.0");
        assert_eq!(format_priority(0.0), "0.0");
    }

    #[test]
    fn test_lastmod_sources() {
        let fixture = Fixture::new();
        let sitemap = sitemap(&fixture);

        let epoch = entry(&sitemap, "https://example.com/en/news/second-post/").unwrap();
        assert_eq!(epoch.lastmod, "2024-01-05T10:00:00+00:00");
        // Not an image
        assert!(epoch.images.is_empty());

        // Empty column falls back to the stored value
        let blank = entry(&sitemap, "https://example.com/en/news/hello-world/45/").unwrap();
        assert!(blank.lastmod.ends_with("+00:00"));
        assert!(blank.lastmod.starts_with("20"));
    }

    #[test]
    fn test_excludes_offline_and_unpermitted() {
        let fixture = Fixture::new();
        let sitemap = sitemap(&fixture);
        let locs: Vec<&str> = sitemap.urls.iter().map(|u| u.loc.as_str()).collect();

        // News is offline in German
        assert!(!locs.iter().any(|l| l.contains("/de/neuigkeiten/")));
        // Members is not permitted
        assert!(!locs.iter().any(|l| l.contains("/members/")));
        // Summer Fest is offline in French
        let fest = fixture.rewriter().path(&Locator::article(5, 3)).unwrap();
        let fest = format!("https://example.com{}", fest.decoded());
        assert!(!locs.contains(&fest.as_str()));

        assert!(locs.contains(&"https://example.com/de/veranstaltungen/sommerfest/"));
        assert!(locs.contains(&"https://example.com/fr/actualités/hello-world/"));
    }

    #[test]
    fn test_alias_paths_are_synthetic_entries() {
        let fixture = Fixture::new();
        let sitemap = sitemap(&fixture);

        let alias = entry(&sitemap, "https://example.com/hello").unwrap();
        assert_eq!(alias.lastmod, "2024-01-05T10:00:00+00:00");
        assert!(alias.images.is_empty());
        assert!(entry(&sitemap, "https://example.com/en/events/hello-world/").is_some());

        let unique: FxHashSet<&str> = sitemap.urls.iter().map(|u| u.loc.as_str()).collect();
        assert_eq!(unique.len(), sitemap.urls.len());
    }

    #[test]
    fn test_profile_opt_out() {
        let mut fixture = Fixture::new();
        for profile in &mut fixture.config.profiles {
            profile.sitemap.add = false;
        }
        assert!(sitemap(&fixture).urls.is_empty());
    }

    #[test]
    fn test_into_xml() {
        let sitemap = Sitemap {
            urls: vec![UrlEntry {
                loc: "https://example.com/a&b/".into(),
                lastmod: "2024-01-05T10:00:00+00:00".into(),
                changefreq: ChangeFrequency::Weekly,
                priority: 0.5,
                images: vec![
                    ImageEntry {
                        loc: "https://example.com/media/a.jpg".into(),
                        title: "Tom & Jerry".into(),
                    },
                    ImageEntry {
                        loc: "https://example.com/media/c.png".into(),
                        title: String::new(),
                    },
                ],
            }],
        };
        let xml = sitemap.into_xml();

        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains(&format!(r#"xmlns:image="{IMAGE_NS}""#)));
        assert!(xml.contains("<loc>https://example.com/a&amp;b/</loc>"));
        assert!(xml.contains("<priority>0.5</priority>"));
        assert!(xml.contains("<changefreq>weekly</changefreq>"));
        assert!(xml.contains("<image:title>Tom &amp; Jerry</image:title>"));
        assert_eq!(xml.matches("<image:image>").count(), 2);
        assert_eq!(xml.matches("<image:title>").count(), 1);
        assert!(xml.trim_end().ends_with("</urlset>"));
    }

    #[test]
    fn test_write_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let config = SitemapConfig {
            enable: true,
            path: dir.path().join("public/sitemap.xml"),
            minify: true,
        };
        let sitemap = Sitemap { urls: Vec::new() };
        sitemap.write(&config).unwrap();

        let xml = fs::read_to_string(&config.path).unwrap();
        assert!(!xml.contains('\n'));
        assert!(xml.ends_with("</urlset>"));
    }
}
