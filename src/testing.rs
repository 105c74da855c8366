//! Shared in-memory fixture for engine tests.
//!
//! ```text
//! languages: 1 en, 2 de, 3 fr (online), 4 it (offline)
//!
//! article 1 Home                    start article
//! article 3 News                    de offline
//! article 4 Events
//! └── article 5 Summer Fest         type "event", fr offline
//! article 6 Members                 type "event", en only, not permitted
//! article 7 About us / Über uns     en, de
//!
//! news 42 "Hello World"   a.jpg,b.jpg   2024-01-05 10:00:00   alias "hello"
//! news 43 "Second Post"   doc.pdf       epoch 1704448800
//! news 44 "Draft"         status 0 (outside the dataset)
//! news 45 "Hello World"   same slug as 42
//! ```

use serde_json::json;

use crate::config::IndexConfig;
use crate::content::TableContent;
use crate::content::table::{ARTICLE_TABLE, CLANG_TABLE, MEDIA_TABLE};
use crate::core::IndexContext;
use crate::db::MemoryDatabase;
use crate::index::UrlStore;
use crate::profile::ProfileRegistry;
use crate::rewriter::SlugRewriter;

pub const FIXTURE_CONFIG: &str = r#"
[site]
url = "https://example.com"
name = "Example"
description = "Example site"

[[profiles]]
id = 1
namespace = "news"
article_id = 3
structure_articles = [4]
table = { name = "news", segments = ["title"], restriction = { status = 1 }, lastmod = "updatedate", media = ["image"], user_path = "alias" }
seo = { title = "title", description = "teaser", image = "image" }
sitemap = { frequency = "daily", priority = 0.8 }

[[profiles]]
id = 2
namespace = "event"
content_type = "event"
sitemap = { frequency = "monthly", priority = 0.6 }
"#;

pub struct Fixture {
    pub db: MemoryDatabase,
    pub config: IndexConfig,
}

impl Fixture {
    pub fn new() -> Self {
        let db = MemoryDatabase::new();

        db.seed(
            CLANG_TABLE,
            [
                json!({"id": 1, "code": "en", "status": 1}),
                json!({"id": 2, "code": "de", "status": 1}),
                json!({"id": 3, "code": "fr", "status": 1}),
                json!({"id": 4, "code": "it", "status": 0}),
            ],
        )
        .unwrap();

        let article = |id: u32, clang: u32, name: &str, parent: u32, status: u8| {
            json!({"id": id, "clang_id": clang, "name": name, "parent_id": parent, "status": status})
        };
        let event = |clang: u32, name: &str, status: u8| {
            let mut row = article(5, clang, name, 4, status);
            row["type"] = json!("event");
            row["description"] = json!("Open air <b>party</b>");
            row
        };
        db.seed(
            ARTICLE_TABLE,
            [
                article(1, 1, "Home", 0, 1),
                article(1, 2, "Startseite", 0, 1),
                article(1, 3, "Accueil", 0, 1),
                article(3, 1, "News", 0, 1),
                article(3, 2, "Neuigkeiten", 0, 0),
                article(3, 3, "Actualités", 0, 1),
                article(4, 1, "Events", 0, 1),
                article(4, 2, "Veranstaltungen", 0, 1),
                article(4, 3, "Événements", 0, 1),
                event(1, "Summer Fest", 1),
                event(2, "Sommerfest", 1),
                event(3, "Fête d'été", 0),
                json!({"id": 6, "clang_id": 1, "name": "Members", "parent_id": 0, "status": 1,
                       "permitted": 0, "type": "event"}),
                article(7, 1, "About us", 0, 1),
                article(7, 2, "Über uns", 0, 1),
            ],
        )
        .unwrap();

        db.seed(
            "news",
            [
                json!({"id": 42, "title": "Hello World", "teaser": "<p>First &amp; \"best\"\nnews</p>",
                       "image": "a.jpg,b.jpg", "updatedate": "2024-01-05 10:00:00", "status": 1,
                       "alias": "hello"}),
                json!({"id": 43, "title": "Second Post", "teaser": "", "image": "doc.pdf",
                       "updatedate": "1704448800", "status": 1, "alias": ""}),
                json!({"id": 44, "title": "Draft", "status": 0}),
                json!({"id": 45, "title": "Hello World", "image": "", "updatedate": "", "status": 1}),
            ],
        )
        .unwrap();

        db.seed(
            MEDIA_TABLE,
            [
                json!({"filename": "a.jpg", "title": "Sunset <b>view</b>", "width": 800, "height": 600}),
                json!({"filename": "b.jpg", "title": "B", "width": 0, "height": 0}),
                json!({"filename": "doc.pdf", "title": "Document"}),
                json!({"filename": "c.png", "title": ""}),
            ],
        )
        .unwrap();

        let config: IndexConfig = toml::from_str(FIXTURE_CONFIG).unwrap();
        let fixture = Self { db, config };
        fixture.store().install().unwrap();
        fixture
    }

    pub fn content(&self) -> TableContent<'_> {
        TableContent::new(&self.db)
    }

    pub fn rewriter(&self) -> SlugRewriter<'_> {
        SlugRewriter::new(&self.db, &self.config)
    }

    pub fn store(&self) -> UrlStore<'_> {
        UrlStore::new(&self.db, "tester")
    }

    pub fn registry(&self) -> ProfileRegistry {
        self.config.registry()
    }

    /// Owned collaborators an [`IndexContext`] borrows from.
    pub fn parts(&self) -> Parts<'_> {
        Parts {
            db: &self.db,
            store: self.store(),
            registry: self.registry(),
            rewriter: self.rewriter(),
            content: self.content(),
        }
    }
}

pub struct Parts<'a> {
    pub db: &'a MemoryDatabase,
    pub store: UrlStore<'a>,
    pub registry: ProfileRegistry,
    pub rewriter: SlugRewriter<'a>,
    pub content: TableContent<'a>,
}

impl Parts<'_> {
    pub fn context(&self) -> IndexContext<'_> {
        IndexContext {
            db: self.db,
            store: &self.store,
            registry: &self.registry,
            rewriter: &self.rewriter,
            content: &self.content,
            media: &self.content,
        }
    }
}
