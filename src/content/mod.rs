//! Content and media repositories.
//!
//! The index never owns article or media data. It asks these
//! repositories whether content is online, which languages exist and
//! where a media file lives.

pub mod table;

pub use table::TableContent;

/// Publication state of one article in one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentStatus {
    pub online: bool,
    /// Publicly visible (no access restriction).
    pub permitted: bool,
    pub content_type: Option<String>,
}

impl ContentStatus {
    /// Online and visible to anonymous visitors.
    pub fn is_public(&self) -> bool {
        self.online && self.permitted
    }
}

/// A configured content language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Language {
    pub id: u32,
    /// Language code used in hreflang tags (`de`, `en-gb`).
    pub code: String,
    pub online: bool,
}

/// A resolved media file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Media {
    /// Path of the file below the site origin (`/media/a.jpg`).
    pub url: String,
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub extension: String,
}

/// File extensions treated as display images.
const IMAGE_EXTENSIONS: [&str; 9] = [
    "bmp", "gif", "jpeg", "jpg", "png", "svg", "tif", "tiff", "webp",
];

impl Media {
    pub fn is_image(&self) -> bool {
        is_image_name(&self.extension)
    }
}

/// Check a file name or bare extension against the display-image list.
pub fn is_image_name(name: &str) -> bool {
    let ext = name.rsplit('.').next().unwrap_or(name);
    IMAGE_EXTENSIONS
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(ext))
}

/// Article status and language lookups.
pub trait ContentRepository {
    /// Status of an article in a language, `None` when it does not exist.
    fn status(&self, article_id: u32, clang_id: u32) -> Option<ContentStatus>;

    /// Ids of all articles with the given content type.
    fn articles_of_type(&self, content_type: &str) -> Vec<u32>;

    /// All configured languages, ordered by id.
    fn languages(&self) -> Vec<Language>;

    fn language(&self, clang_id: u32) -> Option<Language> {
        self.languages().into_iter().find(|l| l.id == clang_id)
    }

    /// Ids of online languages.
    fn active_language_ids(&self) -> Vec<u32> {
        self.languages()
            .into_iter()
            .filter(|l| l.online)
            .map(|l| l.id)
            .collect()
    }

    /// Language-wildcard aware online check (`0` means "any language").
    fn is_language_online(&self, clang_id: u32) -> bool {
        clang_id == 0 || self.language(clang_id).is_some_and(|l| l.online)
    }
}

/// Media file lookups.
pub trait MediaRepository {
    fn media(&self, name: &str) -> Option<Media>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_image_name() {
        assert!(is_image_name("photo.JPG"));
        assert!(is_image_name("webp"));
        assert!(!is_image_name("manual.pdf"));
        assert!(!is_image_name("archive.tar.gz"));
    }

    #[test]
    fn test_status_is_public() {
        let status = ContentStatus {
            online: true,
            permitted: false,
            content_type: None,
        };
        assert!(!status.is_public());
    }
}
