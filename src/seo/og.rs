//! Open Graph, Twitter Card and image tag data.

use crate::content::Media;

/// Social card values of a managed page.
///
/// `title` and `description` are the stored values alone; empty ones emit
/// no tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocialTags {
    pub og_type: &'static str,
    pub site_name: String,
    pub title: String,
    pub description: String,
    /// Assembled absolute URL for sharing providers.
    pub full_url: String,
    pub twitter_card: &'static str,
}

impl SocialTags {
    pub fn tags(&self) -> Vec<String> {
        let mut tags = vec![property("og:type", self.og_type)];
        if !self.site_name.is_empty() {
            tags.push(property("og:site_name", &self.site_name));
        }
        if !self.title.is_empty() {
            tags.push(property("og:title", &self.title));
        }
        if !self.description.is_empty() {
            tags.push(property("og:description", &self.description));
        }
        tags.push(property("og:url", &self.full_url));

        tags.push(name("twitter:card", self.twitter_card));
        if !self.title.is_empty() {
            tags.push(name("twitter:title", &self.title));
        }
        if !self.description.is_empty() {
            tags.push(name("twitter:description", &self.description));
        }
        tags.push(name("twitter:url", &self.full_url));
        tags
    }
}

/// A resolved page image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageTag {
    /// Absolute URL.
    pub url: String,
    pub width: u32,
    pub height: u32,
}

impl ImageTag {
    pub fn from_media(media: &Media, origin: &str) -> Self {
        Self {
            url: format!("{}{}", origin, media.url),
            width: media.width,
            height: media.height,
        }
    }

    /// Dimension tags appear only for known, nonzero sizes.
    pub fn tags(&self) -> Vec<String> {
        let mut tags = vec![
            name("image", &self.url),
            property("og:image", &self.url),
        ];
        if self.width > 0 {
            tags.push(property("og:image:width", &self.width.to_string()));
        }
        if self.height > 0 {
            tags.push(property("og:image:height", &self.height.to_string()));
        }
        tags.push(name("twitter:image", &self.url));
        tags
    }
}

fn property(key: &str, content: &str) -> String {
    format!(r#"<meta property="{key}" content="{content}" />"#)
}

fn name(key: &str, content: &str) -> String {
    format!(r#"<meta name="{key}" content="{content}" />"#)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_dimensions_only_when_known() {
        let image = ImageTag {
            url: "https://example.com/media/a.jpg".into(),
            width: 800,
            height: 0,
        };
        let tags = image.tags();
        assert!(tags.iter().any(|t| t.contains(r#"property="og:image:width" content="800""#)));
        assert!(!tags.iter().any(|t| t.contains("og:image:height")));
        assert!(tags.iter().any(|t| t.contains("twitter:image")));
        assert_eq!(
            tags[0],
            r#"<meta name="image" content="https://example.com/media/a.jpg" />"#
        );
    }

    #[test]
    fn test_social_tags_skip_empty() {
        let social = SocialTags {
            og_type: "website",
            site_name: String::new(),
            title: "News".into(),
            description: String::new(),
            full_url: "https://example.com/en/news/".into(),
            twitter_card: "summary",
        };
        let tags = social.tags();
        assert_eq!(
            tags,
            [
                r#"<meta property="og:type" content="website" />"#,
                r#"<meta property="og:title" content="News" />"#,
                r#"<meta property="og:url" content="https://example.com/en/news/" />"#,
                r#"<meta name="twitter:card" content="summary" />"#,
                r#"<meta name="twitter:title" content="News" />"#,
                r#"<meta name="twitter:url" content="https://example.com/en/news/" />"#,
            ]
        );
    }
}
