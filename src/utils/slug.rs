//! Path segment slugification.

use crate::config::{SlugCase, SlugConfig, SlugMode};
use deunicode::deunicode;

/// Slugify one path segment according to `config`.
///
/// Runs of characters that are not kept collapse into a single separator;
/// leading and trailing separators are dropped.
///
/// # Examples
/// ```ignore
/// slugify("Hello World!", &SlugConfig::default()) // "hello-world"
/// slugify("Über uns", &SlugConfig::default())     // "über-uns"
/// ```
pub fn slugify(text: &str, config: &SlugConfig) -> String {
    let text = text.trim();
    if config.path == SlugMode::No {
        return text.to_string();
    }

    let source = match config.path {
        SlugMode::Full | SlugMode::Ascii => deunicode(text),
        _ => text.to_string(),
    };
    let cased = match (config.path, config.case) {
        (SlugMode::Full, _) | (_, SlugCase::Lower) => source.to_lowercase(),
        (_, SlugCase::Upper) => source.to_uppercase(),
        (_, SlugCase::Preserve) => source,
    };

    let separator = config.separator.as_char();
    let mut slug = String::with_capacity(cased.len());
    let mut pending_separator = false;

    for c in cased.chars() {
        let keep = match config.path {
            SlugMode::Safe => c.is_alphanumeric(),
            _ => c.is_ascii_alphanumeric(),
        };
        if keep {
            if pending_separator && !slug.is_empty() {
                slug.push(separator);
            }
            pending_separator = false;
            slug.push(c);
        } else {
            pending_separator = true;
        }
    }

    slug
}
