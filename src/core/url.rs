//! URL path type for type-safe URL handling.
//!
//! - Stored representation: percent-encoded path, no scheme/host/query
//! - Browser boundary: normalize on input, decode only for display

use std::sync::{Arc, OnceLock};

use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use serde::{Deserialize, Serialize};

/// Characters escaped inside a single path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Encoded URL path (stored representation)
///
/// Invariants:
/// - Never contains scheme, host, query string or fragment
/// - Always starts with `/` unless empty
/// - Each segment is percent-encoded exactly once
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UrlPath(Arc<str>);

impl UrlPath {
    /// Create from a path produced by a rewriter (decoded or encoded).
    ///
    /// Segments are decoded then re-encoded, so equal paths compare equal
    /// whatever encoding the caller used.
    pub fn new(path: &str) -> Self {
        let trimmed = path.trim();
        if trimmed.is_empty() {
            return Self(Arc::from(""));
        }

        let with_leading = if trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{trimmed}")
        };

        Self(Arc::from(Self::encode(&with_leading)))
    }

    /// Create from a request URL or absolute URL.
    ///
    /// Strips scheme, host, query string and fragment before normalizing.
    pub fn from_request(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Self(Arc::from(""));
        }

        // Absolute URLs carry their own host; everything else is resolved
        // against a dummy base so `url` handles dot segments and queries.
        let parsed = url::Url::parse(trimmed).or_else(|_| {
            static BASE: OnceLock<Option<url::Url>> = OnceLock::new();
            let base = BASE.get_or_init(|| url::Url::parse("http://x").ok());
            match base {
                Some(base) => base.join(trimmed),
                None => Err(url::ParseError::EmptyHost),
            }
        });

        match parsed {
            Ok(parsed) if parsed.has_host() => Self::new(parsed.path()),
            // Fallback to simple split if url parsing fails
            _ => Self::new(trimmed.split(['?', '#']).next().unwrap_or(trimmed)),
        }
    }

    fn encode(path: &str) -> String {
        path.split('/')
            .map(|segment| {
                let decoded = percent_decode_str(segment).decode_utf8_lossy();
                utf8_percent_encode(&decoded, SEGMENT).to_string()
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Get the encoded URL path as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Human-readable path (percent-decoded).
    pub fn decoded(&self) -> String {
        percent_decode_str(&self.0).decode_utf8_lossy().into_owned()
    }

    /// Check if the path is empty (no page to point at).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append one already-slugified segment, keeping the trailing slash style.
    pub fn join(&self, segment: &str) -> Self {
        let segment = segment.trim_matches('/');
        if segment.is_empty() {
            return self.clone();
        }
        let base = self.0.trim_end_matches('/');
        if self.0.ends_with('/') {
            Self::new(&format!("{base}/{segment}/"))
        } else {
            Self::new(&format!("{base}/{segment}"))
        }
    }
}

impl std::fmt::Display for UrlPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for UrlPath {
    fn default() -> Self {
        Self(Arc::from(""))
    }
}

impl From<&str> for UrlPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl PartialEq<str> for UrlPath {
    fn eq(&self, other: &str) -> bool {
        self.0.as_ref() == other
    }
}

impl PartialEq<&str> for UrlPath {
    fn eq(&self, other: &&str) -> bool {
        self.0.as_ref() == *other
    }
}

impl Serialize for UrlPath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for UrlPath {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::new(&s))
    }
}
