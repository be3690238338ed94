//! YouTube video references.
//!
//! Turns whatever the user pasted into a validated video identifier.

use crate::error::{RecapError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use url::Url;

fn video_id_regex() -> &'static Regex {
    static VIDEO_ID: OnceLock<Regex> = OnceLock::new();
    VIDEO_ID.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").expect("Invalid regex"))
}

fn is_youtube_host(host: &str) -> bool {
    let host = host.to_ascii_lowercase();
    host == "youtube.com" || host == "youtu.be" || host.ends_with(".youtube.com")
}

/// A validated YouTube video identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoReference(String);

impl VideoReference {
    /// Extract the video identifier from a YouTube URL or a bare identifier.
    ///
    /// Accepts `watch?v=`, `youtu.be/`, `/embed/`, `/shorts/`, `/live/` and `/v/`
    /// shapes, with or without a scheme.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(RecapError::InvalidReference("empty URL".to_string()));
        }

        if video_id_regex().is_match(input) {
            return Ok(Self(input.to_string()));
        }

        let with_scheme = if input.contains("://") {
            input.to_string()
        } else {
            format!("https://{}", input)
        };

        let url = Url::parse(&with_scheme)
            .map_err(|_| RecapError::InvalidReference(input.to_string()))?;

        Self::from_url(&url).ok_or_else(|| RecapError::InvalidReference(input.to_string()))
    }

    fn from_url(url: &Url) -> Option<Self> {
        let host = url.host_str()?;
        if !is_youtube_host(host) {
            return None;
        }

        let mut segments = url.path_segments()?.filter(|s| !s.is_empty());
        let candidate = if host.eq_ignore_ascii_case("youtu.be") {
            segments.next().map(str::to_string)
        } else {
            match segments.next() {
                Some("watch") => url
                    .query_pairs()
                    .find(|(k, _)| k == "v")
                    .map(|(_, v)| v.into_owned()),
                Some("embed" | "shorts" | "live" | "v") => segments.next().map(str::to_string),
                _ => None,
            }
        }?;

        video_id_regex()
            .is_match(&candidate)
            .then_some(Self(candidate))
    }

    /// The bare identifier.
    pub fn id(&self) -> &str {
        &self.0
    }

    /// Canonical watch URL.
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.0)
    }

    /// Embeddable player URL.
    pub fn embed_url(&self) -> String {
        format!("https://www.youtube.com/embed/{}", self.0)
    }
}

impl std::fmt::Display for VideoReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for VideoReference {
    type Err = RecapError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(input: &str) -> Option<String> {
        VideoReference::parse(input).ok().map(|r| r.id().to_string())
    }

    #[test]
    fn test_short_url() {
        assert_eq!(id("https://youtu.be/dQw4w9WgXcQ").as_deref(), Some("dQw4w9WgXcQ"));
        assert_eq!(id("https://youtu.be/dQw4w9WgXcQ?si=abc").as_deref(), Some("dQw4w9WgXcQ"));
    }

    #[test]
    fn test_url_shapes() {
        for input in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ&t=42",
            "http://m.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://music.youtube.com/watch?v=dQw4w9WgXcQ&list=RD",
            "youtube.com/watch?v=dQw4w9WgXcQ",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://www.youtube.com/shorts/dQw4w9WgXcQ",
            "https://www.youtube.com/live/dQw4w9WgXcQ?feature=share",
            "https://www.youtube.com/v/dQw4w9WgXcQ",
            "  dQw4w9WgXcQ  ",
        ] {
            assert_eq!(id(input).as_deref(), Some("dQw4w9WgXcQ"), "input: {}", input);
        }
    }

    #[test]
    fn test_extraction_is_stable() {
        let url = "https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=10";
        let first = VideoReference::parse(url).unwrap();
        for _ in 0..5 {
            assert_eq!(VideoReference::parse(url).unwrap(), first);
        }
    }

    #[test]
    fn test_invalid_references() {
        for input in [
            "",
            "not a url",
            "https://vimeo.com/123456789",
            "https://example.com/watch?v=dQw4w9WgXcQ",
            "https://www.youtube.com/watch?v=short",
            "https://www.youtube.com/watch?list=PL123",
            "https://www.youtube.com/@channel",
            "https://youtu.be/",
            "https://notyoutube.com/watch?v=dQw4w9WgXcQ",
        ] {
            let err = VideoReference::parse(input).unwrap_err();
            assert!(matches!(err, RecapError::InvalidReference(_)), "input: {}", input);
        }
    }

    #[test]
    fn test_urls() {
        let video = VideoReference::parse("https://youtu.be/dQw4w9WgXcQ").unwrap();
        assert_eq!(video.watch_url(), "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
        assert_eq!(video.embed_url(), "https://www.youtube.com/embed/dQw4w9WgXcQ");
        assert_eq!(video.to_string(), "dQw4w9WgXcQ");
    }
}
