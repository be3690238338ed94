//! Caption track listing and selection.

use super::TranscriptOrigin;
use crate::error::{RecapError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use url::Url;

/// Whether a caption track was uploaded or generated by YouTube.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptionKind {
    Manual,
    Generated,
}

/// A caption track available for a video.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionTrack {
    pub language: String,
    pub kind: CaptionKind,
    /// Download URL of the WebVTT rendition.
    pub url: Url,
}

/// All caption tracks of one video.
#[derive(Debug, Clone, Default)]
pub struct CaptionCatalog {
    pub tracks: Vec<CaptionTrack>,
}

#[derive(Debug, Deserialize)]
struct YtDlpInfo {
    language: Option<String>,
    #[serde(default)]
    subtitles: BTreeMap<String, Vec<YtDlpFormat>>,
    #[serde(default)]
    automatic_captions: BTreeMap<String, Vec<YtDlpFormat>>,
}

#[derive(Debug, Deserialize)]
struct YtDlpFormat {
    ext: Option<String>,
    url: Option<String>,
}

impl CaptionCatalog {
    /// Build the catalog from `yt-dlp --dump-json` output.
    ///
    /// Automatic captions contain one entry per translation target; only the
    /// original speech track (`xx-orig`, or the video's own language) is kept
    /// since translations are requested explicitly.
    pub fn from_ytdlp_json(json: &str) -> Result<Self> {
        let info: YtDlpInfo = serde_json::from_str(json)?;

        let mut tracks = Vec::new();

        for (language, formats) in &info.subtitles {
            if language == "live_chat" {
                continue;
            }
            if let Some(url) = vtt_url(formats) {
                tracks.push(CaptionTrack {
                    language: language.clone(),
                    kind: CaptionKind::Manual,
                    url,
                });
            }
        }

        let mut originals: Vec<(String, &Vec<YtDlpFormat>)> = info
            .automatic_captions
            .iter()
            .filter_map(|(key, formats)| {
                key.strip_suffix("-orig")
                    .map(|language| (language.to_string(), formats))
            })
            .collect();

        if originals.is_empty() {
            if let Some(language) = &info.language {
                if let Some(formats) = info.automatic_captions.get(language) {
                    originals.push((language.clone(), formats));
                }
            }
        }

        for (language, formats) in originals {
            if let Some(url) = vtt_url(formats) {
                tracks.push(CaptionTrack {
                    language,
                    kind: CaptionKind::Generated,
                    url,
                });
            }
        }

        Ok(Self { tracks })
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Languages available, for error messages.
    pub fn languages(&self) -> Vec<&str> {
        self.tracks.iter().map(|t| t.language.as_str()).collect()
    }

    /// Find a track of `kind` for `language`, preferring an exact code match.
    fn find(&self, kind: CaptionKind, language: &str) -> Option<&CaptionTrack> {
        let of_kind = || self.tracks.iter().filter(move |t| t.kind == kind);
        of_kind()
            .find(|t| t.language.eq_ignore_ascii_case(language))
            .or_else(|| of_kind().find(|t| language_matches(&t.language, language)))
    }

    fn first_of(&self, kind: CaptionKind) -> Option<&CaptionTrack> {
        self.tracks.iter().find(|t| t.kind == kind)
    }
}

/// Pick the WebVTT rendition, or force `fmt=vtt` on the first usable URL.
fn vtt_url(formats: &[YtDlpFormat]) -> Option<Url> {
    let parse = |f: &YtDlpFormat| f.url.as_deref().and_then(|u| Url::parse(u).ok());

    if let Some(url) = formats
        .iter()
        .filter(|f| f.ext.as_deref() == Some("vtt"))
        .find_map(parse)
    {
        return Some(url);
    }

    formats
        .iter()
        .find_map(parse)
        .map(|url| set_query_param(&url, "fmt", "vtt"))
}

fn set_query_param(url: &Url, key: &str, value: &str) -> Url {
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != key)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut out = url.clone();
    out.query_pairs_mut()
        .clear()
        .extend_pairs(pairs)
        .append_pair(key, value);
    out
}

fn primary_subtag(code: &str) -> &str {
    code.split(['-', '_']).next().unwrap_or(code)
}

/// `en` matches `en-US` and vice versa; `pt-BR` does not match `pt-PT`.
pub(crate) fn language_matches(track: &str, wanted: &str) -> bool {
    track.eq_ignore_ascii_case(wanted)
        || primary_subtag(track).eq_ignore_ascii_case(wanted)
        || track.eq_ignore_ascii_case(primary_subtag(wanted))
}

/// The track chosen for a request, and the language to translate it into.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackSelection {
    pub track: CaptionTrack,
    pub translate_to: Option<String>,
}

impl TrackSelection {
    /// URL that yields the selected track, translated when requested.
    pub fn download_url(&self) -> Url {
        match &self.translate_to {
            Some(language) => set_query_param(&self.track.url, "tlang", language),
            None => self.track.url.clone(),
        }
    }

    pub fn origin(&self) -> TranscriptOrigin {
        match (&self.translate_to, self.track.kind) {
            (Some(_), _) => TranscriptOrigin::Translated,
            (None, CaptionKind::Manual) => TranscriptOrigin::Manual,
            (None, CaptionKind::Generated) => TranscriptOrigin::Generated,
        }
    }

    /// Language of the text this selection produces.
    pub fn language(&self) -> &str {
        self.translate_to.as_deref().unwrap_or(&self.track.language)
    }
}

/// Choose the caption track to use for `language`.
///
/// Order: uploaded track in the language, generated track in the language,
/// then (when `translate` is set) the first uploaded and then generated track
/// among `preferred` languages, translated. An empty `preferred` list accepts
/// any source language.
pub fn select_track(
    catalog: &CaptionCatalog,
    language: &str,
    preferred: &[String],
    translate: bool,
) -> Option<TrackSelection> {
    for kind in [CaptionKind::Manual, CaptionKind::Generated] {
        if let Some(track) = catalog.find(kind, language) {
            return Some(TrackSelection {
                track: track.clone(),
                translate_to: None,
            });
        }
    }

    if !translate {
        return None;
    }

    for kind in [CaptionKind::Manual, CaptionKind::Generated] {
        let source = if preferred.is_empty() {
            catalog.first_of(kind)
        } else {
            preferred.iter().find_map(|p| catalog.find(kind, p))
        };

        if let Some(track) = source {
            return Some(TrackSelection {
                track: track.clone(),
                translate_to: Some(language.to_string()),
            });
        }
    }

    None
}

/// Selection failure as a user-facing error.
pub(crate) fn unavailable(video_id: &str, language: &str, catalog: &CaptionCatalog) -> RecapError {
    if catalog.is_empty() {
        RecapError::TranscriptUnavailable(format!("video {} has no captions", video_id))
    } else {
        RecapError::TranscriptUnavailable(format!(
            "no '{}' transcript for video {} (available: {})",
            language,
            video_id,
            catalog.languages().join(", ")
        ))
    }
}
