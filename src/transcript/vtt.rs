//! WebVTT caption parsing.
//!
//! YouTube serves automatic captions as "rolling" cues: each cue repeats the
//! previous line before adding a new one, and words carry inline timing tags.
//! Both are flattened here so the segment text reads as plain prose.

use super::TranscriptSegment;
use regex::Regex;
use std::sync::OnceLock;

fn tag_regex() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| Regex::new(r"<[^>]*>").expect("Invalid regex"))
}

/// Parse a WebVTT document into transcript segments.
///
/// Cues with unparseable timing are skipped. Lines repeated from the previous
/// cue are dropped.
pub fn parse_vtt(input: &str) -> Vec<TranscriptSegment> {
    let lines: Vec<&str> = input.lines().collect();
    let mut segments = Vec::new();
    let mut last_line: Option<String> = None;
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i].trim().trim_start_matches('\u{FEFF}');

        if line.is_empty() || line.starts_with("WEBVTT") {
            i += 1;
            continue;
        }

        if line.starts_with("NOTE") || line.starts_with("STYLE") || line.starts_with("REGION") {
            i = skip_block(&lines, i);
            continue;
        }

        if !line.contains("-->") {
            // Cue identifier or header metadata (Kind:, Language:)
            i += 1;
            continue;
        }

        let timing = parse_timing(line);
        i += 1;

        // Auto captions use whitespace-only placeholder lines inside a cue;
        // only a truly empty line ends it.
        let mut payload = Vec::new();
        while i < lines.len() && !lines[i].is_empty() {
            payload.push(lines[i]);
            i += 1;
        }

        let Some((start, end)) = timing else {
            continue;
        };

        let mut fresh = Vec::new();
        for raw in payload {
            let cleaned = clean_line(raw);
            if cleaned.is_empty() || last_line.as_deref() == Some(cleaned.as_str()) {
                continue;
            }
            last_line = Some(cleaned.clone());
            fresh.push(cleaned);
        }

        if !fresh.is_empty() {
            segments.push(TranscriptSegment::new(start, end, fresh.join(" ")));
        }
    }

    segments
}

fn skip_block(lines: &[&str], mut index: usize) -> usize {
    index += 1;
    while index < lines.len() && !lines[index].trim().is_empty() {
        index += 1;
    }
    index
}

/// Parse `00:00:01.000 --> 00:00:05.000 align:start` into seconds.
fn parse_timing(line: &str) -> Option<(f64, f64)> {
    let (start, rest) = line.split_once("-->")?;
    let end = rest.split_whitespace().next()?;
    Some((parse_timestamp(start.trim())?, parse_timestamp(end)?))
}

/// Parse `HH:MM:SS.mmm` or `MM:SS.mmm`.
fn parse_timestamp(s: &str) -> Option<f64> {
    let parts: Vec<&str> = s.split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [h, m, s] => (h.parse::<f64>().ok()?, m.parse::<f64>().ok()?, s),
        [m, s] => (0.0, m.parse::<f64>().ok()?, s),
        _ => return None,
    };
    let seconds = seconds.replace(',', ".").parse::<f64>().ok()?;
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

fn clean_line(raw: &str) -> String {
    let stripped = tag_regex().replace_all(raw, "");
    let decoded = stripped
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_manual_captions() {
        let vtt = "WEBVTT\nKind: captions\nLanguage: en\n\n1\n00:00:00.000 --> 00:00:02.500\nHello   world\n\n2\n00:00:02.500 --> 00:00:05.000\nThis is &amp; a <i>test</i>.\n";
        let segments = parse_vtt(vtt);

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "Hello world");
        assert_eq!(segments[0].start_seconds, 0.0);
        assert_eq!(segments[0].end_seconds, 2.5);
        assert_eq!(segments[1].text, "This is & a test.");
    }

    #[test]
    fn test_rolling_auto_captions_are_deduplicated() {
        let vtt = concat!(
            "WEBVTT\nKind: captions\nLanguage: en\n\n",
            "00:00:00.000 --> 00:00:02.350 align:start position:0%\n",
            " \n",
            "we're<00:00:00.320><c> no</c><00:00:00.640><c> strangers</c>\n\n",
            "00:00:02.350 --> 00:00:02.360 align:start position:0%\n",
            "we're no strangers\n",
            " \n\n",
            "00:00:02.360 --> 00:00:04.800 align:start position:0%\n",
            "we're no strangers\n",
            "to<00:00:02.600><c> love</c>\n",
        );
        let segments = parse_vtt(vtt);
        let text: Vec<&str> = segments.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(text, vec!["we're no strangers", "to love"]);
        assert_eq!(segments[1].start_seconds, 2.36);
    }

    #[test]
    fn test_skips_note_blocks_and_bad_timing() {
        let vtt = "WEBVTT\n\nNOTE this is a comment\nspanning lines\n\n00:01.000 --> 00:02.000\nShort form\n\nbogus --> 00:00:03.000\nIgnored\n";
        let segments = parse_vtt(vtt);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, "Short form");
        assert_eq!(segments[0].start_seconds, 1.0);
    }

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(parse_timestamp("01:01:01.500"), Some(3661.5));
        assert_eq!(parse_timestamp("02:03.250"), Some(123.25));
        assert_eq!(parse_timestamp("garbage"), None);
    }

    #[test]
    fn test_empty_document() {
        assert!(parse_vtt("WEBVTT\n\n").is_empty());
        assert!(parse_vtt("").is_empty());
    }
}
