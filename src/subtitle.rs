//! SRT subtitle parsing and generation
//!
//! The parser is deliberately lenient: blocks without a `-->` timing line or
//! with fewer than two non-empty lines are skipped without error, so a partly
//! damaged file still yields every usable cue.

use std::fmt::Write as FmtWrite;
use std::path::Path;

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::{AsyncWrite, AsyncWriteExt};

static BLOCK_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\s*\n").expect("block separator regex is valid"));

static MARKUP_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]+>").expect("markup regex is valid"));

/// A single timed subtitle cue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleSegment {
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    /// Cue text, continuation lines joined with a single space
    pub text: String,
}

impl SubtitleSegment {
    /// Create a new segment
    #[must_use]
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    /// Nominal duration in seconds (never negative)
    #[must_use]
    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }

    /// Text with inline markup (`<i>`, `<font ...>`) removed and trimmed
    #[must_use]
    pub fn spoken_text(&self) -> String {
        strip_markup(&self.text)
    }
}

/// Remove `<...>` tag spans and surrounding whitespace
#[must_use]
pub fn strip_markup(text: &str) -> String {
    MARKUP_TAG.replace_all(text, "").trim().to_string()
}

/// Latest end time across all segments, in seconds
#[must_use]
pub fn track_end(segments: &[SubtitleSegment]) -> f64 {
    segments.iter().map(|s| s.end).fold(0.0, f64::max)
}

/// Format seconds as an SRT timestamp (HH:MM:SS,mmm)
///
/// Rounds to the nearest millisecond so values like `1.2` that are not
/// exactly representable do not print as `00:00:01,199`.
#[must_use]
pub fn format_srt_time(seconds: f64) -> String {
    let ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let secs = (ms % 60_000) / 1000;
    let millis = ms % 1000;
    format!("{hours:02}:{minutes:02}:{secs:02},{millis:03}")
}

/// Parse SRT file content into segments, preserving source order
#[must_use]
pub fn parse_srt(content: &str) -> Vec<SubtitleSegment> {
    let normalized = content.trim_start_matches('\u{feff}').replace("\r\n", "\n");
    let normalized = normalized.trim();
    if normalized.is_empty() {
        return Vec::new();
    }

    BLOCK_SEPARATOR
        .split(normalized)
        .filter_map(parse_block)
        .collect()
}

/// Read and parse an SRT file
pub async fn read_srt(path: &Path) -> std::io::Result<Vec<SubtitleSegment>> {
    let content = fs::read_to_string(path).await?;
    Ok(parse_srt(&content))
}

fn parse_block(block: &str) -> Option<SubtitleSegment> {
    let lines: Vec<&str> = block
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    if lines.len() < 2 {
        return None;
    }

    let time_idx = lines.iter().position(|l| l.contains("-->"))?;
    let (start, end) = parse_srt_timestamp_line(lines[time_idx]);
    let text = lines[time_idx + 1..].join(" ").trim().to_string();

    Some(SubtitleSegment::new(start, end, text))
}

/// Parse timestamp line "HH:MM:SS,mmm --> HH:MM:SS,mmm".
///
/// An unreadable side becomes 0.0; the cue is still spoken.
fn parse_srt_timestamp_line(line: &str) -> (f64, f64) {
    let (start, end) = line.split_once("-->").unwrap_or((line, ""));
    // Cue settings may follow the end timestamp
    let end = end.split_whitespace().next().unwrap_or_default();
    (
        parse_srt_timestamp(start.trim()).unwrap_or(0.0),
        parse_srt_timestamp(end).unwrap_or(0.0),
    )
}

/// Parse timestamp "HH:MM:SS,mmm" to seconds; `None` if malformed or out of range
fn parse_srt_timestamp(ts: &str) -> Option<f64> {
    let parts: Vec<&str> = ts.split(&[',', '.', ':'][..]).collect();
    if parts.len() != 4 {
        return None;
    }

    let hours: u64 = parts[0].parse().ok()?;
    let minutes: u64 = parts[1].parse().ok()?;
    let seconds: u64 = parts[2].parse().ok()?;
    let millis: u64 = parts[3].parse().ok()?;

    let whole = hours
        .checked_mul(3600)?
        .checked_add(minutes.checked_mul(60)?)?
        .checked_add(seconds)?;
    Some(whole as f64 + millis as f64 / 1000.0)
}

/// SRT subtitle generator
#[derive(Debug, Clone, Default)]
pub struct SrtGenerator;

impl SrtGenerator {
    /// Create a new SRT generator
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Generate SRT content, renumbering cues from 1
    pub fn generate(&self, segments: &[SubtitleSegment]) -> Result<String> {
        let mut output = String::new();

        for (i, seg) in segments.iter().enumerate() {
            writeln!(output, "{}", i + 1)?;
            writeln!(
                output,
                "{} --> {}",
                format_srt_time(seg.start),
                format_srt_time(seg.end)
            )?;
            writeln!(output, "{}", seg.text)?;
            writeln!(output)?;
        }

        Ok(output)
    }

    /// Write subtitles to a file
    pub async fn write_to_file(&self, segments: &[SubtitleSegment], path: &Path) -> Result<()> {
        let content = self.generate(segments)?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Write subtitles to an async writer
    pub async fn write_to<W: AsyncWrite + Unpin + Send>(
        &self,
        segments: &[SubtitleSegment],
        writer: &mut W,
    ) -> Result<()> {
        let content = self.generate(segments)?;
        writer.write_all(content.as_bytes()).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_srt_time_format() {
        assert_eq!(format_srt_time(0.0), "00:00:00,000");
        assert_eq!(format_srt_time(1.0), "00:00:01,000");
        assert_eq!(format_srt_time(61.0), "00:01:01,000");
        assert_eq!(format_srt_time(3661.5), "01:01:01,500");
        assert_eq!(format_srt_time(1.2), "00:00:01,200");
        assert_eq!(format_srt_time(0.1 + 0.2), "00:00:00,300");
    }

    #[test]
    fn test_parse_srt() {
        let content = "1
00:00:00,000 --> 00:00:02,000
Hello, world!

2
00:00:02,500 --> 00:00:04,000
This is a test.
With multiple lines.

";
        let segments = parse_srt(content);

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].start, 0.0);
        assert_eq!(segments[0].end, 2.0);
        assert_eq!(segments[0].text, "Hello, world!");
        assert_eq!(segments[1].start, 2.5);
        assert_eq!(segments[1].text, "This is a test. With multiple lines.");
    }

    #[test]
    fn test_parse_srt_skips_malformed_blocks() {
        let content = "1
no timing here
just text

2

3
00:00:05,000 --> 00:00:06,250
kept
";
        let segments = parse_srt(content);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].start, 5.0);
        assert_eq!(segments[0].end, 6.25);
        assert_eq!(segments[0].text, "kept");
    }

    #[test]
    fn test_parse_srt_crlf_and_bom() {
        let content = "\u{feff}1\r\n00:00:01,000 --> 00:00:02,000\r\nHi\r\n\r\n2\r\n00:00:03,000 --> 00:00:04,000\r\nThere\r\n";
        let segments = parse_srt(content);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].text, "There");
    }

    #[test]
    fn test_parse_srt_preserves_non_monotonic_order() {
        let content = "1
00:00:10,000 --> 00:00:11,000
later

2
00:00:01,000 --> 00:00:02,000
earlier
";
        let segments = parse_srt(content);
        assert_eq!(segments[0].text, "later");
        assert_eq!(segments[1].text, "earlier");
    }

    #[test]
    fn test_parse_srt_bad_timestamp_falls_back_to_zero() {
        let content = "1\n00:00:01.500 --> 00:00:02,000\nspoken\n\n\
                       2\n0:0:xx,0 --> 00:00:03,000\nalso spoken\n";
        let segments = parse_srt(content);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].start, 1.5);
        assert_eq!(segments[1].text, "also spoken");
        assert_eq!(segments[1].start, 0.0);
        assert_eq!(segments[1].end, 3.0);

        assert!(parse_srt("").is_empty());
        assert!(parse_srt("\n\n  \n").is_empty());
    }

    #[test]
    fn test_parse_srt_overflowing_hours() {
        let content = "1\n9999999999999999:00:00,000 --> 9999999999999999:00:01,000\nhi\n";
        let segments = parse_srt(content);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].start, 0.0);
        assert_eq!(segments[0].end, 0.0);
        assert_eq!(segments[0].text, "hi");
        assert_eq!(parse_srt_timestamp("18446744073709551615:00:00,000"), None);
    }

    #[test]
    fn test_strip_markup() {
        assert_eq!(strip_markup("<i>Hello</i> there"), "Hello there");
        assert_eq!(strip_markup("  <font color=\"red\">x</font> "), "x");
        assert_eq!(strip_markup("<b></b>"), "");
    }

    #[test]
    fn test_track_end() {
        let segments = vec![
            SubtitleSegment::new(0.0, 4.0, "a"),
            SubtitleSegment::new(1.0, 2.0, "b"),
        ];
        assert_eq!(track_end(&segments), 4.0);
        assert_eq!(track_end(&[]), 0.0);
    }

    #[test]
    fn test_srt_generation() {
        let gen = SrtGenerator::new();
        let segments = vec![
            SubtitleSegment::new(0.0, 2.0, "Hello, world!"),
            SubtitleSegment::new(2.5, 4.0, "This is a test."),
        ];

        let output = gen.generate(&segments).unwrap();

        assert!(output.starts_with("1\n00:00:00,000 --> 00:00:02,000\nHello, world!\n\n"));
        assert!(output.contains("2\n00:00:02,500 --> 00:00:04,000\nThis is a test.\n"));
    }

    #[test]
    fn test_generate_then_parse() {
        let gen = SrtGenerator::new();
        let segments = vec![
            SubtitleSegment::new(0.0, 1.0, "<i>one</i>"),
            SubtitleSegment::new(1.2, 2.2, "two"),
        ];
        let parsed = parse_srt(&gen.generate(&segments).unwrap());
        assert_eq!(parsed, segments);
    }
}
