use std::fmt;
use std::path::Path;
use std::str::FromStr;
use regex::Regex;
use once_cell::sync::Lazy;
use anyhow::{Result, Context, anyhow};
use log::{warn, debug};
use serde::{Deserialize, Serialize};
use crate::errors::FragmentError;

// @module: Subtitle parsing (WebVTT and SubRip)

// @const: Timing line, "[HH:]MM:SS.mmm --> [HH:]MM:SS.mmm [settings]"
static TIMING_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*((?:\d+:)?\d{1,2}:\d{2}[.,]\d{3})\s*-->\s*((?:\d+:)?\d{1,2}:\d{2}[.,]\d{3})(?:\s.*)?$").unwrap()
});

// @const: One or more blank lines between blocks
static BLOCK_SEPARATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\n[ \t]*\n\s*").unwrap()
});

// @const: WebVTT voice tag, <v Speaker> or <v.loud Speaker>
static VOICE_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<v(?:\.[^\s>]*)?\s+[^>]*>").unwrap()
});

// @const: Any other inline tag (<i>, </b>, <c.yellow>, <00:00:01.000>, <font ...>)
static INLINE_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"</?[^>]+>").unwrap()
});

// @const: SSA/ASS override blocks such as {\an8} or {\i1}
static OVERRIDE_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\\[^}]*\}").unwrap()
});

// @const: Leading dialogue dash ("- Hello")
static DIALOGUE_DASH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[-\u{2010}\u{2013}\u{2014}]+\s+").unwrap()
});

/// Subtitle container format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubtitleFormat {
    /// WebVTT (`.vtt`)
    Vtt,
    /// SubRip (`.srt`)
    Srt,
}

impl SubtitleFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Vtt => "vtt",
            Self::Srt => "srt",
        }
    }

    /// Format for a file extension, case-insensitive
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_lowercase().as_str() {
            "vtt" => Some(Self::Vtt),
            "srt" => Some(Self::Srt),
            _ => None,
        }
    }
}

impl fmt::Display for SubtitleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl FromStr for SubtitleFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_extension(s.trim().trim_start_matches('.'))
            .ok_or_else(|| anyhow!("Invalid subtitle format '{}'. Use: auto, vtt or srt", s))
    }
}

/// Parse a format setting where `auto` (or an empty string) means
/// "detect from the file".
pub fn parse_format_setting(setting: &str) -> Result<Option<SubtitleFormat>> {
    let trimmed = setting.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("auto") {
        return Ok(None);
    }
    trimmed.parse().map(Some)
}

// @struct: Single caption cue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionEntry {
    // @field: Cue index from the file, when it has a numeric one
    pub index: Option<usize>,

    // @field: Start time in ms
    pub start_time_ms: u64,

    // @field: End time in ms
    pub end_time_ms: u64,

    // @field: Text lines with markup removed
    pub lines: Vec<String>,
}

impl CaptionEntry {
    /// Creates a new caption entry
    pub fn new(index: Option<usize>, start_time_ms: u64, end_time_ms: u64, lines: Vec<String>) -> Self {
        CaptionEntry {
            index,
            start_time_ms,
            end_time_ms,
            lines,
        }
    }

    /// Convenience constructor for a single-line cue
    pub fn single(start_time_ms: u64, end_time_ms: u64, text: &str) -> Self {
        Self::new(None, start_time_ms, end_time_ms, vec![text.to_string()])
    }

    /// True when no line carries any text
    pub fn is_blank(&self) -> bool {
        self.lines.iter().all(|line| line.trim().is_empty())
    }

    /// All lines joined with a single space
    pub fn plain_text(&self) -> String {
        self.lines
            .iter()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Parse a subtitle timestamp to milliseconds.
    ///
    /// Accepts `HH:MM:SS,mmm`, `HH:MM:SS.mmm` and the WebVTT short form
    /// `MM:SS.mmm`.
    pub fn parse_timestamp(timestamp: &str) -> Result<u64> {
        let parts: Vec<&str> = timestamp.trim().split(&[':', ',', '.'][..]).collect();

        let (hours, minutes, seconds, millis) = match parts.as_slice() {
            [h, m, s, ms] => (*h, *m, *s, *ms),
            [m, s, ms] => ("0", *m, *s, *ms),
            _ => return Err(anyhow!("Invalid timestamp format: {}", timestamp)),
        };

        let hours: u64 = hours.parse().context("Failed to parse hours")?;
        let minutes: u64 = minutes.parse().context("Failed to parse minutes")?;
        let seconds: u64 = seconds.parse().context("Failed to parse seconds")?;
        let millis: u64 = millis.parse().context("Failed to parse milliseconds")?;

        if minutes >= 60 || seconds >= 60 || millis >= 1000 {
            return Err(anyhow!("Invalid time components in timestamp: {}", timestamp));
        }

        hours
            .checked_mul(3_600_000)
            .and_then(|ms| ms.checked_add(minutes * 60_000 + seconds * 1_000 + millis))
            .ok_or_else(|| anyhow!("Timestamp out of range: {}", timestamp))
    }

    /// Format a timestamp in milliseconds as `HH:MM:SS,mmm`
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }
}

impl fmt::Display for CaptionEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "[{} --> {}] {}",
            Self::format_timestamp(self.start_time_ms),
            Self::format_timestamp(self.end_time_ms),
            self.plain_text()
        )
    }
}

/// Result of parsing one block of the source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CueOutcome {
    /// The block produced a cue
    Cue(CaptionEntry),
    /// The block was malformed and has been skipped
    Skipped {
        /// 1-based block number in the file
        block: usize,
        reason: FragmentError,
    },
}

impl CueOutcome {
    pub fn cue(&self) -> Option<&CaptionEntry> {
        match self {
            Self::Cue(entry) => Some(entry),
            Self::Skipped { .. } => None,
        }
    }

    pub fn into_cue(self) -> Option<CaptionEntry> {
        match self {
            Self::Cue(entry) => Some(entry),
            Self::Skipped { .. } => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }
}

/// Detect the subtitle format from the file extension and content.
///
/// The extension wins when it is `.vtt` or `.srt`; otherwise a `WEBVTT`
/// header means VTT and any `-->` means SRT. VTT is the fallback.
pub fn detect_format(path: Option<&Path>, content: &str) -> SubtitleFormat {
    let from_extension = path
        .and_then(|p| p.extension())
        .and_then(|ext| SubtitleFormat::from_extension(&ext.to_string_lossy()));

    if let Some(format) = from_extension {
        return format;
    }

    let trimmed = content.trim_start_matches('\u{feff}').trim_start();
    if trimmed.starts_with("WEBVTT") {
        SubtitleFormat::Vtt
    } else if content.contains("-->") {
        SubtitleFormat::Srt
    } else {
        SubtitleFormat::Vtt
    }
}

/// Normalize line endings and drop a leading byte order mark
pub fn normalize_line_endings(content: &str) -> String {
    content
        .trim_start_matches('\u{feff}')
        .replace("\r\n", "\n")
        .replace('\r', "\n")
}

/// Parse subtitle source text into one outcome per cue block.
///
/// Malformed blocks become `CueOutcome::Skipped` and are logged as
/// warnings; WebVTT header, NOTE, STYLE and REGION blocks produce nothing.
pub fn parse(content: &str, format: SubtitleFormat) -> Vec<CueOutcome> {
    let normalized = normalize_line_endings(content);
    let mut outcomes = Vec::new();

    for (i, block) in BLOCK_SEPARATOR.split(normalized.trim()).enumerate() {
        let block_number = i + 1;
        let lines: Vec<&str> = block
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.trim().is_empty())
            .collect();

        if lines.is_empty() {
            continue;
        }

        if format == SubtitleFormat::Vtt && is_vtt_metadata_block(lines[0]) {
            debug!("Ignoring WebVTT metadata block {}", block_number);
            continue;
        }

        let outcome = match parse_block(&lines) {
            Ok(entry) => CueOutcome::Cue(entry),
            Err(reason) => {
                warn!("Skipping subtitle block {}: {}", block_number, reason);
                CueOutcome::Skipped { block: block_number, reason }
            }
        };
        outcomes.push(outcome);
    }

    let skipped = outcomes.iter().filter(|o| o.is_skipped()).count();
    debug!(
        "Parsed {} {} blocks ({} cues, {} skipped)",
        outcomes.len(),
        format,
        outcomes.len() - skipped,
        skipped
    );

    outcomes
}

/// Parse subtitle source text and keep only the cues
pub fn parse_cues(content: &str, format: SubtitleFormat) -> Vec<CaptionEntry> {
    parse(content, format)
        .into_iter()
        .filter_map(CueOutcome::into_cue)
        .collect()
}

/// Remove inline markup from a caption line
pub fn strip_markup(line: &str) -> String {
    let text = VOICE_TAG.replace_all(line, "");
    let text = INLINE_TAG.replace_all(&text, "");
    let text = OVERRIDE_TAG.replace_all(&text, "");
    let text = decode_entities(text.trim());
    DIALOGUE_DASH.replace(text.trim(), "").trim().to_string()
}

fn is_vtt_metadata_block(first_line: &str) -> bool {
    let first_line = first_line.trim_start();
    ["WEBVTT", "NOTE", "STYLE", "REGION"]
        .iter()
        .any(|keyword| {
            first_line
                .strip_prefix(keyword)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
        })
}

fn parse_block(lines: &[&str]) -> Result<CaptionEntry, FragmentError> {
    let timing_pos = lines
        .iter()
        .position(|line| line.contains("-->"))
        .ok_or(FragmentError::MissingTimestamp)?;

    let (start_ms, end_ms) = parse_timing_line(lines[timing_pos])?;

    // The line right before the timing line is the cue identifier
    let index = timing_pos
        .checked_sub(1)
        .and_then(|pos| lines[pos].trim().parse::<usize>().ok());

    let text_lines: Vec<String> = lines[timing_pos + 1..]
        .iter()
        .map(|line| strip_markup(line))
        .filter(|line| !line.is_empty())
        .collect();

    if text_lines.is_empty() {
        return Err(FragmentError::EmptyText);
    }

    Ok(CaptionEntry::new(index, start_ms, end_ms, text_lines))
}

fn parse_timing_line(line: &str) -> Result<(u64, u64), FragmentError> {
    let malformed = || FragmentError::MalformedTimestamp(line.trim().to_string());

    let caps = TIMING_REGEX.captures(line).ok_or_else(malformed)?;
    let start = CaptionEntry::parse_timestamp(&caps[1]).map_err(|_| malformed())?;
    let end = CaptionEntry::parse_timestamp(&caps[2]).map_err(|_| malformed())?;

    if end < start {
        return Err(malformed());
    }

    Ok((start, end))
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
