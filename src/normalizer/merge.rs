/*!
 * Paragraph merging.
 *
 * Consecutive cues are joined into paragraphs. A paragraph ends on a long
 * pause between cues, on a blank cue, or after a cue that ends a sentence;
 * with no such signal the current paragraph continues.
 */

use log::debug;

use crate::language_utils::LanguageMode;
use crate::subtitle_processor::CaptionEntry;

/// Default pause (ms) between cues that starts a new paragraph
pub const DEFAULT_PARAGRAPH_GAP_MS: u64 = 3000;

/// Paragraph break rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeOptions {
    /// Pause between two cues that forces a paragraph break; 0 disables it
    pub paragraph_gap_ms: u64,
    /// Break after a cue ending in terminal punctuation
    pub break_on_sentence_end: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            paragraph_gap_ms: DEFAULT_PARAGRAPH_GAP_MS,
            break_on_sentence_end: true,
        }
    }
}

/// A finished paragraph of merged caption text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    pub text: String,
    /// Number of cues merged into this paragraph
    pub cue_count: usize,
    pub start_time_ms: u64,
    pub end_time_ms: u64,
}

/// Fragments collected for the paragraph under construction
#[derive(Debug, Default)]
struct ParagraphBuffer {
    text: String,
    cue_count: usize,
    start_time_ms: u64,
    end_time_ms: u64,
}

impl ParagraphBuffer {
    fn is_empty(&self) -> bool {
        self.cue_count == 0
    }

    fn push(&mut self, entry: &CaptionEntry, mode: LanguageMode) {
        if self.is_empty() {
            self.start_time_ms = entry.start_time_ms;
        }
        for line in &entry.lines {
            mode.join_into(&mut self.text, line);
        }
        self.end_time_ms = self.end_time_ms.max(entry.end_time_ms);
        self.cue_count += 1;
    }

    fn flush(&mut self) -> Option<Paragraph> {
        if self.is_empty() {
            return None;
        }
        let buffer = std::mem::take(self);
        Some(Paragraph {
            text: buffer.text,
            cue_count: buffer.cue_count,
            start_time_ms: buffer.start_time_ms,
            end_time_ms: buffer.end_time_ms,
        })
    }
}

/// Merge cues into paragraphs.
///
/// Every non-blank cue lands in exactly one paragraph, in input order.
pub fn merge(entries: &[CaptionEntry], mode: LanguageMode, options: &MergeOptions) -> Vec<Paragraph> {
    let mut paragraphs = Vec::new();
    let mut buffer = ParagraphBuffer::default();
    let mut previous_end: Option<u64> = None;

    for entry in entries {
        if entry.is_blank() {
            paragraphs.extend(buffer.flush());
            previous_end = Some(entry.end_time_ms);
            continue;
        }

        if let Some(end) = previous_end {
            if is_long_gap(end, entry.start_time_ms, options.paragraph_gap_ms) {
                paragraphs.extend(buffer.flush());
            }
        }

        buffer.push(entry, mode);
        previous_end = Some(entry.end_time_ms);

        if options.break_on_sentence_end && mode.ends_sentence(&buffer.text) {
            paragraphs.extend(buffer.flush());
        }
    }
    paragraphs.extend(buffer.flush());

    debug!("Merged {} cues into {} paragraphs", entries.len(), paragraphs.len());
    paragraphs
}

fn is_long_gap(previous_end_ms: u64, next_start_ms: u64, threshold_ms: u64) -> bool {
    // Overlapping cues saturate to a zero gap
    threshold_ms > 0 && next_start_ms.saturating_sub(previous_end_ms) >= threshold_ms
}
