/*!
 * Caption cleanup between parsing and merging.
 *
 * Removes caption annotations such as `[Music]` or `(掌聲)` and optionally
 * collapses cues that repeat the previous caption (rolling captions).
 * A cue emptied by cleanup is kept as a blank cue so the merge stage can
 * treat it as a paragraph break.
 */

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::language_utils::LanguageMode;
use crate::subtitle_processor::CaptionEntry;

/// Bracketed annotations in ASCII or CJK lenticular brackets
static BRACKET_ANNOTATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[[^\]]*\]|\u{3010}[^\u{3011}]*\u{3011}").unwrap()
});

/// English sound cues in ASCII or full-width parentheses
static SOUND_CUE_EN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[(\u{ff08}]\s*(?:music|applause|laughter|laughs|inaudible)\s*[)\u{ff09}]").unwrap()
});

/// 音樂 掌聲 笑聲 無法聽清
static SOUND_CUE_ZH_TW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[(\u{ff08}]\s*(?:\u{97f3}\u{6a02}|\u{638c}\u{8072}|\u{7b11}\u{8072}|\u{7121}\u{6cd5}\u{807d}\u{6e05})\s*[)\u{ff09}]").unwrap()
});

/// 音乐 掌声 笑声 无法听清
static SOUND_CUE_ZH_CN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[(\u{ff08}]\s*(?:\u{97f3}\u{4e50}|\u{638c}\u{58f0}|\u{7b11}\u{58f0}|\u{65e0}\u{6cd5}\u{542c}\u{6e05})\s*[)\u{ff09}]").unwrap()
});

static MUSIC_NOTES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\u{266a}\u{266b}]+").unwrap()
});

/// Cleanup switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanupOptions {
    /// Strip caption annotations
    pub remove_annotations: bool,
    /// Drop a cue that repeats the previous one
    pub collapse_repeated_cues: bool,
}

impl Default for CleanupOptions {
    fn default() -> Self {
        Self {
            remove_annotations: true,
            collapse_repeated_cues: false,
        }
    }
}

/// Remove caption annotations for the given language.
///
/// English sound cues are removed in every mode since Chinese captions
/// often carry them untranslated.
pub fn remove_annotations(text: &str, mode: LanguageMode) -> String {
    let mut text = BRACKET_ANNOTATION.replace_all(text, "").into_owned();
    text = SOUND_CUE_EN.replace_all(&text, "").into_owned();
    match mode {
        LanguageMode::English => {}
        LanguageMode::TraditionalChinese => text = SOUND_CUE_ZH_TW.replace_all(&text, "").into_owned(),
        LanguageMode::SimplifiedChinese => text = SOUND_CUE_ZH_CN.replace_all(&text, "").into_owned(),
    }
    MUSIC_NOTES.replace_all(&text, "").trim().to_string()
}

/// Apply annotation removal and repeat collapsing to parsed cues
pub fn clean_entries(entries: Vec<CaptionEntry>, mode: LanguageMode, options: &CleanupOptions) -> Vec<CaptionEntry> {
    let mut cleaned: Vec<CaptionEntry> = entries
        .into_iter()
        .map(|mut entry| {
            if options.remove_annotations {
                entry.lines = entry
                    .lines
                    .iter()
                    .map(|line| remove_annotations(line, mode))
                    .filter(|line| !line.is_empty())
                    .collect();
            }
            entry
        })
        .collect();

    let blank = cleaned.iter().filter(|e| e.is_blank()).count();
    if blank > 0 {
        debug!("{} cues contained only annotations", blank);
    }

    if options.collapse_repeated_cues {
        cleaned = collapse_repeated(cleaned);
    }

    cleaned
}

/// Drop cues whose text repeats the previous non-blank cue, ignoring case.
///
/// The surviving cue is extended to cover the dropped one's end time so gap
/// detection still sees the caption as continuous.
pub fn collapse_repeated(entries: Vec<CaptionEntry>) -> Vec<CaptionEntry> {
    let mut result: Vec<CaptionEntry> = Vec::with_capacity(entries.len());
    let mut last_text: Option<(usize, String)> = None;
    let mut dropped = 0;

    for entry in entries {
        if entry.is_blank() {
            result.push(entry);
            continue;
        }

        let text = entry.plain_text().to_lowercase();
        if let Some((pos, previous)) = &last_text {
            if *previous == text {
                let kept = &mut result[*pos];
                kept.end_time_ms = kept.end_time_ms.max(entry.end_time_ms);
                dropped += 1;
                continue;
            }
        }

        last_text = Some((result.len(), text));
        result.push(entry);
    }

    if dropped > 0 {
        debug!("Collapsed {} repeated cues", dropped);
    }

    result
}
