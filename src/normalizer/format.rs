/*!
 * Language-aware text cleanup for merged paragraphs.
 *
 * English text gets whitespace and punctuation spacing fixes plus basic
 * capitalization. Chinese text loses the spaces between ideographs,
 * gets full-width punctuation next to CJK text, and has full-width
 * letters and digits folded to ASCII.
 */

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::language_utils::{LanguageMode, is_cjk};
use super::merge::Paragraph;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+").unwrap()
});

static SPACE_BEFORE_PUNCTUATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+([,.!?;:])").unwrap()
});

// Only ,;!? are safe to space unconditionally; '.' also appears in
// abbreviations, decimals and host names.
static MISSING_SPACE_AFTER_MARK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([,;!?])([A-Za-z])").unwrap()
});

static MISSING_SPACE_AFTER_PERIOD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([a-z]{2}\.)([A-Z])").unwrap()
});

static SENTENCE_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([.!?][\x22\x27\u{201d}\u{2019})]*\s+)([a-z])").unwrap()
});

static LOWERCASE_PRONOUN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bi\b").unwrap()
});

/// Formatting switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    /// Capitalize sentence starts and the pronoun "I" (English only)
    pub fix_capitalization: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self { fix_capitalization: true }
    }
}

/// Render paragraphs as plain text separated by exactly one blank line
pub fn format(paragraphs: &[Paragraph], mode: LanguageMode, options: &FormatOptions) -> String {
    paragraphs
        .iter()
        .map(|paragraph| format_paragraph(&paragraph.text, mode, options))
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Clean a single paragraph's text
pub fn format_paragraph(text: &str, mode: LanguageMode, options: &FormatOptions) -> String {
    let cleaned = clean_spacing(text, mode);
    if mode == LanguageMode::English && options.fix_capitalization {
        fix_capitalization(&cleaned)
    } else {
        cleaned
    }
}

/// Fix spacing according to the language's punctuation rules
pub fn clean_spacing(text: &str, mode: LanguageMode) -> String {
    match mode {
        LanguageMode::English => clean_english_spacing(text),
        _ => clean_chinese_spacing(text),
    }
}

/// Capitalize the first letter, letters after a sentence end and the
/// standalone pronoun "i"
pub fn fix_capitalization(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars();
    if let Some(first) = chars.next() {
        result.extend(first.to_uppercase());
        result.push_str(chars.as_str());
    }

    let result = SENTENCE_START.replace_all(&result, |caps: &Captures| {
        format!("{}{}", &caps[1], caps[2].to_uppercase())
    });
    LOWERCASE_PRONOUN.replace_all(&result, "I").into_owned()
}

fn clean_english_spacing(text: &str) -> String {
    let text = WHITESPACE_RUN.replace_all(text, " ");
    let text = SPACE_BEFORE_PUNCTUATION.replace_all(&text, "$1");
    let text = MISSING_SPACE_AFTER_MARK.replace_all(&text, "$1 $2");
    let text = MISSING_SPACE_AFTER_PERIOD.replace_all(&text, "$1 $2");
    text.trim().to_string()
}

fn clean_chinese_spacing(text: &str) -> String {
    let folded: Vec<char> = text.chars().map(fold_fullwidth_alphanumeric).collect();
    let punctuated = widen_punctuation(&folded);
    collapse_cjk_whitespace(&punctuated).trim().to_string()
}

/// Fold full-width ASCII letters and digits (ＡＢＣ１２３) to half-width
fn fold_fullwidth_alphanumeric(c: char) -> char {
    match c {
        '\u{ff10}'..='\u{ff19}' | '\u{ff21}'..='\u{ff3a}' | '\u{ff41}'..='\u{ff5a}' => {
            char::from_u32(c as u32 - 0xfee0).unwrap_or(c)
        }
        _ => c,
    }
}

/// Replace half-width punctuation that follows CJK text with its
/// full-width form. A '.' is only treated as a full stop when it closes the
/// clause, so decimals like "3.5" survive.
fn widen_punctuation(chars: &[char]) -> Vec<char> {
    let mut result = Vec::with_capacity(chars.len());

    for (i, &c) in chars.iter().enumerate() {
        let follows_cjk = result
            .iter()
            .rev()
            .find(|ch: &&char| !ch.is_whitespace())
            .is_some_and(|ch| is_cjk(*ch));

        let widened = match c {
            ',' if follows_cjk => '\u{ff0c}',
            '!' if follows_cjk => '\u{ff01}',
            '?' if follows_cjk => '\u{ff1f}',
            ';' if follows_cjk => '\u{ff1b}',
            ':' if follows_cjk => '\u{ff1a}',
            '.' if follows_cjk => {
                let next = chars.get(i + 1).copied();
                if next.is_none_or(|n| n.is_whitespace() || is_cjk(n) || is_cjk_punctuation(n)) {
                    '\u{3002}'
                } else {
                    c
                }
            }
            _ => c,
        };
        result.push(widened);
    }

    result
}

/// Drop whitespace between ideographs and around full-width punctuation;
/// other whitespace runs collapse to a single space.
fn collapse_cjk_whitespace(chars: &[char]) -> String {
    let mut result = String::with_capacity(chars.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if !c.is_whitespace() {
            result.push(c);
            i += 1;
            continue;
        }

        let run_end = chars[i..]
            .iter()
            .position(|ch| !ch.is_whitespace())
            .map_or(chars.len(), |offset| i + offset);

        let previous = result.chars().last();
        let next = chars.get(run_end).copied();

        let drop_space = match (previous, next) {
            (Some(p), Some(n)) => {
                (is_cjk(p) && is_cjk(n)) || is_cjk_punctuation(p) || is_cjk_punctuation(n)
            }
            _ => true,
        };
        if !drop_space {
            result.push(' ');
        }
        i = run_end;
    }

    result
}

/// Full-width and CJK punctuation, brackets and quotes
fn is_cjk_punctuation(c: char) -> bool {
    matches!(c,
        '\u{3000}'..='\u{303f}'
        | '\u{ff01}'..='\u{ff0f}'
        | '\u{ff1a}'..='\u{ff20}'
        | '\u{ff3b}'..='\u{ff40}'
        | '\u{ff5b}'..='\u{ff65}'
        | '\u{2018}' | '\u{2019}' | '\u{201c}' | '\u{201d}'
        | '\u{2026}' | '\u{2014}'
    )
}
