/*!
 * Transcript polishing.
 *
 * Turns plain transcript text (for example the output of the subtitle
 * normalizer) into a Markdown document with a title, a short summary, the
 * cleaned-up content and, when the text contains task-like sentences, an
 * action items checklist.
 */

use std::fmt::Write as _;

use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::app_config::Config;
use crate::errors::PolishError;
use crate::language_utils::{self, LanguageMode};
use crate::normalizer::format::{self, FormatOptions};

static PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\n[ \t]*\n\s*").unwrap()
});

static TITLE_SEPARATORS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[_\-.\s]+").unwrap()
});

/// Sentences opening with an imperative verb or request
static EN_IMPERATIVE_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)^(?:(?:so|and|ok|okay|now|then|also|first|next|finally)[,\s]+)*",
        r"(?:please|remember|make sure|don't forget|do not forget|let's|let us|check|send|review|",
        r"schedule|update|prepare|submit|contact|call|email|finish|complete|fix|follow up|set up|",
        r"book|write|share|reach out)\b"
    ))
    .unwrap()
});

/// Task phrases anywhere in the sentence
static EN_TASK_PHRASE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:need to|needs to|have to|has to|must|should|action items?|follow up on|to-?do)\b").unwrap()
});

/// 需要 必須 必须 應該 应该 請 请 記得 记得 務必 务必 別忘了 别忘了 待辦 待办 確認 确认
const ZH_TASK_MARKERS: &[&str] = &[
    "\u{9700}\u{8981}",
    "\u{5fc5}\u{9808}", "\u{5fc5}\u{987b}",
    "\u{61c9}\u{8a72}", "\u{5e94}\u{8be5}",
    "\u{8acb}", "\u{8bf7}",
    "\u{8a18}\u{5f97}", "\u{8bb0}\u{5f97}",
    "\u{52d9}\u{5fc5}", "\u{52a1}\u{5fc5}",
    "\u{5225}\u{5fd8}\u{4e86}", "\u{522b}\u{5fd8}\u{4e86}",
    "\u{5f85}\u{8fa6}", "\u{5f85}\u{529e}",
    "\u{78ba}\u{8a8d}", "\u{786e}\u{8ba4}",
];

/// Closing quotes and brackets kept with the sentence they end
const CLOSING_MARKS: &[char] = &['"', '\'', ')', ']', '\u{201d}', '\u{2019}', '\u{300d}', '\u{300f}', '\u{ff09}'];

/// Options for the document polisher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolishOptions {
    /// Language mode, `None` to detect it from the text
    pub language: Option<LanguageMode>,
    pub summary_sentences: usize,
    pub max_paragraph_sentences: usize,
    pub detect_action_items: bool,
    /// Shared with the subtitle normalizer's capitalization switch
    pub fix_capitalization: bool,
}

impl Default for PolishOptions {
    fn default() -> Self {
        Self {
            language: None,
            summary_sentences: 3,
            max_paragraph_sentences: 6,
            detect_action_items: true,
            fix_capitalization: true,
        }
    }
}

impl PolishOptions {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            language: language_utils::parse_language_setting(&config.language)?,
            summary_sentences: config.polish.summary_sentences.max(1),
            max_paragraph_sentences: config.polish.max_paragraph_sentences.max(1),
            detect_action_items: config.polish.detect_action_items,
            fix_capitalization: config.subtitle.fix_capitalization,
        })
    }
}

/// A polished transcript ready to render as Markdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolishedDocument {
    pub title: String,
    pub language: LanguageMode,
    pub summary: Vec<String>,
    /// Content paragraphs, already split to the configured length
    pub paragraphs: Vec<String>,
    pub action_items: Vec<String>,
}

impl PolishedDocument {
    /// Render the document as Markdown
    pub fn to_markdown(&self) -> String {
        let (summary_heading, content_heading, action_heading) = self.language.section_headings();
        let mut md = String::new();

        let _ = writeln!(md, "# {}\n", self.title);

        let _ = writeln!(md, "## {}\n", summary_heading);
        for sentence in &self.summary {
            let _ = writeln!(md, "- {}", sentence);
        }
        md.push('\n');

        let _ = writeln!(md, "## {}\n", content_heading);
        for paragraph in &self.paragraphs {
            let _ = writeln!(md, "{}\n", paragraph);
        }

        if !self.action_items.is_empty() {
            let _ = writeln!(md, "## {}\n", action_heading);
            for item in &self.action_items {
                let _ = writeln!(md, "- [ ] {}", item);
            }
            md.push('\n');
        }

        // Exactly one trailing newline
        let trimmed_len = md.trim_end().len();
        md.truncate(trimmed_len);
        md.push('\n');
        md
    }
}

/// Converts transcript text into a structured Markdown document
#[derive(Debug, Clone, Default)]
pub struct DocumentPolisher {
    options: PolishOptions,
}

impl DocumentPolisher {
    pub fn new(options: PolishOptions) -> Self {
        Self { options }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self::new(PolishOptions::from_config(config)?))
    }

    /// Polish transcript text; `title_hint` is usually the input file stem
    pub fn polish(&self, text: &str, title_hint: Option<&str>) -> Result<PolishedDocument, PolishError> {
        let text = text.trim_start_matches('\u{feff}');
        if text.trim().is_empty() {
            return Err(PolishError::EmptyInput);
        }

        let language = match self.options.language {
            Some(language) => language,
            None => {
                let detected = language_utils::detect_language(text);
                info!("Detected language: {}", detected);
                detected
            }
        };

        let format_options = FormatOptions { fix_capitalization: self.options.fix_capitalization };
        let paragraphs: Vec<Vec<String>> = PARAGRAPH_BREAK
            .split(&text.replace("\r\n", "\n"))
            .map(|block| language.join(block.lines()))
            .map(|joined| format::format_paragraph(&joined, language, &format_options))
            .filter(|paragraph| !paragraph.is_empty())
            .map(|paragraph| split_sentences(&paragraph, language))
            .collect();

        if paragraphs.is_empty() {
            return Err(PolishError::EmptyInput);
        }

        let summary = self.build_summary(&paragraphs);
        let content = self.build_content(&paragraphs, language);
        let action_items = if self.options.detect_action_items {
            extract_action_items(paragraphs.iter().flatten(), language)
        } else {
            Vec::new()
        };

        debug!(
            "Polished {} paragraphs: {} summary bullets, {} action items",
            paragraphs.len(),
            summary.len(),
            action_items.len()
        );

        Ok(PolishedDocument {
            title: derive_title(title_hint, language),
            language,
            summary,
            paragraphs: content,
            action_items,
        })
    }

    /// First sentence of each paragraph, then the second, and so on
    fn build_summary(&self, paragraphs: &[Vec<String>]) -> Vec<String> {
        let limit = self.options.summary_sentences;
        let mut summary: Vec<String> = Vec::with_capacity(limit);
        let mut rank = 0;

        while summary.len() < limit {
            let mut found = false;
            for sentences in paragraphs {
                if let Some(sentence) = sentences.get(rank) {
                    found = true;
                    if summary.len() < limit && !summary.contains(sentence) {
                        summary.push(sentence.clone());
                    }
                }
            }
            if !found {
                break;
            }
            rank += 1;
        }

        summary
    }

    fn build_content(&self, paragraphs: &[Vec<String>], language: LanguageMode) -> Vec<String> {
        paragraphs
            .iter()
            .flat_map(|sentences| sentences.chunks(self.options.max_paragraph_sentences.max(1)))
            .map(|chunk| language.join(chunk.iter().map(String::as_str)))
            .collect()
    }
}

/// Split text into sentences at the language's terminal punctuation.
///
/// English sentences only end when whitespace (or the end of the text)
/// follows the mark, so "3.5" stays in one piece. Chinese sentences end
/// right after the mark.
pub fn split_sentences(text: &str, language: LanguageMode) -> Vec<String> {
    let terminals = language.sentence_terminals();
    let chars: Vec<char> = text.chars().collect();
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        current.push(c);
        i += 1;

        if !terminals.contains(&c) {
            continue;
        }

        // Keep repeated terminals ("?!", "...") and closing marks together
        while i < chars.len() && (terminals.contains(&chars[i]) || CLOSING_MARKS.contains(&chars[i])) {
            current.push(chars[i]);
            i += 1;
        }

        let at_boundary = language.is_chinese() || i >= chars.len() || chars[i].is_whitespace();
        if at_boundary {
            let sentence = current.trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            current.clear();
        }
    }

    let rest = current.trim();
    if !rest.is_empty() {
        sentences.push(rest.to_string());
    }

    sentences
}

/// Whether a sentence reads as a task or request
pub fn is_action_item(sentence: &str, language: LanguageMode) -> bool {
    let sentence = sentence.trim();
    if EN_IMPERATIVE_START.is_match(sentence) || EN_TASK_PHRASE.is_match(sentence) {
        return true;
    }
    language.is_chinese() && ZH_TASK_MARKERS.iter().any(|marker| sentence.contains(marker))
}

/// Collect task-like sentences in order, without duplicates
pub fn extract_action_items<'a, I>(sentences: I, language: LanguageMode) -> Vec<String>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut items: Vec<String> = Vec::new();
    for sentence in sentences {
        if is_action_item(sentence, language) && !items.contains(sentence) {
            items.push(sentence.clone());
        }
    }
    items
}

/// Build a document title from a file stem
pub fn derive_title(hint: Option<&str>, language: LanguageMode) -> String {
    let cleaned = hint
        .map(|h| TITLE_SEPARATORS.replace_all(h, " ").trim().to_string())
        .unwrap_or_default();

    if cleaned.is_empty() {
        return language.fallback_title().to_string();
    }

    match language {
        LanguageMode::English => cleaned
            .split(' ')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" "),
        _ => cleaned,
    }
}
