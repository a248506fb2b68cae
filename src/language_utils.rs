use anyhow::{Result, anyhow};
use isolang::Language;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Language utilities for spacing and punctuation rules
///
/// This module defines the language modes the normalizer and polisher
/// understand, how they are parsed from user input, and how a mode is
/// inferred from caption text.

/// Traditional Chinese indicator characters (臺灣繁體應為們個這說)
const TRADITIONAL_INDICATORS: [char; 10] = [
    '\u{81fa}', '\u{7063}', '\u{7e41}', '\u{9ad4}', '\u{61c9}',
    '\u{70ba}', '\u{5011}', '\u{500b}', '\u{9019}', '\u{8aac}',
];

/// Simplified Chinese indicator characters (台湾简体应为们个这说)
const SIMPLIFIED_INDICATORS: [char; 10] = [
    '\u{53f0}', '\u{6e7e}', '\u{7b80}', '\u{4f53}', '\u{5e94}',
    '\u{4e3a}', '\u{4eec}', '\u{4e2a}', '\u{8fd9}', '\u{8bf4}',
];

/// Share of CJK ideographs above which a sample counts as Chinese
const CJK_RATIO_THRESHOLD: f64 = 0.3;

/// Closing quotes and brackets allowed after a sentence terminal
const CLOSING_MARKS: &[char] = &['"', '\'', ')', ']', '\u{201d}', '\u{2019}', '\u{300d}', '\u{300f}', '\u{ff09}'];

/// ASCII punctuation that keeps a following Latin word apart in Chinese text
const ASCII_CLAUSE_MARKS: &[char] = &[',', ';', ':', '!', '?'];

static CJK_IDEOGRAPH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\u{4e00}-\u{9fff}]").unwrap()
});

/// Spacing and punctuation ruleset for one conversion run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LanguageMode {
    /// English (`en`)
    #[serde(rename = "en")]
    English,
    /// Traditional Chinese (`zh_tw`)
    #[serde(rename = "zh_tw")]
    TraditionalChinese,
    /// Simplified Chinese (`zh_cn`)
    #[serde(rename = "zh_cn")]
    SimplifiedChinese,
}

impl LanguageMode {
    /// Short code used on the command line and in configuration
    pub fn code(&self) -> &'static str {
        match self {
            Self::English => "en",
            Self::TraditionalChinese => "zh_tw",
            Self::SimplifiedChinese => "zh_cn",
        }
    }

    /// Human readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::English => "English",
            Self::TraditionalChinese => "Traditional Chinese (\u{7e41}\u{9ad4}\u{4e2d}\u{6587})",
            Self::SimplifiedChinese => "Simplified Chinese (\u{7b80}\u{4f53}\u{4e2d}\u{6587})",
        }
    }

    pub fn is_chinese(&self) -> bool {
        !matches!(self, Self::English)
    }

    /// Characters that end a sentence in this mode
    pub fn sentence_terminals(&self) -> &'static [char] {
        match self {
            Self::English => &['.', '!', '?'],
            // 。！？ plus half-width marks that show up in mixed captions
            _ => &['\u{3002}', '\u{ff01}', '\u{ff1f}', '!', '?'],
        }
    }

    /// Whether `text` ends a sentence, ignoring trailing whitespace and
    /// closing quotes or brackets.
    pub fn ends_sentence(&self, text: &str) -> bool {
        let trimmed = text.trim_end().trim_end_matches(CLOSING_MARKS);
        trimmed
            .chars()
            .last()
            .is_some_and(|c| self.sentence_terminals().contains(&c))
    }

    /// Append `fragment` to `buffer` using this mode's joining rule.
    ///
    /// English fragments are separated by a single space. Chinese fragments
    /// are concatenated directly, except that embedded Latin text keeps a
    /// space: between two ASCII alphanumerics, and after ASCII `, ; : ! ?`
    /// when an ASCII letter follows.
    pub fn join_into(&self, buffer: &mut String, fragment: &str) {
        let fragment = fragment.trim();
        if fragment.is_empty() {
            return;
        }
        if !buffer.is_empty() {
            let needs_space = match self {
                Self::English => true,
                _ => {
                    match (buffer.chars().last(), fragment.chars().next()) {
                        (Some(l), Some(r)) => {
                            (l.is_ascii_alphanumeric() && r.is_ascii_alphanumeric())
                                || (ASCII_CLAUSE_MARKS.contains(&l) && r.is_ascii_alphabetic())
                        }
                        _ => false,
                    }
                }
            };
            if needs_space {
                buffer.push(' ');
            }
        }
        buffer.push_str(fragment);
    }

    /// Join fragments with [`LanguageMode::join_into`]
    pub fn join<'a, I>(&self, fragments: I) -> String
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut buffer = String::new();
        for fragment in fragments {
            self.join_into(&mut buffer, fragment);
        }
        buffer
    }

    /// Localized Markdown section headings: (summary, content, action items)
    pub fn section_headings(&self) -> (&'static str, &'static str, &'static str) {
        match self {
            Self::English => ("Summary", "Content", "Action Items"),
            // 摘要 / 內容 / 待辦事項
            Self::TraditionalChinese => (
                "\u{6458}\u{8981}",
                "\u{5167}\u{5bb9}",
                "\u{5f85}\u{8fa6}\u{4e8b}\u{9805}",
            ),
            // 摘要 / 内容 / 待办事项
            Self::SimplifiedChinese => (
                "\u{6458}\u{8981}",
                "\u{5185}\u{5bb9}",
                "\u{5f85}\u{529e}\u{4e8b}\u{9879}",
            ),
        }
    }

    /// Title used when no usable file name is available
    pub fn fallback_title(&self) -> &'static str {
        match self {
            Self::English => "Document",
            // 文件
            Self::TraditionalChinese => "\u{6587}\u{4ef6}",
            // 文档
            Self::SimplifiedChinese => "\u{6587}\u{6863}",
        }
    }
}

impl fmt::Display for LanguageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for LanguageMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace('-', "_");

        match normalized.as_str() {
            "en" | "english" => return Ok(Self::English),
            "zh_tw" | "zh_hant" | "zh_hk" | "zh_mo" | "traditional" => {
                return Ok(Self::TraditionalChinese);
            }
            "zh_cn" | "zh_hans" | "zh_sg" | "simplified" => return Ok(Self::SimplifiedChinese),
            // ISO 639-2/B code for Chinese
            "chi" => return Ok(Self::SimplifiedChinese),
            _ => {}
        }

        // Fall back to ISO 639 codes (en, eng, zh, zho, ...)
        let language = match normalized.len() {
            2 => Language::from_639_1(&normalized),
            3 => Language::from_639_3(&normalized),
            _ => None,
        };

        match language {
            Some(Language::Eng) => Ok(Self::English),
            Some(Language::Zho) => Ok(Self::SimplifiedChinese),
            Some(other) => Err(anyhow!(
                "Unsupported language: {} ({}). Use en, zh_tw or zh_cn",
                s,
                other.to_name()
            )),
            None => Err(anyhow!("Invalid language code: {}. Use auto, en, zh_tw or zh_cn", s)),
        }
    }
}

/// Parse a language setting where `auto` (or an empty string) means
/// "detect from the input".
pub fn parse_language_setting(setting: &str) -> Result<Option<LanguageMode>> {
    let trimmed = setting.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("auto") {
        return Ok(None);
    }
    trimmed.parse().map(Some)
}

/// Detect the primary language of a text sample.
///
/// A sample is Chinese when CJK ideographs make up more than 30% of its
/// characters; Traditional wins only when its indicator characters outnumber
/// the Simplified ones. Everything else is English.
pub fn detect_language(sample: &str) -> LanguageMode {
    let total_chars = sample.chars().count();
    if total_chars == 0 {
        return LanguageMode::English;
    }

    let cjk_chars = CJK_IDEOGRAPH.find_iter(sample).count();
    if (cjk_chars as f64) <= total_chars as f64 * CJK_RATIO_THRESHOLD {
        return LanguageMode::English;
    }

    let traditional = TRADITIONAL_INDICATORS.iter().filter(|c| sample.contains(**c)).count();
    let simplified = SIMPLIFIED_INDICATORS.iter().filter(|c| sample.contains(**c)).count();

    if traditional > simplified {
        LanguageMode::TraditionalChinese
    } else {
        LanguageMode::SimplifiedChinese
    }
}

/// Whether a character is a CJK unified ideograph (basic block)
pub fn is_cjk(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
}

/// Get the English name of a language code, e.g. "en" -> "English"
pub fn get_language_name(code: &str) -> Result<String> {
    let mode: LanguageMode = code.parse()?;
    let language = match mode {
        LanguageMode::English => Language::Eng,
        _ => Language::Zho,
    };
    Ok(match mode {
        LanguageMode::English => language.to_name().to_string(),
        LanguageMode::TraditionalChinese => format!("{} (Traditional)", language.to_name()),
        LanguageMode::SimplifiedChinese => format!("{} (Simplified)", language.to_name()),
    })
}
