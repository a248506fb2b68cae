/*!
 * Subtitle normalization pipeline.
 *
 * Turns a WebVTT or SubRip file into readable paragraphs:
 * - `parse`: blocks to cue outcomes (see `subtitle_processor`)
 * - `cleanup`: annotation removal and repeated-cue collapsing
 * - `merge`: cues to paragraphs using gap and punctuation signals
 * - `format`: language-aware spacing and punctuation
 *
 * The whole conversion is a single synchronous pass over an in-memory
 * buffer. Nothing is written to disk here.
 */

pub mod cleanup;
pub mod format;
pub mod merge;

use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info};

use crate::app_config::Config;
use crate::errors::SubtitleError;
use crate::file_utils::FileManager;
use crate::language_utils::{self, LanguageMode};
use crate::subtitle_processor::{self, CaptionEntry, CueOutcome, SubtitleFormat};

pub use cleanup::CleanupOptions;
pub use format::FormatOptions;
pub use merge::{MergeOptions, Paragraph};

/// Default number of cues sampled for language detection
pub const DEFAULT_DETECTION_SAMPLE_SIZE: usize = 10;

/// Options for one normalizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizerOptions {
    /// Language mode, `None` to detect it from the captions
    pub language: Option<LanguageMode>,
    /// Subtitle format, `None` to detect it from the file
    pub format: Option<SubtitleFormat>,
    pub cleanup: CleanupOptions,
    pub merge: MergeOptions,
    pub format_options: FormatOptions,
    /// Number of leading cues used for language detection
    pub detection_sample_size: usize,
}

impl Default for NormalizerOptions {
    fn default() -> Self {
        Self {
            language: None,
            format: None,
            cleanup: CleanupOptions::default(),
            merge: MergeOptions::default(),
            format_options: FormatOptions::default(),
            detection_sample_size: DEFAULT_DETECTION_SAMPLE_SIZE,
        }
    }
}

impl NormalizerOptions {
    /// Build options from the application configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let subtitle = &config.subtitle;
        Ok(Self {
            language: language_utils::parse_language_setting(&config.language)?,
            format: subtitle_processor::parse_format_setting(&subtitle.format)?,
            cleanup: CleanupOptions {
                remove_annotations: subtitle.remove_annotations,
                collapse_repeated_cues: subtitle.collapse_repeated_cues,
            },
            merge: MergeOptions {
                paragraph_gap_ms: subtitle.paragraph_gap_ms,
                break_on_sentence_end: subtitle.break_on_sentence_end,
            },
            format_options: FormatOptions {
                fix_capitalization: subtitle.fix_capitalization,
            },
            detection_sample_size: subtitle.detection_sample_size.max(1),
        })
    }
}

/// Result of a successful conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    /// Final plain text, paragraphs separated by one blank line
    pub text: String,
    pub language: LanguageMode,
    pub format: SubtitleFormat,
    /// Cues parsed successfully
    pub cue_count: usize,
    /// Malformed blocks that were skipped
    pub skipped_count: usize,
    pub paragraph_count: usize,
}

/// Converts subtitle files into readable text
#[derive(Debug, Clone, Default)]
pub struct SubtitleNormalizer {
    options: NormalizerOptions,
}

impl SubtitleNormalizer {
    pub fn new(options: NormalizerOptions) -> Self {
        Self { options }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(NormalizerOptions::from_config(config)?))
    }

    pub fn options(&self) -> &NormalizerOptions {
        &self.options
    }

    /// Check that a path names a `.vtt` or `.srt` file and return its format
    pub fn check_input_path(path: &Path) -> Result<SubtitleFormat, SubtitleError> {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_string())
            .unwrap_or_default();

        SubtitleFormat::from_extension(&extension).ok_or_else(|| SubtitleError::UnsupportedExtension {
            path: path.to_path_buf(),
            extension,
        })
    }

    /// Read and convert a subtitle file
    pub fn convert_file(&self, path: &Path) -> Result<Conversion> {
        let extension_format = Self::check_input_path(path)?;
        let content = FileManager::read_to_string(path)?;

        let format = self
            .options
            .format
            .unwrap_or_else(|| subtitle_processor::detect_format(Some(path), &content));
        debug!("Reading {:?} as {} (extension says {})", path, format, extension_format);

        self.convert_str(&content, Some(format))
            .with_context(|| format!("Failed to convert subtitle file: {}", path.display()))
    }

    /// Run the full pipeline over subtitle source text.
    ///
    /// `format_hint` is used when the options do not force a format; with
    /// neither, the format is detected from the content.
    pub fn convert_str(&self, content: &str, format_hint: Option<SubtitleFormat>) -> Result<Conversion, SubtitleError> {
        if content.trim_start_matches('\u{feff}').trim().is_empty() {
            return Err(SubtitleError::EmptyInput);
        }

        let format = self
            .options
            .format
            .or(format_hint)
            .unwrap_or_else(|| subtitle_processor::detect_format(None, content));
        info!("Subtitle format: {}", format);

        let outcomes = subtitle_processor::parse(content, format);
        let skipped_count = outcomes.iter().filter(|o| o.is_skipped()).count();
        let entries: Vec<CaptionEntry> = outcomes.into_iter().filter_map(CueOutcome::into_cue).collect();

        if entries.is_empty() {
            return Err(SubtitleError::NoCaptions { skipped: skipped_count });
        }
        let cue_count = entries.len();

        let language = self.resolve_language(&entries);

        let cleaned = cleanup::clean_entries(entries, language, &self.options.cleanup);
        let paragraphs = merge::merge(&cleaned, language, &self.options.merge);
        let text = format::format(&paragraphs, language, &self.options.format_options);

        if text.is_empty() {
            return Err(SubtitleError::NoCaptions { skipped: skipped_count });
        }

        let paragraph_count = text.split("\n\n").count();
        debug!(
            "Converted {} cues into {} paragraphs ({} blocks skipped)",
            cue_count, paragraph_count, skipped_count
        );

        Ok(Conversion {
            text,
            language,
            format,
            cue_count,
            skipped_count,
            paragraph_count,
        })
    }

    /// Language from the options, or detected from the first cues
    fn resolve_language(&self, entries: &[CaptionEntry]) -> LanguageMode {
        if let Some(language) = self.options.language {
            return language;
        }

        let sample = entries
            .iter()
            .take(self.options.detection_sample_size)
            .map(CaptionEntry::plain_text)
            .collect::<Vec<_>>()
            .join(" ");
        let detected = language_utils::detect_language(&sample);
        info!("Detected language: {}", detected);
        detected
    }
}
