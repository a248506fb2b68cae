use anyhow::{anyhow, Context, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::language_utils;
use crate::subtitle_processor;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "subdoc.json";

/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Language mode: "auto", "en", "zh_tw" or "zh_cn"
    #[serde(default = "default_language")]
    pub language: String,

    /// Subtitle normalizer settings
    #[serde(default)]
    pub subtitle: SubtitleConfig,

    /// Document polisher settings
    #[serde(default)]
    pub polish: PolishConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Configuration for subtitle conversion
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SubtitleConfig {
    /// Subtitle format: "auto", "vtt" or "srt"
    #[serde(default = "default_format")]
    pub format: String,

    /// Pause between cues (ms) that starts a new paragraph, 0 to disable
    #[serde(default = "default_paragraph_gap_ms")]
    pub paragraph_gap_ms: u64,

    /// Start a new paragraph after sentence-ending punctuation
    #[serde(default = "default_true")]
    pub break_on_sentence_end: bool,

    /// Drop cues repeating the previous caption (rolling captions)
    #[serde(default)]
    pub collapse_repeated_cues: bool,

    /// Strip annotations such as [Music] or (Applause)
    #[serde(default = "default_true")]
    pub remove_annotations: bool,

    /// Capitalize sentence starts in English output
    #[serde(default = "default_true")]
    pub fix_capitalization: bool,

    /// Number of leading cues used to detect the language
    #[serde(default = "default_detection_sample_size")]
    pub detection_sample_size: usize,
}

impl Default for SubtitleConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            paragraph_gap_ms: default_paragraph_gap_ms(),
            break_on_sentence_end: true,
            collapse_repeated_cues: false,
            remove_annotations: true,
            fix_capitalization: true,
            detection_sample_size: default_detection_sample_size(),
        }
    }
}

/// Configuration for transcript polishing
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PolishConfig {
    /// Maximum bullets in the summary section
    #[serde(default = "default_summary_sentences")]
    pub summary_sentences: usize,

    /// Paragraphs longer than this many sentences are split
    #[serde(default = "default_max_paragraph_sentences")]
    pub max_paragraph_sentences: usize,

    /// Emit an action items section when task-like sentences are found
    #[serde(default = "default_true")]
    pub detect_action_items: bool,

    /// Characters shown by --preview
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
}

impl Default for PolishConfig {
    fn default() -> Self {
        Self {
            summary_sentences: default_summary_sentences(),
            max_paragraph_sentences: default_max_paragraph_sentences(),
            detect_action_items: true,
            preview_chars: default_preview_chars(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching filter for the `log` facade
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_language() -> String {
    "auto".to_string()
}

fn default_format() -> String {
    "auto".to_string()
}

fn default_paragraph_gap_ms() -> u64 {
    3000 // 3 second pause
}

fn default_detection_sample_size() -> usize {
    10
}

fn default_summary_sentences() -> usize {
    3
}

fn default_max_paragraph_sentences() -> usize {
    6
}

fn default_preview_chars() -> usize {
    500
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration.
    ///
    /// With an explicit path, an existing file is loaded and a missing one is
    /// created with defaults. Without one, `subdoc.json` in the working
    /// directory is loaded when present; otherwise defaults are used.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        match config_path {
            Some(path) if Path::new(path).exists() => Self::from_file(path),
            Some(path) => {
                warn!("Config file not found at '{}', creating default config.", path);
                let config = Config::default();
                config.save(path)?;
                Ok(config)
            }
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(DEFAULT_CONFIG_FILE),
            None => {
                debug!("No config file, using defaults");
                Ok(Config::default())
            }
        }
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;

        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Write configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;

        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        language_utils::parse_language_setting(&self.language)?;
        subtitle_processor::parse_format_setting(&self.subtitle.format)?;

        if self.subtitle.detection_sample_size == 0 {
            return Err(anyhow!("subtitle.detection_sample_size must be greater than 0"));
        }
        if self.polish.summary_sentences == 0 {
            return Err(anyhow!("polish.summary_sentences must be greater than 0"));
        }
        if self.polish.max_paragraph_sentences == 0 {
            return Err(anyhow!("polish.max_paragraph_sentences must be greater than 0"));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            language: default_language(),
            subtitle: SubtitleConfig::default(),
            polish: PolishConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
