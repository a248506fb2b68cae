/*!
 * Tests for application configuration functionality
 */

use std::fs;
use anyhow::Result;
use subdoc::app_config::{Config, LogLevel};
use subdoc::language_utils::LanguageMode;
use subdoc::normalizer::NormalizerOptions;
use subdoc::subtitle_processor::SubtitleFormat;
use crate::common;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.language, "auto");
    assert_eq!(config.subtitle.format, "auto");
    assert_eq!(config.subtitle.paragraph_gap_ms, 3000);
    assert!(config.subtitle.break_on_sentence_end);
    assert!(!config.subtitle.collapse_repeated_cues);
    assert!(config.subtitle.remove_annotations);
    assert!(config.subtitle.fix_capitalization);
    assert_eq!(config.subtitle.detection_sample_size, 10);
    assert_eq!(config.polish.summary_sentences, 3);
    assert_eq!(config.polish.max_paragraph_sentences, 6);
    assert!(config.polish.detect_action_items);
    assert_eq!(config.polish.preview_chars, 500);
    assert_eq!(config.log_level, LogLevel::Info);
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();
    assert!(config.validate().is_ok());

    config.language = "zh_tw".to_string();
    assert!(config.validate().is_ok());

    config.language = "klingon".to_string();
    assert!(config.validate().is_err());

    config.language = "auto".to_string();
    config.subtitle.format = "ass".to_string();
    assert!(config.validate().is_err());

    config.subtitle.format = "srt".to_string();
    config.polish.summary_sentences = 0;
    assert!(config.validate().is_err());

    config.polish.summary_sentences = 3;
    config.subtitle.detection_sample_size = 0;
    assert!(config.validate().is_err());
}

/// Test that a partial JSON file falls back to defaults for missing keys
#[test]
fn test_from_file_withPartialJson_shouldFillDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "subdoc.json",
        r#"{ "language": "zh_cn", "subtitle": { "paragraph_gap_ms": 0 }, "log_level": "debug" }"#,
    )?;

    let config = Config::from_file(&path)?;

    assert_eq!(config.language, "zh_cn");
    assert_eq!(config.subtitle.paragraph_gap_ms, 0);
    assert!(config.subtitle.remove_annotations);
    assert_eq!(config.polish.summary_sentences, 3);
    assert_eq!(config.log_level, LogLevel::Debug);
    Ok(())
}

/// Test that a malformed JSON file reports the path
#[test]
fn test_from_file_withInvalidJson_shouldFailWithContext() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "bad.json", "{ not json")?;

    let err = Config::from_file(&path).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
    Ok(())
}

/// Test that an explicit missing path is created with defaults
#[test]
fn test_load_withMissingExplicitPath_shouldWriteDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("custom.json");
    let path_str = path.to_string_lossy().to_string();

    let config = Config::load(Some(path_str.as_str()))?;

    assert_eq!(config, Config::default());
    assert!(path.exists());
    assert_eq!(Config::from_file(&path)?, Config::default());
    Ok(())
}

/// Test that save and load preserve every field
#[test]
fn test_save_withCustomValues_shouldReloadIdentically() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("saved.json");

    let mut config = Config::default();
    config.language = "en".to_string();
    config.subtitle.collapse_repeated_cues = true;
    config.polish.preview_chars = 80;
    config.log_level = LogLevel::Warn;
    config.save(&path)?;

    let json = fs::read_to_string(&path)?;
    assert!(json.contains("\"log_level\": \"warn\""));
    assert_eq!(Config::from_file(&path)?, config);
    Ok(())
}

/// Test that config values flow into the normalizer options
#[test]
fn test_normalizer_options_withConfig_shouldMapSettings() -> Result<()> {
    let mut config = Config::default();
    config.language = "zh_tw".to_string();
    config.subtitle.format = "vtt".to_string();
    config.subtitle.paragraph_gap_ms = 1500;
    config.subtitle.fix_capitalization = false;

    let options = NormalizerOptions::from_config(&config)?;

    assert_eq!(options.language, Some(LanguageMode::TraditionalChinese));
    assert_eq!(options.format, Some(SubtitleFormat::Vtt));
    assert_eq!(options.merge.paragraph_gap_ms, 1500);
    assert!(!options.format_options.fix_capitalization);
    Ok(())
}

/// Test log level mapping
#[test]
fn test_log_level_withEachVariant_shouldMapToFilter() {
    assert_eq!(LogLevel::Error.to_level_filter(), log::LevelFilter::Error);
    assert_eq!(LogLevel::Trace.to_level_filter(), log::LevelFilter::Trace);
}
