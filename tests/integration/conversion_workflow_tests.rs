/*!
 * End-to-end tests for subtitle to text conversion
 */

use std::fs;
use anyhow::Result;
use regex::Regex;
use subdoc::app_controller::Controller;
use subdoc::errors::SubtitleError;
use subdoc::language_utils::LanguageMode;
use subdoc::normalizer::{NormalizerOptions, SubtitleNormalizer};
use subdoc::subtitle_processor::SubtitleFormat;
use crate::common;

fn normalizer_for(language: Option<LanguageMode>) -> SubtitleNormalizer {
    SubtitleNormalizer::new(NormalizerOptions { language, ..NormalizerOptions::default() })
}

/// Test the English WebVTT sample
#[test]
fn test_convert_file_withEnglishVtt_shouldProduceTwoParagraphs() -> Result<()> {
    let conversion = normalizer_for(Some(LanguageMode::English))
        .convert_file(&common::test_resource_path("sample_en.vtt"))?;

    assert_eq!(conversion.text, common::EXPECTED_EN);
    assert_eq!(conversion.format, SubtitleFormat::Vtt);
    assert_eq!(conversion.paragraph_count, 2);
    assert_eq!(conversion.skipped_count, 0);
    Ok(())
}

/// Test the English SubRip sample with CRLF line endings
#[test]
fn test_convert_file_withEnglishSrt_shouldMatchVttOutput() -> Result<()> {
    let conversion = normalizer_for(Some(LanguageMode::English))
        .convert_file(&common::test_resource_path("sample_en.srt"))?;

    assert_eq!(conversion.text, common::EXPECTED_EN);
    assert_eq!(conversion.format, SubtitleFormat::Srt);
    Ok(())
}

/// Test the Traditional Chinese sample
#[test]
fn test_convert_file_withTraditionalChineseVtt_shouldJoinWithoutSpaces() -> Result<()> {
    let conversion = normalizer_for(Some(LanguageMode::TraditionalChinese))
        .convert_file(&common::test_resource_path("sample_zh_tw.vtt"))?;

    assert_eq!(conversion.text, common::EXPECTED_ZH_TW);
    Ok(())
}

/// Test the Simplified Chinese sample
#[test]
fn test_convert_file_withSimplifiedChineseSrt_shouldJoinWithoutSpaces() -> Result<()> {
    let conversion = normalizer_for(Some(LanguageMode::SimplifiedChinese))
        .convert_file(&common::test_resource_path("sample_zh_cn.srt"))?;

    assert_eq!(conversion.text, common::EXPECTED_ZH_CN);
    Ok(())
}

/// Test that auto mode detects each sample's language
#[test]
fn test_convert_file_withAutoLanguage_shouldDetectEachSample() -> Result<()> {
    let normalizer = SubtitleNormalizer::default();
    let cases = [
        ("sample_en.vtt", LanguageMode::English, common::EXPECTED_EN),
        ("sample_zh_tw.vtt", LanguageMode::TraditionalChinese, common::EXPECTED_ZH_TW),
        ("sample_zh_cn.srt", LanguageMode::SimplifiedChinese, common::EXPECTED_ZH_CN),
    ];

    for (name, language, expected) in cases {
        let conversion = normalizer.convert_file(&common::test_resource_path(name))?;
        assert_eq!(conversion.language, language, "language of {}", name);
        assert_eq!(conversion.text, expected, "text of {}", name);
    }
    Ok(())
}

/// Test that output never contains timing lines or cue numbers
#[test]
fn test_convert_file_withAnySample_shouldDropTimestampsAndIndices() -> Result<()> {
    let timestamp = Regex::new(r"\d{1,2}:\d{2}[.,]\d{3}|-->").unwrap();
    let index_line = Regex::new(r"(?m)^\d+$").unwrap();
    let normalizer = SubtitleNormalizer::default();

    for name in ["sample_en.vtt", "sample_en.srt", "sample_zh_tw.vtt", "sample_zh_cn.srt"] {
        let text = normalizer.convert_file(&common::test_resource_path(name))?.text;
        assert!(!timestamp.is_match(&text), "timestamp left in {}", name);
        assert!(!index_line.is_match(&text), "cue index left in {}", name);
    }
    Ok(())
}

/// Test that converting twice gives identical bytes
#[test]
fn test_convert_str_withSameInput_shouldBeDeterministic() {
    let content = common::read_resource("sample_zh_cn.srt");
    let normalizer = SubtitleNormalizer::default();

    let first = normalizer.convert_str(&content, None).unwrap();
    let second = normalizer.convert_str(&content, None).unwrap();
    assert_eq!(first.text.as_bytes(), second.text.as_bytes());
}

/// Test that an empty file is unsupported input
#[test]
fn test_convert_file_withEmptyFile_shouldReturnEmptyInput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "empty.srt", "")?;

    let err = SubtitleNormalizer::default().convert_file(&path).unwrap_err();
    assert!(matches!(err.downcast_ref::<SubtitleError>(), Some(SubtitleError::EmptyInput)));
    Ok(())
}

/// Test that a block without a timing line is skipped and the rest kept in order
#[test]
fn test_convert_str_withMissingTimingBlock_shouldKeepSiblingsInOrder() {
    let content = "1\n00:00:01,000 --> 00:00:02,000\nFirst line.\n\n2\nOrphan text without timing\n\n3\n00:00:03,000 --> 00:00:04,000\nThird line.\n";
    let conversion = normalizer_for(Some(LanguageMode::English))
        .convert_str(content, Some(SubtitleFormat::Srt))
        .unwrap();

    assert_eq!(conversion.text, "First line.\n\nThird line.");
    assert_eq!(conversion.cue_count, 2);
    assert_eq!(conversion.skipped_count, 1);
}

/// Test that an unterminated cue continues into the next one
#[test]
fn test_convert_str_withSplitSentence_shouldMergeFragments() {
    let content = "WEBVTT\n\n00:00.000 --> 00:01.000\nHello\n\n00:01.000 --> 00:02.000\nworld.\n";
    let conversion = normalizer_for(Some(LanguageMode::English))
        .convert_str(content, None)
        .unwrap();

    assert_eq!(conversion.text, "Hello world.");
}

/// Test Chinese punctuation joining at a cue boundary
#[test]
fn test_convert_str_withChineseCommaCue_shouldAttachToPreviousText() {
    let content = "1\n00:00:00,000 --> 00:00:01,000\n你好\n\n2\n00:00:01,000 --> 00:00:02,000\n，世界\n";
    let conversion = normalizer_for(Some(LanguageMode::SimplifiedChinese))
        .convert_str(content, None)
        .unwrap();

    assert_eq!(conversion.text, "你好，世界");
}

/// Test that a long pause splits a paragraph unless the threshold is disabled
#[test]
fn test_convert_str_withLongPause_shouldHonorGapSetting() {
    let content = "1\n00:00:00,000 --> 00:00:01,000\nfirst part\n\n2\n00:00:10,000 --> 00:00:11,000\nsecond part\n";

    let split = normalizer_for(Some(LanguageMode::English)).convert_str(content, None).unwrap();
    assert_eq!(split.text, "First part\n\nSecond part");

    let mut options = NormalizerOptions { language: Some(LanguageMode::English), ..NormalizerOptions::default() };
    options.merge.paragraph_gap_ms = 0;
    let joined = SubtitleNormalizer::new(options).convert_str(content, None).unwrap();
    assert_eq!(joined.text, "First part second part");
}

/// Test that a file of only malformed blocks is unsupported input
#[test]
fn test_convert_str_withOnlyMalformedBlocks_shouldReportNoCaptions() {
    let content = "just some text\n\nand more text\n";
    let result = SubtitleNormalizer::default().convert_str(content, Some(SubtitleFormat::Srt));

    assert!(matches!(result, Err(SubtitleError::NoCaptions { skipped: 2 })));
}

/// Test the controller end to end with a forced format and collapsed repeats
#[test]
fn test_controller_withConfigOverrides_shouldApplyThem() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(
        temp_dir.path(),
        "rolling.vtt",
        "WEBVTT\n\n00:00.000 --> 00:01.000\nwe are live\n\n00:01.000 --> 00:02.000\nwe are live\n\n00:02.000 --> 00:03.000\nwith captions.\n",
    )?;
    let output = temp_dir.path().join("out/rolling.txt");

    let mut config = common::quiet_config();
    config.language = "en".to_string();
    config.subtitle.format = "vtt".to_string();
    config.subtitle.collapse_repeated_cues = true;
    let controller = Controller::with_config(config)?;

    controller.convert_subtitle(&input, Some(&output), false)?;
    assert_eq!(fs::read_to_string(&output)?, "We are live with captions.");
    Ok(())
}

/// Test that repeats are kept by default so no caption text is lost
#[test]
fn test_controller_withDefaultConfig_shouldKeepRepeatedCues() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(
        temp_dir.path(),
        "echo.srt",
        "1\n00:00:00,000 --> 00:00:01,000\nagain\n\n2\n00:00:01,000 --> 00:00:02,000\nagain.\n",
    )?;

    let controller = Controller::with_config(common::quiet_config())?;
    let (path, _) = controller.convert_subtitle(&input, None, false)?.expect("written");
    assert_eq!(fs::read_to_string(path)?, "Again again.");
    Ok(())
}
