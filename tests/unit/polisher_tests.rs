/*!
 * Tests for transcript polishing
 */

use subdoc::app_config::Config;
use subdoc::errors::PolishError;
use subdoc::language_utils::LanguageMode;
use subdoc::polisher::{self, DocumentPolisher, PolishOptions};

fn polisher_with(options: PolishOptions) -> DocumentPolisher {
    DocumentPolisher::new(options)
}

/// Test that empty transcripts are rejected
#[test]
fn test_polish_withBlankText_shouldReturnEmptyInput() {
    let polisher = DocumentPolisher::default();
    assert!(matches!(polisher.polish("  \n\n\t", None), Err(PolishError::EmptyInput)));
    assert!(matches!(polisher.polish("\u{feff}", None), Err(PolishError::EmptyInput)));
}

/// Test the summary takes leading sentences round-robin across paragraphs
#[test]
fn test_polish_withSeveralParagraphs_shouldSummarizeLeadingSentences() {
    let text = "Alpha one. Alpha two.\n\nBeta one. Beta two.";
    let options = PolishOptions { summary_sentences: 3, ..PolishOptions::default() };
    let document = polisher_with(options).polish(text, Some("notes")).unwrap();

    assert_eq!(document.summary, vec!["Alpha one.", "Beta one.", "Alpha two."]);
    assert_eq!(document.language, LanguageMode::English);
    assert_eq!(document.title, "Notes");
}

/// Test that long paragraphs are split by sentence count
#[test]
fn test_polish_withLongParagraph_shouldSplitContent() {
    let text = "One. Two. Three. Four. Five.";
    let options = PolishOptions { max_paragraph_sentences: 2, ..PolishOptions::default() };
    let document = polisher_with(options).polish(text, None).unwrap();

    assert_eq!(document.paragraphs, vec!["One. Two.", "Three. Four.", "Five."]);
}

/// Test that hard-wrapped lines inside a paragraph are rejoined
#[test]
fn test_polish_withWrappedLines_shouldJoinParagraph() {
    let text = "this line was\nwrapped by an editor.\r\n\r\nsecond paragraph";
    let document = DocumentPolisher::default().polish(text, None).unwrap();

    assert_eq!(document.paragraphs, vec!["This line was wrapped by an editor.", "Second paragraph"]);
}

/// Test that turning capitalization off in the config reaches the polisher
#[test]
fn test_polish_withCapitalizationDisabledInConfig_shouldKeepLowercase() {
    let mut config = Config::default();
    config.subtitle.fix_capitalization = false;
    let polisher = DocumentPolisher::from_config(&config).unwrap();

    let document = polisher.polish("this line was\nwrapped by an editor.\n\nsecond paragraph", None).unwrap();

    assert_eq!(document.paragraphs, vec!["this line was wrapped by an editor.", "second paragraph"]);
}

/// Test that action item detection can be disabled
#[test]
fn test_polish_withActionItemsDisabled_shouldOmitSection() {
    let text = "Please review the draft.";
    let options = PolishOptions { detect_action_items: false, ..PolishOptions::default() };
    let document = polisher_with(options).polish(text, None).unwrap();

    assert!(document.action_items.is_empty());
    assert!(!document.to_markdown().contains("## Action Items"));
}

/// Test the rendered Markdown layout
#[test]
fn test_to_markdown_withActionItems_shouldRenderAllSections() {
    let text = "We met today. Please send the slides.";
    let document = DocumentPolisher::default().polish(text, Some("team_sync")).unwrap();

    let expected = "# Team Sync\n\n\
## Summary\n\n\
- We met today.\n\
- Please send the slides.\n\n\
## Content\n\n\
We met today. Please send the slides.\n\n\
## Action Items\n\n\
- [ ] Please send the slides.\n";
    assert_eq!(document.to_markdown(), expected);
}

/// Test a Traditional Chinese transcript end to end
#[test]
fn test_polish_withTraditionalChinese_shouldUseLocalizedHeadings() {
    let text = "大家好。今天我們討論預算。\n\n請大家記得提交報告。";
    let document = DocumentPolisher::default().polish(text, Some("會議紀錄")).unwrap();

    assert_eq!(document.language, LanguageMode::TraditionalChinese);
    assert_eq!(document.title, "會議紀錄");
    assert_eq!(document.action_items, vec!["請大家記得提交報告。"]);

    let markdown = document.to_markdown();
    assert!(markdown.starts_with("# 會議紀錄\n\n## 摘要\n\n- 大家好。\n"));
    assert!(markdown.contains("## 內容\n\n大家好。今天我們討論預算。\n\n請大家記得提交報告。\n"));
    assert!(markdown.ends_with("## 待辦事項\n\n- [ ] 請大家記得提交報告。\n"));
}

/// Test that a forced language overrides detection
#[test]
fn test_polish_withForcedLanguage_shouldSkipDetection() {
    let options = PolishOptions { language: Some(LanguageMode::SimplifiedChinese), ..PolishOptions::default() };
    let document = polisher_with(options).polish("hello there", None).unwrap();

    assert_eq!(document.language, LanguageMode::SimplifiedChinese);
    assert_eq!(document.title, "文档");
}

/// Test duplicate task sentences are listed once
#[test]
fn test_extract_action_items_withDuplicates_shouldDeduplicate() {
    let sentences = vec![
        "Check the logs.".to_string(),
        "It was fine.".to_string(),
        "Check the logs.".to_string(),
    ];
    let items = polisher::extract_action_items(&sentences, LanguageMode::English);
    assert_eq!(items, vec!["Check the logs."]);
}
