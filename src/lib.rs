/*!
 * # subdoc - subtitles to documents
 *
 * A Rust library that turns video subtitle files into readable text.
 *
 * ## Features
 *
 * - Parse WebVTT and SubRip subtitle files
 * - Strip timestamps, cue numbers, markup and sound annotations
 * - Merge caption fragments into paragraphs using pauses and punctuation
 * - Language-aware output for:
 *   - English
 *   - Traditional Chinese (zh_tw)
 *   - Simplified Chinese (zh_cn)
 * - Polish plain transcripts into Markdown documents
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `subtitle_processor`: Subtitle parsing into cue outcomes
 * - `normalizer`: The conversion pipeline:
 *   - `normalizer::cleanup`: Annotation removal and repeated cues
 *   - `normalizer::merge`: Cue to paragraph merging
 *   - `normalizer::format`: Spacing, punctuation and capitalization
 * - `polisher`: Transcript to Markdown document
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `language_utils`: Language modes and detection
 * - `errors`: Custom error types for the application
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod file_utils;
pub mod subtitle_processor;
pub mod normalizer;
pub mod polisher;
pub mod app_controller;
pub mod language_utils;
pub mod errors;

// Re-export main types for easier usage
pub use app_config::Config;
pub use subtitle_processor::{CaptionEntry, CueOutcome, SubtitleFormat};
pub use normalizer::{Conversion, NormalizerOptions, SubtitleNormalizer};
pub use polisher::{DocumentPolisher, PolishedDocument};
pub use language_utils::{detect_language, LanguageMode};
pub use errors::{AppError, FragmentError, PolishError, SubtitleError};
