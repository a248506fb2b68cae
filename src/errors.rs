/*!
 * Error types for the subdoc application.
 *
 * Fatal input problems (`SubtitleError`, `PolishError`) abort a run, while
 * `FragmentError` describes a single malformed cue that the parser skips.
 * All of them use the thiserror crate; the application layer wraps them in
 * anyhow with context.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Reasons a single subtitle block could not be turned into a cue.
///
/// These never abort a conversion: the parser records them in
/// `CueOutcome::Skipped` and moves on to the next block.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FragmentError {
    /// The block has no `-->` timing line
    #[error("missing timing line")]
    MissingTimestamp,

    /// The timing line exists but could not be read
    #[error("malformed timing line: {0}")]
    MalformedTimestamp(String),

    /// Nothing is left once markup is stripped
    #[error("no caption text")]
    EmptyText,
}

/// Errors that abort a subtitle conversion
#[derive(Error, Debug)]
pub enum SubtitleError {
    /// File extension is not one the normalizer reads
    #[error("Unsupported input: {path:?} has extension '{extension}', expected .vtt or .srt")]
    UnsupportedExtension {
        /// Offending input path
        path: PathBuf,
        /// Extension found on the path (empty when there is none)
        extension: String,
    },

    /// The file holds no text at all
    #[error("Unsupported input: subtitle content is empty")]
    EmptyInput,

    /// No block in the file could be parsed into a cue with text
    #[error("Unsupported input: no readable captions found ({skipped} malformed blocks skipped)")]
    NoCaptions {
        /// Number of blocks that were skipped as malformed
        skipped: usize,
    },
}

/// Errors that abort document polishing
#[derive(Error, Debug)]
pub enum PolishError {
    /// The transcript holds no text
    #[error("Unsupported input: transcript is empty")]
    EmptyInput,
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid or unreadable configuration
    #[error("Config error: {0}")]
    Config(String),

    /// Error from subtitle conversion
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Error from document polishing
    #[error("Polish error: {0}")]
    Polish(#[from] PolishError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
