use anyhow::{Result, Context, anyhow};
use log::{error, warn, info, debug};
use std::path::{Path, PathBuf};
use std::time::Instant;
use indicatif::{ProgressBar, ProgressStyle};

use crate::app_config::Config;
use crate::file_utils::FileManager;
use crate::normalizer::{Conversion, SubtitleNormalizer};
use crate::polisher::{DocumentPolisher, PolishedDocument};

// @module: Application controller for file-in/file-out runs

/// Extensions picked up in folder mode
const SUBTITLE_EXTENSIONS: [&str; 2] = ["vtt", "srt"];

/// Outcome counts for a folder run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FolderReport {
    pub converted: usize,
    /// Files left alone because their output already exists
    pub skipped: usize,
    pub failed: usize,
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    /// Create a controller with default configuration
    pub fn new_for_test() -> Result<Self> {
        Self::with_config(Config::default())
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Convert one subtitle file to plain text.
    ///
    /// Returns the written path, or `None` when the output already exists
    /// and `force_overwrite` is off. Output is only written once the whole
    /// conversion succeeded.
    pub fn convert_subtitle(&self, input_file: &Path, output_file: Option<&Path>, force_overwrite: bool) -> Result<Option<(PathBuf, Conversion)>> {
        let start_time = Instant::now();

        if !FileManager::file_exists(input_file) {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }
        SubtitleNormalizer::check_input_path(input_file)?;

        let output_path = output_file
            .map(Path::to_path_buf)
            .unwrap_or_else(|| FileManager::default_output_path(input_file, "txt"));

        if output_path == input_file {
            return Err(anyhow!("Output path would overwrite the input file: {:?}", input_file));
        }

        if output_path.exists() && !force_overwrite {
            warn!("Skipping {:?}, output already exists (use -f to force overwrite)", output_path);
            return Ok(None);
        }

        info!("Converting: {}", input_file.display());
        let normalizer = SubtitleNormalizer::from_config(&self.config)?;
        let conversion = normalizer.convert_file(input_file)?;

        if conversion.skipped_count > 0 {
            warn!("Skipped {} malformed subtitle blocks", conversion.skipped_count);
        }

        FileManager::write_to_file(&output_path, &conversion.text)?;

        info!(
            "Success: {} ({} cues, {} paragraphs, {})",
            output_path.display(),
            conversion.cue_count,
            conversion.paragraph_count,
            Self::format_duration(start_time.elapsed())
        );

        Ok(Some((output_path, conversion)))
    }

    /// Convert every `.vtt` and `.srt` file under a directory.
    ///
    /// A failing file is logged and counted; it does not stop the run.
    pub fn convert_folder(&self, input_dir: &Path, force_overwrite: bool) -> Result<FolderReport> {
        if !FileManager::dir_exists(input_dir) {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let files = FileManager::find_files(input_dir, &SUBTITLE_EXTENSIONS)?;
        let mut report = FolderReport::default();

        if files.is_empty() {
            warn!("No subtitle files found in {:?}", input_dir);
            return Ok(report);
        }

        info!("Found {} subtitle files in {:?}", files.len(), input_dir);

        let progress_bar = ProgressBar::new(files.len() as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("=> "));

        for file in &files {
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            progress_bar.set_message(name);

            match self.convert_subtitle(file, None, force_overwrite) {
                Ok(Some(_)) => report.converted += 1,
                Ok(None) => report.skipped += 1,
                Err(e) => {
                    progress_bar.suspend(|| error!("Error processing {:?}: {:#}", file, e));
                    report.failed += 1;
                }
            }
            progress_bar.inc(1);
        }

        progress_bar.finish_and_clear();

        info!(
            "Finished folder: {} converted, {} skipped, {} failed",
            report.converted, report.skipped, report.failed
        );

        Ok(report)
    }

    /// Polish a plain text transcript into a Markdown document
    pub fn polish_document(&self, input_file: &Path, output_file: Option<&Path>, force_overwrite: bool) -> Result<Option<(PathBuf, PolishedDocument)>> {
        if !FileManager::file_exists(input_file) {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }

        let output_path = output_file
            .map(Path::to_path_buf)
            .unwrap_or_else(|| FileManager::default_output_path(input_file, "md"));

        if output_path == input_file {
            return Err(anyhow!("Output path would overwrite the input file: {:?}", input_file));
        }

        if output_path.exists() && !force_overwrite {
            warn!("Skipping {:?}, output already exists (use -f to force overwrite)", output_path);
            return Ok(None);
        }

        info!("Polishing: {}", input_file.display());
        let content = FileManager::read_to_string(input_file)?;
        let title_hint = input_file.file_stem().map(|s| s.to_string_lossy().to_string());

        let polisher = DocumentPolisher::from_config(&self.config)?;
        let document = polisher
            .polish(&content, title_hint.as_deref())
            .with_context(|| format!("Failed to polish: {}", input_file.display()))?;

        debug!("Document language: {}", document.language);
        FileManager::write_to_file(&output_path, &document.to_markdown())?;
        info!("Success: {}", output_path.display());

        Ok(Some((output_path, document)))
    }

    /// First `limit` characters of `text`, marked when truncated
    pub fn preview(text: &str, limit: usize) -> String {
        match text.char_indices().nth(limit) {
            Some((cut, _)) => format!("{}\n\n[... truncated ...]", &text[..cut]),
            None => text.to_string(),
        }
    }

    // Format duration in a human-readable format
    fn format_duration(duration: std::time::Duration) -> String {
        let total_seconds = duration.as_secs();
        let minutes = total_seconds / 60;
        let seconds = total_seconds % 60;

        if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}ms", duration.as_millis())
        }
    }
}
