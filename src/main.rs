// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow};
use log::{debug, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::path::PathBuf;
use std::io::Write;
use clap::{Args, Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use subdoc::app_config::{self, Config};
use subdoc::app_controller::Controller;

/// CLI Wrapper for the language setting to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLanguage {
    /// Detect from the captions
    Auto,
    /// English
    En,
    /// Traditional Chinese
    #[value(name = "zh_tw", alias = "zh-tw")]
    ZhTw,
    /// Simplified Chinese
    #[value(name = "zh_cn", alias = "zh-cn")]
    ZhCn,
}

impl CliLanguage {
    fn as_setting(self) -> &'static str {
        match self {
            CliLanguage::Auto => "auto",
            CliLanguage::En => "en",
            CliLanguage::ZhTw => "zh_tw",
            CliLanguage::ZhCn => "zh_cn",
        }
    }
}

/// CLI Wrapper for the subtitle format setting
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliFormat {
    Auto,
    Vtt,
    Srt,
}

impl CliFormat {
    fn as_setting(self) -> &'static str {
        match self {
            CliFormat::Auto => "auto",
            CliFormat::Vtt => "vtt",
            CliFormat::Srt => "srt",
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert subtitles to plain text (default command)
    #[command(alias = "convert")]
    Text(ConvertArgs),

    /// Polish a plain text transcript into a Markdown document
    Polish(PolishArgs),

    /// Generate shell completions for subdoc
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Subtitle file (.vtt or .srt) or directory to process
    #[arg(value_name = "INPUT")]
    input_path: Option<PathBuf>,

    /// Output text file (defaults to the input with a .txt extension)
    #[arg(value_name = "OUTPUT")]
    output_path: Option<PathBuf>,

    /// Language mode
    #[arg(long, value_enum)]
    lang: Option<CliLanguage>,

    /// Subtitle format, overriding extension and content detection
    #[arg(long, value_enum)]
    format: Option<CliFormat>,

    /// Pause in milliseconds that starts a new paragraph (0 disables)
    #[arg(long, value_name = "MS")]
    gap_ms: Option<u64>,

    /// Drop cues that repeat the previous caption
    #[arg(long)]
    collapse_repeats: bool,

    /// Keep sentence starts as they appear in the captions
    #[arg(long)]
    no_capitalize: bool,

    /// Keep annotations such as [Music] or (Applause)
    #[arg(long)]
    no_annotations: bool,

    /// Force overwrite of existing output files
    #[arg(short, long = "force")]
    force_overwrite: bool,

    /// Print the beginning of the converted text to stdout
    #[arg(short, long)]
    preview: bool,

    /// Configuration file path
    #[arg(short, long = "config", value_name = "PATH")]
    config_path: Option<String>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

#[derive(Args, Debug)]
struct PolishArgs {
    /// Plain text transcript to polish
    #[arg(value_name = "INPUT")]
    input_path: PathBuf,

    /// Output Markdown file (defaults to the input with a .md extension)
    #[arg(value_name = "OUTPUT")]
    output_path: Option<PathBuf>,

    /// Language mode
    #[arg(long, value_enum)]
    lang: Option<CliLanguage>,

    /// Maximum number of summary bullets
    #[arg(long, value_name = "N")]
    summary: Option<usize>,

    /// Force overwrite of existing output files
    #[arg(short, long = "force")]
    force_overwrite: bool,

    /// Configuration file path
    #[arg(short, long = "config", value_name = "PATH")]
    config_path: Option<String>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// subdoc - subtitles to documents
///
/// Converts WebVTT and SubRip subtitles into readable plain text and polishes
/// transcripts into Markdown documents. English, Traditional Chinese and
/// Simplified Chinese are supported.
#[derive(Parser, Debug)]
#[command(name = "subdoc")]
#[command(version)]
#[command(about = "Turn subtitle files into readable documents")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "subdoc converts VTT/SRT subtitles into clean paragraphs of plain text.

EXAMPLES:
    subdoc talk.vtt                          # Write talk.txt next to the input
    subdoc talk.srt notes.txt -f             # Choose the output and overwrite it
    subdoc --lang zh_tw lecture.vtt          # Force Traditional Chinese mode
    subdoc --gap-ms 0 talk.vtt               # Only break paragraphs on punctuation
    subdoc -p talk.vtt                       # Also print a preview to stdout
    subdoc /videos/subtitles/                # Convert every .vtt/.srt in a folder
    subdoc polish talk.txt                   # Write a Markdown document talk.md
    subdoc completions bash > subdoc.bash    # Generate bash completions

CONFIGURATION:
    Settings are read from subdoc.json in the current directory when present.
    With --config PATH, that file is used instead and created with defaults
    if it does not exist. Command line flags take precedence.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    convert: ConvertArgs,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Label and ANSI color for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("ERROR", "\x1B[1;31m"),
            Level::Warn => ("WARN ", "\x1B[1;33m"),
            Level::Info => ("INFO ", "\x1B[1;32m"),
            Level::Debug => ("DEBUG", "\x1B[1;36m"),
            Level::Trace => ("TRACE", "\x1B[1;35m"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S%.3f");
            let (label, color) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", color, now, label, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() -> Result<()> {
    // Trace lets the max level decide; it is lowered once the config is known
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "subdoc", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Text(args)) => run_convert(args),
        Some(Commands::Polish(args)) => run_polish(args),
        None => run_convert(cli.convert),
    }
}

/// Load the config and apply the log level, CLI first
fn load_config(config_path: Option<&str>, log_level: Option<CliLogLevel>) -> Result<Config> {
    if let Some(level) = &log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = Config::load(config_path)?;

    match log_level {
        Some(level) => config.log_level = level.into(),
        None => log::set_max_level(config.log_level.to_level_filter()),
    }

    Ok(config)
}

fn run_convert(options: ConvertArgs) -> Result<()> {
    let input_path = options
        .input_path
        .ok_or_else(|| anyhow!("INPUT is required when no subcommand is specified"))?;

    let mut config = load_config(options.config_path.as_deref(), options.log_level)?;

    // Override config with CLI options if provided
    if let Some(lang) = options.lang {
        config.language = lang.as_setting().to_string();
    }
    if let Some(format) = options.format {
        config.subtitle.format = format.as_setting().to_string();
    }
    if let Some(gap_ms) = options.gap_ms {
        config.subtitle.paragraph_gap_ms = gap_ms;
    }
    if options.collapse_repeats {
        config.subtitle.collapse_repeated_cues = true;
    }
    if options.no_capitalize {
        config.subtitle.fix_capitalization = false;
    }
    if options.no_annotations {
        config.subtitle.remove_annotations = false;
    }

    let preview_chars = config.polish.preview_chars;
    let controller = Controller::with_config(config)?;

    if input_path.is_dir() {
        if options.output_path.is_some() {
            return Err(anyhow!("OUTPUT cannot be used with a directory input"));
        }
        let report = controller.convert_folder(&input_path, options.force_overwrite)?;
        if report.failed > 0 {
            return Err(anyhow!("{} of the subtitle files could not be converted", report.failed));
        }
        return Ok(());
    }

    if !input_path.is_file() {
        return Err(anyhow!("Input path does not exist: {:?}", input_path));
    }

    let converted = controller.convert_subtitle(
        &input_path,
        options.output_path.as_deref(),
        options.force_overwrite,
    )?;

    if options.preview {
        if let Some((_, conversion)) = converted {
            println!("{}", Controller::preview(&conversion.text, preview_chars));
        }
    }

    Ok(())
}

fn run_polish(options: PolishArgs) -> Result<()> {
    let mut config = load_config(options.config_path.as_deref(), options.log_level)?;

    if let Some(lang) = options.lang {
        config.language = lang.as_setting().to_string();
    }
    if let Some(summary) = options.summary {
        config.polish.summary_sentences = summary;
    }

    let controller = Controller::with_config(config)?;
    if let Some((path, document)) = controller.polish_document(
        &options.input_path,
        options.output_path.as_deref(),
        options.force_overwrite,
    )? {
        debug!(
            "Wrote {} ({} paragraphs, {} action items)",
            path.display(),
            document.paragraphs.len(),
            document.action_items.len()
        );
    }

    Ok(())
}
