//! CLI argument definitions and parsing structures
//!
//! This module defines the command-line interface structure using clap,
//! including the main `Cli` struct and the subcommand enum.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// tessrun - run the Tesseract OCR engine
#[derive(Parser, Debug)]
#[command(name = "tessrun")]
#[command(about = "Run the Tesseract OCR engine with version-aware command lines")]
#[command(long_about = r#"
tessrun runs the Tesseract OCR engine as a child process. It renders the
command line for the installed engine version, streams images and results
without temp files when asked to, and reports failures together with the
exact command that was executed.

EXAMPLES:
  # Recognise an image
  tessrun ocr scan.png --lang eng --psm 6

  # Several languages and an engine variable
  tessrun ocr scan.png -l eng -l deu --var preserve_interword_spaces=1

  # Stream the image in and the text out, no temp files
  tessrun ocr scan.png --stdin --stdout

  # Keep hOCR output next to the image
  tessrun ocr scan.png --config-file hocr --output scan.hocr

  # Print the command line only
  tessrun ocr scan.png --lang eng --dry-run

  # Engine information
  tessrun version
  tessrun langs --json

CONFIGURATION:
  Configuration is loaded with precedence: CLI flags > config file > defaults
  The config file is $TESSRUN_HOME/config.toml, or the nearest
  .tessrun/config.toml found searching upward from the current directory.
  Use --config to specify an explicit config file path
  Use 'tessrun config' to see every effective value and where it came from
"#)]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Tesseract executable name or path
    #[arg(long, global = true)]
    pub executable: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit JSON instead of plain text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Recognise text in an image
    Ocr(OcrArgs),

    /// Show the installed engine version
    Version,

    /// List the languages the engine can recognise
    Langs,

    /// Show the effective configuration and where each value came from
    Config,
}

/// Arguments of `tessrun ocr`.
#[derive(Args, Debug, Clone, Default)]
pub struct OcrArgs {
    /// Image to recognise
    pub image: PathBuf,

    /// Recognition language (repeatable, joined with '+')
    #[arg(short = 'l', long = "lang", value_name = "LANG")]
    pub lang: Vec<String>,

    /// Page segmentation mode (0-13)
    #[arg(long)]
    pub psm: Option<u8>,

    /// OCR engine mode (0-3, Tesseract 3.05 or later)
    #[arg(long)]
    pub oem: Option<u8>,

    /// Extra word list (Tesseract 3.04 or later)
    #[arg(long, value_name = "PATH")]
    pub user_words: Option<PathBuf>,

    /// Extra pattern list (Tesseract 3.04 or later)
    #[arg(long, value_name = "PATH")]
    pub user_patterns: Option<PathBuf>,

    /// Directory holding the traineddata files
    #[arg(long, value_name = "PATH")]
    pub tessdata_dir: Option<PathBuf>,

    /// Config file appended to the command (e.g. hocr, tsv, pdf, digits)
    #[arg(long, value_name = "NAME")]
    pub config_file: Option<String>,

    /// Engine variable (repeatable)
    #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub variables: Vec<(String, String)>,

    /// Only recognise these characters
    #[arg(long, value_name = "CHARS")]
    pub whitelist: Option<String>,

    /// Feed the image over stdin (Tesseract 3.03-rc1 or later)
    #[arg(long)]
    pub stdin: bool,

    /// Read the result from stdout instead of a temp file (Tesseract 3.03-rc1 or later)
    #[arg(long, conflicts_with = "output")]
    pub stdout: bool,

    /// Keep the engine's output file at this path
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Directory for temp output files
    #[arg(long, value_name = "DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Limit the engine's OpenMP threads (sets OMP_THREAD_LIMIT)
    #[arg(long, value_name = "N")]
    pub thread_limit: Option<u32>,

    /// Kill the engine after this many seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Print the command line without running recognition
    #[arg(long)]
    pub dry_run: bool,
}

/// Parse a `KEY=VALUE` pair; the value may itself contain `=`.
pub fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}
