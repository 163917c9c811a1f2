//! Command-line argument parsing.

use clap::Parser;
use std::path::PathBuf;

/// Default log file, written next to the working directory.
pub const DEFAULT_LOG_FILE: &str = "feature_extraction.log";

/// featx - Extract product features from text descriptions with an LLM.
#[derive(Debug, Parser)]
#[command(name = "featx")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose (debug) console logging
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress console output except errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Detailed log file
    #[arg(long, env = "FEATX_LOG_FILE", default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,

    /// Do not write a log file (overrides --log-file)
    #[arg(long)]
    pub no_log_file: bool,
}

impl Cli {
    /// Log file to open, if any.
    pub fn log_file(&self) -> Option<&PathBuf> {
        (!self.no_log_file).then_some(&self.log_file)
    }
}
