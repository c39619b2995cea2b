//! Command line argument parsing

use crate::config::DEFAULT_CONFIG_FILE;
use crate::core::{DEFAULT_LIST_FILE, DEFAULT_REPORT_FILE};
use clap::Parser;
use std::path::PathBuf;

/// RYT Batch - download the video and audio of every entry in a work list
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Work list file, one `name url` per line
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_LIST_FILE)]
    pub list: PathBuf,

    /// JSON configuration file (created with defaults when missing)
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Netscape cookie file; used for authenticated downloads when present
    #[arg(long, value_name = "FILE", default_value = "cookies.txt")]
    pub cookies: PathBuf,

    /// Output directory (videos/ and audio/ are created inside)
    #[arg(short, long, value_name = "DIR", default_value = "downloads")]
    pub output: PathBuf,

    /// Failure report file, overwritten every run
    #[arg(long, value_name = "FILE", default_value = DEFAULT_REPORT_FILE)]
    pub report: PathBuf,

    /// Append-only run log
    #[arg(long, value_name = "FILE", default_value = "download_log.txt")]
    pub log_file: PathBuf,

    /// yt-dlp executable name or path
    #[arg(long, value_name = "PROGRAM", default_value = "yt-dlp")]
    pub yt_dlp: String,

    /// Items processed at once (overrides max_workers from the config)
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,

    /// Start without asking for confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet output (only errors)
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Get output verbosity level
    pub fn verbosity_level(&self) -> VerbosityLevel {
        if self.quiet {
            VerbosityLevel::Quiet
        } else if self.verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        }
    }

    /// Cookie guide path, next to the work list
    pub fn cookie_guide_path(&self) -> PathBuf {
        self.list
            .parent()
            .map(|dir| dir.join("cookies_guide.txt"))
            .unwrap_or_else(|| PathBuf::from("cookies_guide.txt"))
    }
}

/// Output verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbosityLevel {
    /// Quiet (only errors)
    Quiet,
    /// Normal
    Normal,
    /// Verbose (debug info)
    Verbose,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            list: PathBuf::from(DEFAULT_LIST_FILE),
            config: PathBuf::from(DEFAULT_CONFIG_FILE),
            cookies: PathBuf::from("cookies.txt"),
            output: PathBuf::from("downloads"),
            report: PathBuf::from(DEFAULT_REPORT_FILE),
            log_file: PathBuf::from("download_log.txt"),
            yt_dlp: "yt-dlp".to_string(),
            workers: None,
            yes: false,
            verbose: false,
            quiet: false,
        }
    }
}
