//! Command-line arguments

use clap::Parser;
use std::path::PathBuf;

use crate::domain::CEConfig;
use crate::logging;

/// A tui based csv editor
#[derive(Parser, Debug)]
#[command(name = "ce", version, about = "A tui based csv editor")]
pub struct CliArgs {
    /// CSV file to open
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Directory that edited_data.csv is written to
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Maximum width of a column in characters
    #[arg(long, value_name = "N", default_value_t = 30)]
    pub max_column_width: usize,

    /// Event poll timeout in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 100)]
    pub poll_ms: u64,

    /// Log file, defaults to ce.log in the temp directory
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

impl CliArgs {
    pub fn config(&self) -> CEConfig {
        CEConfig::default()
            .with_event_poll_time(self.poll_ms)
            .with_max_column_width(self.max_column_width)
            .with_output_dir(self.output_dir.clone())
    }

    pub fn log_file(&self) -> PathBuf {
        self.log_file.clone().unwrap_or_else(logging::default_log_file)
    }
}
