//! Tracing setup
//!
//! The terminal belongs to the ui, so all log output goes to a file.
//! The filter is read from `RUST_LOG` and defaults to `info`, e.g.
//! `RUST_LOG=ce::model=trace`.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::domain::CEError;

pub const LOG_FILE_NAME: &str = "ce.log";

pub fn default_log_file() -> PathBuf {
    std::env::temp_dir().join(LOG_FILE_NAME)
}

pub fn init(log_file: &Path) -> Result<(), CEError> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(ErrorLayer::default())
        .try_init()
        .map_err(|e| CEError::SetupFailed(format!("Could not initialize logging: {e}")))?;

    tracing::info!("Logging to {}", log_file.display());
    Ok(())
}
