use std::{fs::OpenOptions, sync::Mutex};

use tracing_subscriber::EnvFilter;

use crate::{
    config::AppConfig,
    error::{AppError, Result},
};

/// Directives used when `RUST_LOG` is not set.
fn default_directives(level: &str) -> String {
    format!("finboard_tui={level},engine={level}")
}

/// Sends `tracing` output to the configured log file; stdout is owned by
/// the terminal UI.
pub fn init(config: &AppConfig) -> Result<()> {
    if let Some(parent) = config.log_file.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.log_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|err| AppError::Logging(err.to_string()))?;

    tracing::info!(log_file = %config.log_file.display(), "logging initialised");
    Ok(())
}
