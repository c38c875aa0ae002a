//! Tracing subscriber setup.
//!
//! Filter resolution order:
//! 1. `EPORTAL_LOG` environment variable (if set and valid)
//! 2. `logging.filter` from config
//!
//! Output goes to stderr, or to a daily-rotated `eportal.log` when
//! `logging.file` names a directory.

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Environment variable overriding the configured filter.
pub const LOG_ENV: &str = "EPORTAL_LOG";

const LOG_FILE_PREFIX: &str = "eportal.log";

/// Keeps the file writer flushing until dropped.
#[must_use = "dropping the guard stops background log flushing"]
pub struct LogGuard {
    _worker: Option<WorkerGuard>,
}

/// Builds the filter from env or config.
///
/// # Errors
/// Returns an error if neither source yields a valid directive.
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.filter)
        .with_context(|| format!("Invalid logging.filter directive: {}", config.filter))
}

/// Installs the global subscriber.
///
/// # Errors
/// Returns an error if the filter is invalid, the log directory cannot be
/// created, or a global subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<LogGuard> {
    let filter = build_filter(config)?;

    match config.file.as_deref() {
        Some(dir) => {
            let dir = Path::new(dir);
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .try_init()
                .map_err(|e| anyhow!("Failed to install log subscriber: {e}"))?;
            Ok(LogGuard {
                _worker: Some(guard),
            })
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .try_init()
                .map_err(|e| anyhow!("Failed to install log subscriber: {e}"))?;
            Ok(LogGuard { _worker: None })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_filter_reported() {
        if std::env::var(LOG_ENV).is_ok() {
            return;
        }
        let config = LoggingConfig {
            filter: "eportal_core=verbose".to_string(),
            file: None,
        };
        assert!(build_filter(&config).is_err());
    }

    #[test]
    fn test_config_filter_used_without_env() {
        if std::env::var(LOG_ENV).is_ok() {
            return;
        }
        let config = LoggingConfig {
            filter: "eportal_core=debug".to_string(),
            file: None,
        };
        let filter = build_filter(&config).unwrap();
        assert!(filter.to_string().contains("eportal_core=debug"));
    }
}
