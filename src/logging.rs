//! Logging initialisation via tracing-subscriber.
//!
//! `RUST_LOG` takes precedence over the configured level. While the TUI owns the
//! terminal, output goes to a file or nowhere.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Error, Debug)]
pub enum LogError {
    #[error("invalid log level '{0}'")]
    InvalidLevel(String),
    #[error("failed to open log file: {0}")]
    File(#[from] std::io::Error),
    #[error("failed to set subscriber: {0}")]
    Install(String),
}

/// Where log lines are written
pub enum LogTarget<'a> {
    Stderr,
    File(&'a Path),
    Discard,
}

/// Install the global subscriber
pub fn init(level: &str, target: LogTarget<'_>) -> Result<(), LogError> {
    parse_level(level)?;
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|_| LogError::InvalidLevel(level.to_string()))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = match target {
        LogTarget::Stderr => builder.with_writer(std::io::stderr).try_init(),
        LogTarget::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        LogTarget::Discard => builder.with_writer(std::io::sink).try_init(),
    };

    installed.map_err(|e| LogError::Install(e.to_string()))
}

/// Parse a log level string, rejecting unknown values
pub fn parse_level(level: &str) -> Result<LevelFilter, LogError> {
    if level.trim().is_empty() {
        return Err(LogError::InvalidLevel(level.to_string()));
    }
    level
        .parse::<LevelFilter>()
        .map_err(|_| LogError::InvalidLevel(level.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_levels() {
        assert_eq!(parse_level("warn").unwrap(), LevelFilter::WARN);
        assert_eq!(parse_level("DEBUG").unwrap(), LevelFilter::DEBUG);
        assert_eq!(parse_level("off").unwrap(), LevelFilter::OFF);
    }

    #[test]
    fn rejects_unknown_levels() {
        assert!(matches!(parse_level(""), Err(LogError::InvalidLevel(_))));
        assert!(matches!(parse_level("loud"), Err(LogError::InvalidLevel(_))));
    }
}
