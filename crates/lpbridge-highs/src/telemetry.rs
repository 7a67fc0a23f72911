//! Process-wide tracing subscriber setup.

use std::env;
use std::fs::{File, OpenOptions};
use std::io;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter directive used when no level is passed.
pub const TRACE_ENV: &str = "LPBRIDGE_TRACE";
/// `pretty` (default) or `json`.
pub const FORMAT_ENV: &str = "LPBRIDGE_LOG_FORMAT";
/// Optional path receiving a copy of every event.
pub const FILE_ENV: &str = "LPBRIDGE_LOG_FILE";

#[derive(Debug)]
pub enum TelemetryError {
    InvalidFilter { directive: String, reason: String },
    InvalidFormat { format: String },
    LogFile { path: String, source: io::Error },
    Init { reason: String },
}

impl TelemetryError {
    pub fn code(&self) -> &'static str {
        match self {
            TelemetryError::InvalidFilter { .. } => "TELEMETRY_INVALID_FILTER",
            TelemetryError::InvalidFormat { .. } => "TELEMETRY_INVALID_FORMAT",
            TelemetryError::LogFile { .. } => "TELEMETRY_LOG_FILE",
            TelemetryError::Init { .. } => "TELEMETRY_INIT",
        }
    }
}

impl std::fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TelemetryError::InvalidFilter { directive, reason } => write!(
                f,
                "[{}] Invalid log filter '{}': {}",
                self.code(),
                directive,
                reason
            ),
            TelemetryError::InvalidFormat { format } => write!(
                f,
                "[{}] Invalid {FORMAT_ENV} '{}' (expected 'json' or 'pretty')",
                self.code(),
                format
            ),
            TelemetryError::LogFile { path, source } => write!(
                f,
                "[{}] Failed to open log file '{}': {}",
                self.code(),
                path,
                source
            ),
            TelemetryError::Init { reason } => {
                write!(f, "[{}] Failed to initialize logging: {}", self.code(), reason)
            }
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::LogFile { source, .. } => Some(source),
            _ => None,
        }
    }
}

fn open_log_file(path: &str) -> Result<File, TelemetryError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| TelemetryError::LogFile {
            path: path.to_string(),
            source,
        })
}

fn map_init_err<E: std::fmt::Display>(err: E) -> TelemetryError {
    TelemetryError::Init {
        reason: err.to_string(),
    }
}

/// Build the filter for `level`, where `"off"` disables every event.
pub fn build_filter(level: &str) -> Result<EnvFilter, TelemetryError> {
    if level.eq_ignore_ascii_case("off") {
        return Ok(EnvFilter::default().add_directive(LevelFilter::OFF.into()));
    }
    EnvFilter::try_new(level).map_err(|err| TelemetryError::InvalidFilter {
        directive: level.to_string(),
        reason: err.to_string(),
    })
}

/// Install a global subscriber writing to stderr (and `LPBRIDGE_LOG_FILE`).
///
/// When `level` is `None`, `LPBRIDGE_TRACE` is read; when that is unset too,
/// logging stays off. Returns `false` if a subscriber is already installed.
pub fn enable_logging(level: Option<&str>) -> Result<bool, TelemetryError> {
    if tracing::dispatcher::has_been_set() {
        return Ok(false);
    }

    let level_value = level
        .map(str::to_string)
        .or_else(|| env::var(TRACE_ENV).ok())
        .unwrap_or_else(|| "off".to_string());
    let filter = build_filter(&level_value)?;

    let format = env::var(FORMAT_ENV).unwrap_or_else(|_| "pretty".to_string());
    let log_file = env::var(FILE_ENV).ok();
    let use_json = format.eq_ignore_ascii_case("json");
    if !use_json && !format.eq_ignore_ascii_case("pretty") {
        return Err(TelemetryError::InvalidFormat { format });
    }

    if use_json {
        let stderr_layer = tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .json();
        let base = tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer);
        if let Some(path) = log_file {
            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(open_log_file(&path)?)
                .with_ansi(false)
                .json();
            base.with(file_layer).try_init().map_err(map_init_err)?;
        } else {
            base.try_init().map_err(map_init_err)?;
        }
    } else {
        let stderr_layer = tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .pretty();
        let base = tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer);
        if let Some(path) = log_file {
            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(open_log_file(&path)?)
                .with_ansi(false)
                .pretty();
            base.with(file_layer).try_init().map_err(map_init_err)?;
        } else {
            base.try_init().map_err(map_init_err)?;
        }
    }

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_off_filter_is_accepted() {
        assert!(build_filter("off").is_ok());
        assert!(build_filter("OFF").is_ok());
        assert!(build_filter("lpbridge_highs=debug").is_ok());
    }

    #[test]
    fn test_invalid_filter_reports_code() {
        let err = build_filter("lpbridge_highs=notalevel").unwrap_err();
        assert_eq!(err.code(), "TELEMETRY_INVALID_FILTER");
        assert!(err.to_string().starts_with("[TELEMETRY_INVALID_FILTER]"));
    }
}
