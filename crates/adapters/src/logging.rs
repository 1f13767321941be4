//! Logger construction for the `rag_twin` logger tree.

use crate::log_sink::{
    DEFAULT_BACKUP_COUNT, DEFAULT_MAX_BYTES, LogSink, RotatingFileLogSink, StderrLogSink,
    TeeLogSink,
};
use crate::logger::JsonLogger;
use rag_twin_ports::{LogFields, LogLevel, LoggerPort};
use rag_twin_shared::{ErrorCode, RagError, Result};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

/// Name of the root logger; component loggers are `rag_twin.<name>`.
pub const ROOT_LOGGER_NAME: &str = "rag_twin";
/// Field carrying the logger name on every event.
pub const LOGGER_FIELD: &str = "logger";

/// Inputs to [`setup_logging`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingOptions {
    /// `DEBUG`, `INFO`, `WARNING`/`WARN`, `ERROR` or `CRITICAL`, any case.
    pub level: String,
    /// Optional rotating log file.
    pub log_file: Option<PathBuf>,
    /// Rotation threshold for `log_file`.
    pub max_bytes: u64,
    /// Rotated files kept for `log_file`.
    pub backup_count: usize,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            level: "INFO".to_owned(),
            log_file: None,
            max_bytes: DEFAULT_MAX_BYTES,
            backup_count: DEFAULT_BACKUP_COUNT,
        }
    }
}

impl LoggingOptions {
    /// Set the level name.
    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Also write to a rotating file at `path`.
    #[must_use]
    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    /// Parse the configured level.
    pub fn parse_level(&self) -> Result<LogLevel> {
        self.level.parse::<LogLevel>().map_err(|error| {
            RagError::configuration(
                format!("Invalid log level: {}", self.level),
                ErrorCode::ConfigInvalid,
                "log_level",
            )
            .with_cause(error)
        })
    }
}

/// Build the root JSON logger: stderr, plus a rotating file when configured.
///
/// Every call builds a fresh logger; nothing is installed globally.
pub fn setup_logging(options: &LoggingOptions) -> Result<JsonLogger> {
    let level = options.parse_level()?;
    let stderr: Arc<dyn LogSink> = Arc::new(StderrLogSink);

    let sink: Arc<dyn LogSink> = match &options.log_file {
        Some(path) => {
            let file =
                RotatingFileLogSink::with_limits(path, options.max_bytes, options.backup_count)?;
            Arc::new(TeeLogSink::new(vec![stderr, Arc::new(file)]))
        },
        None => stderr,
    };

    Ok(JsonLogger::new(sink)
        .with_min_level(level)
        .with_base_fields(logger_fields(ROOT_LOGGER_NAME)))
}

/// Child of `parent` named `rag_twin.<name>`.
#[must_use]
pub fn get_logger(parent: &dyn LoggerPort, name: &str) -> Box<dyn LoggerPort> {
    parent.child(logger_fields(&format!("{ROOT_LOGGER_NAME}.{name}")))
}

fn logger_fields(name: &str) -> LogFields {
    let mut fields = LogFields::new();
    fields.insert(LOGGER_FIELD.into(), Value::from(name));
    fields
}
