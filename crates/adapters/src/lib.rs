//! # rag-twin-adapters
//!
//! Adapter implementations: the JSON logger behind `LoggerPort`, its sinks,
//! logger setup, and local filesystem helpers.
//! This crate depends on `ports` and `shared`.

/// Local filesystem helpers.
pub mod fs;
pub mod log_sink;
pub mod logger;
/// Logger construction.
pub mod logging;

pub use fs::{
    FileCheck, FileType, SUPPORTED_FILE_TYPES, backup_file, clean_filename, directory_size,
    ensure_directory, file_size, find_files, format_file_size, is_supported_file_type,
    validate_file,
};
pub use log_sink::{
    DEFAULT_BACKUP_COUNT, DEFAULT_MAX_BYTES, LogSink, RotatingFileLogSink, StderrLogSink,
    TeeLogSink,
};
pub use logger::JsonLogger;
pub use logging::{LOGGER_FIELD, LoggingOptions, ROOT_LOGGER_NAME, get_logger, setup_logging};

/// Returns the adapters crate version.
#[must_use]
pub const fn adapters_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
