//! # rag-twin-app
//!
//! Application services. Today this is the error funnel every failure
//! passes through before it reaches a user.
//! This crate depends on `ports` and `shared`.

pub mod error_handler;

pub use error_handler::{
    ErrorContext, ErrorHandler, ErrorResponse, RECOVERABLE_CODES, is_recoverable, should_retry,
};

/// Returns the app crate version.
#[must_use]
pub const fn app_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
