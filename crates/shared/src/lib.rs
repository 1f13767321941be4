//! # rag-twin-shared
//!
//! Error taxonomy and helpers shared by every rag-twin crate.
//!
//! - Stable error codes grouped by domain
//! - The structured `RagError` and its serializable `ErrorRecord`
//! - `Result` alias and secret-key redaction
//!
//! ## Design Principles
//!
//! 1. **No workspace dependencies** - This crate only depends on external crates
//! 2. **Serde-compatible** - Records and codes serialize to stable strings

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod errors;
pub mod redaction;
pub mod result;

pub use errors::{
    ErrorCause, ErrorCode, ErrorDetails, ErrorDomain, ErrorRecord, QUERY_DETAIL_MAX_CHARS,
    RagError, component,
};
pub use redaction::{REDACTED, is_secret_key, redact_if_secret};
pub use result::Result;

/// Returns the shared crate version.
#[must_use]
pub const fn shared_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
