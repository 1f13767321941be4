//! Workspace result alias.

use crate::errors::RagError;

/// Result whose error defaults to [`RagError`].
pub type Result<T, E = RagError> = std::result::Result<T, E>;
