//! # rag-twin-domain
//!
//! Data models exchanged by the RAG pipeline collaborators.
//!
//! - **Chunks** - `DocumentChunk`
//! - **Embeddings** - `EmbeddingMetadata`
//! - **Search** - `SearchResults`, `QueryResults`, `RetrievedContext`, `GeneratedResponse`
//! - **Status** - `SystemStatus`, `SystemHealth`, `IngestionResults`
//!
//! ## Dependency Rules
//!
//! - Depends only on `shared` crate
//! - No infrastructure or adapter dependencies
//! - Pure validated records with no I/O

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub use rag_twin_shared::shared_crate_version;

pub mod chunk;
pub mod embedding;
pub mod error;
pub mod search;
pub mod status;

pub use chunk::{DEFAULT_PREVIEW_CHARS, DocumentChunk, Metadata};
pub use embedding::EmbeddingMetadata;
pub use error::ModelError;
pub use search::{
    GeneratedResponse, GeneratedResponseRecord, QueryResults, RetrievedContext, SearchResults,
};
pub use status::{IngestionResults, SystemHealth, SystemStatus};

/// Returns the domain crate version.
#[must_use]
pub const fn domain_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_crate_compiles() {
        let version = domain_crate_version();
        assert!(!version.is_empty());
    }

    #[test]
    fn domain_depends_on_shared() {
        let shared_version = shared_crate_version();
        assert!(!shared_version.is_empty());
    }
}
