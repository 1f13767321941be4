//! Validation failures for domain models.

use rag_twin_shared::{ErrorCode, RagError};
use std::fmt;

/// Validation failures raised when building domain records.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Chunk content is empty or whitespace-only.
    EmptyContent,
    /// Chunk source file is empty.
    MissingSourceFile,
    /// Embedding metadata chunk id is empty.
    EmptyChunkId,
    /// Embedding metadata source file is empty.
    EmptySourceFile,
    /// Embedding metadata model is empty.
    EmptyEmbeddingModel,
    /// Search result lists differ in length.
    SearchLengthMismatch {
        /// Number of indices.
        indices: usize,
        /// Number of distances.
        distances: usize,
        /// Number of metadata entries.
        metadata: usize,
    },
    /// Query relevance scores do not line up with retrieved chunks.
    ScoreCountMismatch {
        /// Number of retrieved chunks.
        chunks: usize,
        /// Number of relevance scores.
        scores: usize,
    },
    /// Confidence score outside `[0.0, 1.0]`.
    ConfidenceOutOfRange {
        /// Observed score.
        value: f64,
    },
    /// Negative generation time.
    NegativeGenerationTime {
        /// Observed seconds.
        value: f64,
    },
    /// Negative ingestion processing time.
    NegativeProcessingTime {
        /// Observed seconds.
        value: f64,
    },
}

impl ModelError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::EmptyContent => ErrorCode::DocumentEmpty,
            Self::MissingSourceFile | Self::NegativeProcessingTime { .. } => {
                ErrorCode::DocumentInvalidFormat
            },
            Self::EmptyChunkId | Self::EmptySourceFile | Self::EmptyEmbeddingModel => {
                ErrorCode::EmbeddingGenerationFailed
            },
            Self::SearchLengthMismatch { .. } => ErrorCode::VectorStoreSearchFailed,
            Self::ScoreCountMismatch { .. } => ErrorCode::QueryProcessingFailed,
            Self::ConfidenceOutOfRange { .. } | Self::NegativeGenerationTime { .. } => {
                ErrorCode::LlmGenerationFailed
            },
        }
    }
}

impl fmt::Display for ModelError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyContent => formatter.write_str("Document chunk content cannot be empty"),
            Self::MissingSourceFile => formatter.write_str("Source file must be specified"),
            Self::EmptyChunkId => formatter.write_str("Chunk ID cannot be empty"),
            Self::EmptySourceFile => formatter.write_str("Source file cannot be empty"),
            Self::EmptyEmbeddingModel => formatter.write_str("Embedding model cannot be empty"),
            Self::SearchLengthMismatch {
                indices,
                distances,
                metadata,
            } => write!(
                formatter,
                "indices ({indices}), distances ({distances}) and metadata ({metadata}) must have the same length"
            ),
            Self::ScoreCountMismatch { chunks, scores } => write!(
                formatter,
                "relevance scores ({scores}) must match retrieved chunks ({chunks})"
            ),
            Self::ConfidenceOutOfRange { value } => write!(
                formatter,
                "Confidence score must be between 0.0 and 1.0, got {value}"
            ),
            Self::NegativeGenerationTime { value } => {
                write!(formatter, "Generation time cannot be negative, got {value}")
            },
            Self::NegativeProcessingTime { value } => {
                write!(formatter, "Processing time cannot be negative, got {value}")
            },
        }
    }
}

impl std::error::Error for ModelError {}

impl From<ModelError> for RagError {
    fn from(error: ModelError) -> Self {
        let code = error.error_code();
        let message = error.to_string();
        match code.domain() {
            rag_twin_shared::ErrorDomain::Document => Self::document(message, code, ""),
            rag_twin_shared::ErrorDomain::Embedding => Self::embedding(message, code, ""),
            rag_twin_shared::ErrorDomain::VectorStore => Self::vector_store(message, code, ""),
            rag_twin_shared::ErrorDomain::Query => Self::query(message, code, ""),
            rag_twin_shared::ErrorDomain::Generation => Self::response(message, code, ""),
            rag_twin_shared::ErrorDomain::Configuration => Self::configuration(message, code, ""),
            rag_twin_shared::ErrorDomain::System => Self::system(message, code, ""),
        }
    }
}
