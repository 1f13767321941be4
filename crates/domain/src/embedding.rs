//! Metadata linking an embedding vector back to its chunk.

use crate::chunk::{DEFAULT_PREVIEW_CHARS, preview, short_id};
use crate::{DocumentChunk, ModelError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Provenance for one stored embedding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "EmbeddingMetadataRecord")]
pub struct EmbeddingMetadata {
    chunk_id: String,
    source_file: String,
    content_preview: String,
    embedding_model: String,
    created_at: DateTime<Utc>,
}

impl EmbeddingMetadata {
    /// Validate and build metadata stamped with the current time.
    pub fn new(
        chunk_id: impl Into<String>,
        source_file: impl Into<String>,
        content_preview: impl Into<String>,
        embedding_model: impl Into<String>,
    ) -> Result<Self, ModelError> {
        Self::try_from(EmbeddingMetadataRecord {
            chunk_id: chunk_id.into(),
            source_file: source_file.into(),
            content_preview: content_preview.into(),
            embedding_model: embedding_model.into(),
            created_at: Utc::now(),
        })
    }

    /// Derive metadata from a chunk, previewing `preview_length` characters.
    pub fn from_document_chunk(
        chunk: &DocumentChunk,
        embedding_model: &str,
        preview_length: usize,
    ) -> Result<Self, ModelError> {
        Self::new(
            chunk.chunk_id(),
            chunk.source_file(),
            preview(chunk.content(), preview_length),
            embedding_model,
        )
    }

    /// Same as [`Self::from_document_chunk`] with the default preview length.
    pub fn from_chunk_default(
        chunk: &DocumentChunk,
        embedding_model: &str,
    ) -> Result<Self, ModelError> {
        Self::from_document_chunk(chunk, embedding_model, DEFAULT_PREVIEW_CHARS)
    }

    /// Source chunk identifier.
    #[must_use]
    pub fn chunk_id(&self) -> &str {
        &self.chunk_id
    }

    /// Originating file path.
    #[must_use]
    pub fn source_file(&self) -> &str {
        &self.source_file
    }

    /// Truncated chunk content.
    #[must_use]
    pub fn content_preview(&self) -> &str {
        &self.content_preview
    }

    /// Model that produced the vector.
    #[must_use]
    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    /// Creation timestamp (UTC).
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl fmt::Display for EmbeddingMetadata {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "EmbeddingMetadata(chunk_id={}, model={})",
            short_id(&self.chunk_id),
            self.embedding_model
        )
    }
}

impl TryFrom<EmbeddingMetadataRecord> for EmbeddingMetadata {
    type Error = ModelError;

    fn try_from(record: EmbeddingMetadataRecord) -> Result<Self, Self::Error> {
        if record.chunk_id.is_empty() {
            return Err(ModelError::EmptyChunkId);
        }
        if record.source_file.is_empty() {
            return Err(ModelError::EmptySourceFile);
        }
        if record.embedding_model.is_empty() {
            return Err(ModelError::EmptyEmbeddingModel);
        }
        Ok(Self {
            chunk_id: record.chunk_id,
            source_file: record.source_file,
            content_preview: record.content_preview,
            embedding_model: record.embedding_model,
            created_at: record.created_at,
        })
    }
}

#[derive(Deserialize)]
struct EmbeddingMetadataRecord {
    chunk_id: String,
    source_file: String,
    content_preview: String,
    embedding_model: String,
    #[serde(default = "Utc::now")]
    created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_from_chunk_with_preview() -> Result<(), ModelError> {
        let chunk = DocumentChunk::new("x".repeat(120), "doc.txt")?.with_id("chunk-001");
        let metadata = EmbeddingMetadata::from_chunk_default(&chunk, "text-embedding-ada-002")?;
        assert_eq!(metadata.chunk_id(), "chunk-001");
        assert_eq!(metadata.source_file(), "doc.txt");
        assert_eq!(metadata.content_preview().len(), 103);
        assert_eq!(
            metadata.to_string(),
            "EmbeddingMetadata(chunk_id=chunk-00, model=text-embedding-ada-002)"
        );
        Ok(())
    }

    #[test]
    fn rejects_empty_required_fields() {
        assert_eq!(
            EmbeddingMetadata::new("", "a.txt", "p", "m").err(),
            Some(ModelError::EmptyChunkId)
        );
        assert_eq!(
            EmbeddingMetadata::new("id", "", "p", "m").err(),
            Some(ModelError::EmptySourceFile)
        );
        assert_eq!(
            EmbeddingMetadata::new("id", "a.txt", "p", "").err(),
            Some(ModelError::EmptyEmbeddingModel)
        );
    }

    #[test]
    fn serde_round_trip() -> Result<(), Box<dyn std::error::Error>> {
        let metadata = EmbeddingMetadata::new("id-1", "a.txt", "preview", "model")?;
        let decoded: EmbeddingMetadata =
            serde_json::from_str(&serde_json::to_string(&metadata)?)?;
        assert_eq!(decoded, metadata);
        Ok(())
    }
}
