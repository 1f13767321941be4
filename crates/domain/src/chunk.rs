//! Document chunks: bounded text segments tied to their source file.

use crate::ModelError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Open metadata map attached to chunks and search hits.
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// Default preview length used by display helpers.
pub const DEFAULT_PREVIEW_CHARS: usize = 100;

/// A segment of source document text with provenance.
///
/// Content must contain at least one non-whitespace character and the
/// source file must be non-empty. Deserialization re-runs these checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DocumentChunkRecord")]
pub struct DocumentChunk {
    content: String,
    metadata: Metadata,
    source_file: String,
    chunk_id: String,
    embedding_id: Option<i64>,
    created_at: DateTime<Utc>,
}

impl DocumentChunk {
    /// Build a chunk with a fresh id and the current timestamp.
    pub fn new(
        content: impl Into<String>,
        source_file: impl Into<String>,
    ) -> Result<Self, ModelError> {
        Self::from_parts(DocumentChunkRecord {
            content: content.into(),
            metadata: Metadata::new(),
            source_file: source_file.into(),
            chunk_id: new_chunk_id(),
            embedding_id: None,
            created_at: Utc::now(),
        })
    }

    fn from_parts(record: DocumentChunkRecord) -> Result<Self, ModelError> {
        if record.content.trim().is_empty() {
            return Err(ModelError::EmptyContent);
        }
        if record.source_file.is_empty() {
            return Err(ModelError::MissingSourceFile);
        }
        Ok(Self {
            content: record.content,
            metadata: record.metadata,
            source_file: record.source_file,
            chunk_id: record.chunk_id,
            embedding_id: record.embedding_id,
            created_at: record.created_at,
        })
    }

    /// Replace the generated id.
    #[must_use]
    pub fn with_id(mut self, chunk_id: impl Into<String>) -> Self {
        self.chunk_id = chunk_id.into();
        self
    }

    /// Replace the metadata map.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Attach the vector index position.
    #[must_use]
    pub const fn with_embedding_id(mut self, embedding_id: i64) -> Self {
        self.embedding_id = Some(embedding_id);
        self
    }

    /// Replace the creation timestamp.
    #[must_use]
    pub const fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Chunk text.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Metadata map.
    #[must_use]
    pub const fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Originating file path.
    #[must_use]
    pub fn source_file(&self) -> &str {
        &self.source_file
    }

    /// Stable chunk identifier.
    #[must_use]
    pub fn chunk_id(&self) -> &str {
        &self.chunk_id
    }

    /// Vector index position, once embedded.
    #[must_use]
    pub const fn embedding_id(&self) -> Option<i64> {
        self.embedding_id
    }

    /// Creation timestamp (UTC).
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Content truncated to `max_length` characters with a `...` marker.
    #[must_use]
    pub fn content_preview(&self, max_length: usize) -> String {
        preview(&self.content, max_length)
    }
}

impl fmt::Display for DocumentChunk {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "DocumentChunk(id={}, source={}, content_length={})",
            short_id(&self.chunk_id),
            self.source_file,
            self.content.chars().count()
        )
    }
}

impl TryFrom<DocumentChunkRecord> for DocumentChunk {
    type Error = ModelError;

    fn try_from(record: DocumentChunkRecord) -> Result<Self, Self::Error> {
        Self::from_parts(record)
    }
}

#[derive(Deserialize)]
struct DocumentChunkRecord {
    content: String,
    #[serde(default)]
    metadata: Metadata,
    source_file: String,
    #[serde(default = "new_chunk_id")]
    chunk_id: String,
    #[serde(default)]
    embedding_id: Option<i64>,
    #[serde(default = "Utc::now")]
    created_at: DateTime<Utc>,
}

fn new_chunk_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub(crate) fn preview(text: &str, max_length: usize) -> String {
    match text.char_indices().nth(max_length) {
        Some((cut, _)) => {
            let mut truncated = text.get(..cut).unwrap_or(text).to_owned();
            truncated.push_str("...");
            truncated
        },
        None => text.to_owned(),
    }
}

pub(crate) fn short_id(id: &str) -> &str {
    id.char_indices().nth(8).map_or(id, |(cut, _)| id.get(..cut).unwrap_or(id))
}
