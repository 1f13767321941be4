//! Records exchanged between retrieval and generation collaborators.

use crate::chunk::Metadata;
use crate::{DocumentChunk, ModelError};
use serde::{Deserialize, Serialize};

/// Raw nearest-neighbour output: parallel index/distance/metadata lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SearchResultsRecord")]
pub struct SearchResults {
    indices: Vec<i64>,
    distances: Vec<f64>,
    metadata: Vec<Metadata>,
}

impl SearchResults {
    /// Build results; the three lists must have equal length.
    pub fn new(
        indices: Vec<i64>,
        distances: Vec<f64>,
        metadata: Vec<Metadata>,
    ) -> Result<Self, ModelError> {
        if indices.len() != distances.len() || indices.len() != metadata.len() {
            return Err(ModelError::SearchLengthMismatch {
                indices: indices.len(),
                distances: distances.len(),
                metadata: metadata.len(),
            });
        }
        Ok(Self {
            indices,
            distances,
            metadata,
        })
    }

    /// Empty result set.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            indices: Vec::new(),
            distances: Vec::new(),
            metadata: Vec::new(),
        }
    }

    /// Index positions.
    #[must_use]
    pub fn indices(&self) -> &[i64] {
        &self.indices
    }

    /// Distances aligned with `indices`.
    #[must_use]
    pub fn distances(&self) -> &[f64] {
        &self.distances
    }

    /// Metadata aligned with `indices`.
    #[must_use]
    pub fn metadata(&self) -> &[Metadata] {
        &self.metadata
    }

    /// Number of hits.
    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether there are no hits.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// The first `k` hits of each list.
    #[must_use]
    pub fn top_k(&self, k: usize) -> Self {
        let take = k.min(self.len());
        Self {
            indices: self.indices.iter().take(take).copied().collect(),
            distances: self.distances.iter().take(take).copied().collect(),
            metadata: self.metadata.iter().take(take).cloned().collect(),
        }
    }
}

impl TryFrom<SearchResultsRecord> for SearchResults {
    type Error = ModelError;

    fn try_from(record: SearchResultsRecord) -> Result<Self, Self::Error> {
        Self::new(record.indices, record.distances, record.metadata)
    }
}

#[derive(Deserialize)]
struct SearchResultsRecord {
    indices: Vec<i64>,
    distances: Vec<f64>,
    metadata: Vec<Metadata>,
}

/// Chunks retrieved for a query along with relevance scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "QueryResultsRecord")]
pub struct QueryResults {
    query: String,
    retrieved_chunks: Vec<DocumentChunk>,
    relevance_scores: Vec<f64>,
    total_results: usize,
}

impl QueryResults {
    /// Build results; one relevance score per retrieved chunk.
    pub fn new(
        query: impl Into<String>,
        retrieved_chunks: Vec<DocumentChunk>,
        relevance_scores: Vec<f64>,
        total_results: usize,
    ) -> Result<Self, ModelError> {
        if retrieved_chunks.len() != relevance_scores.len() {
            return Err(ModelError::ScoreCountMismatch {
                chunks: retrieved_chunks.len(),
                scores: relevance_scores.len(),
            });
        }
        Ok(Self {
            query: query.into(),
            retrieved_chunks,
            relevance_scores,
            total_results,
        })
    }

    /// Query text.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Retrieved chunks, best first.
    #[must_use]
    pub fn retrieved_chunks(&self) -> &[DocumentChunk] {
        &self.retrieved_chunks
    }

    /// Scores aligned with `retrieved_chunks`.
    #[must_use]
    pub fn relevance_scores(&self) -> &[f64] {
        &self.relevance_scores
    }

    /// Total hits before truncation.
    #[must_use]
    pub const fn total_results(&self) -> usize {
        self.total_results
    }
}

impl TryFrom<QueryResultsRecord> for QueryResults {
    type Error = ModelError;

    fn try_from(record: QueryResultsRecord) -> Result<Self, Self::Error> {
        Self::new(
            record.query,
            record.retrieved_chunks,
            record.relevance_scores,
            record.total_results,
        )
    }
}

#[derive(Deserialize)]
struct QueryResultsRecord {
    query: String,
    retrieved_chunks: Vec<DocumentChunk>,
    relevance_scores: Vec<f64>,
    total_results: usize,
}

/// Context assembled from retrieved chunks for the generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedContext {
    /// Prompt-ready context text.
    pub formatted_context: String,
    /// Chunks the context was built from.
    pub source_chunks: Vec<DocumentChunk>,
    /// Token estimate for `formatted_context`.
    pub total_tokens: usize,
    /// Distinct source files.
    pub sources: Vec<String>,
}

/// LLM answer with provenance and timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GeneratedResponseRecord")]
pub struct GeneratedResponse {
    response_text: String,
    sources: Vec<String>,
    confidence_score: f64,
    context_used: bool,
    token_count: usize,
    model_used: String,
    generation_time: f64,
}

/// Unvalidated fields of a [`GeneratedResponse`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeneratedResponseRecord {
    /// Answer text.
    pub response_text: String,
    /// Source files cited.
    pub sources: Vec<String>,
    /// Confidence in `[0.0, 1.0]`.
    pub confidence_score: f64,
    /// Whether retrieved context was used.
    pub context_used: bool,
    /// Tokens generated.
    pub token_count: usize,
    /// Model identifier.
    pub model_used: String,
    /// Seconds spent generating.
    pub generation_time: f64,
}

impl TryFrom<GeneratedResponseRecord> for GeneratedResponse {
    type Error = ModelError;

    fn try_from(record: GeneratedResponseRecord) -> Result<Self, Self::Error> {
        if !(0.0..=1.0).contains(&record.confidence_score) {
            return Err(ModelError::ConfidenceOutOfRange {
                value: record.confidence_score,
            });
        }
        if record.generation_time.is_nan() || record.generation_time < 0.0 {
            return Err(ModelError::NegativeGenerationTime {
                value: record.generation_time,
            });
        }
        Ok(Self {
            response_text: record.response_text,
            sources: record.sources,
            confidence_score: record.confidence_score,
            context_used: record.context_used,
            token_count: record.token_count,
            model_used: record.model_used,
            generation_time: record.generation_time,
        })
    }
}

impl GeneratedResponse {
    /// Answer text.
    #[must_use]
    pub fn response_text(&self) -> &str {
        &self.response_text
    }

    /// Source files cited.
    #[must_use]
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Confidence in `[0.0, 1.0]`.
    #[must_use]
    pub const fn confidence_score(&self) -> f64 {
        self.confidence_score
    }

    /// Whether retrieved context was used.
    #[must_use]
    pub const fn context_used(&self) -> bool {
        self.context_used
    }

    /// Tokens generated.
    #[must_use]
    pub const fn token_count(&self) -> usize {
        self.token_count
    }

    /// Model identifier.
    #[must_use]
    pub fn model_used(&self) -> &str {
        &self.model_used
    }

    /// Seconds spent generating.
    #[must_use]
    pub const fn generation_time(&self) -> f64 {
        self.generation_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hit(chunk_id: &str, source: &str) -> Metadata {
        let mut metadata = Metadata::new();
        metadata.insert("chunk_id".to_owned(), json!(chunk_id));
        metadata.insert("source".to_owned(), json!(source));
        metadata
    }

    fn sample_results() -> Result<SearchResults, ModelError> {
        SearchResults::new(
            vec![0, 1, 2],
            vec![0.1, 0.3, 0.5],
            vec![
                hit("chunk-001", "doc1.txt"),
                hit("chunk-002", "doc2.txt"),
                hit("chunk-003", "doc1.txt"),
            ],
        )
    }

    #[test]
    fn search_results_have_aligned_lists() -> Result<(), ModelError> {
        let results = sample_results()?;
        assert_eq!(results.len(), 3);
        assert!(!results.is_empty());
        assert!(SearchResults::empty().is_empty());
        Ok(())
    }

    #[test]
    fn search_results_reject_mismatched_lengths() {
        let error = SearchResults::new(vec![1, 2], vec![0.1], vec![Metadata::new()]).err();
        assert!(matches!(
            error,
            Some(ModelError::SearchLengthMismatch { indices: 2, .. })
        ));
    }

    #[test]
    fn top_k_takes_prefix() -> Result<(), ModelError> {
        let results = sample_results()?;
        let top = results.top_k(2);
        assert_eq!(top.len(), 2);
        assert_eq!(top.indices(), &results.indices()[..2]);
        assert_eq!(top.distances(), &results.distances()[..2]);
        assert_eq!(results.top_k(10).len(), 3);
        Ok(())
    }

    #[test]
    fn query_results_require_one_score_per_chunk() -> Result<(), ModelError> {
        let chunks = vec![
            DocumentChunk::new("first", "doc1.txt")?,
            DocumentChunk::new("second", "doc2.txt")?,
        ];
        let ok = QueryResults::new("test query", chunks.clone(), vec![0.9, 0.7], 2)?;
        assert_eq!(ok.retrieved_chunks().len(), 2);
        assert_eq!(ok.total_results(), 2);

        let error = QueryResults::new("test query", chunks, vec![0.9], 2).err();
        assert_eq!(
            error,
            Some(ModelError::ScoreCountMismatch {
                chunks: 2,
                scores: 1
            })
        );
        Ok(())
    }

    #[test]
    fn generated_response_validates_ranges() -> Result<(), Box<dyn std::error::Error>> {
        let response: GeneratedResponse = serde_json::from_value(json!({
            "response_text": "answer",
            "sources": ["doc1.txt", "doc2.txt"],
            "confidence_score": 0.85,
            "context_used": true,
            "token_count": 25,
            "model_used": "gpt-3.5-turbo",
            "generation_time": 1.5
        }))?;
        assert!((response.confidence_score() - 0.85).abs() < f64::EPSILON);

        let record = GeneratedResponseRecord {
            response_text: "answer".to_owned(),
            sources: Vec::new(),
            confidence_score: 1.2,
            context_used: false,
            token_count: 0,
            model_used: "m".to_owned(),
            generation_time: 0.0,
        };
        assert!(matches!(
            GeneratedResponse::try_from(record),
            Err(ModelError::ConfidenceOutOfRange { .. })
        ));
        Ok(())
    }

    #[test]
    fn retrieved_context_round_trips() -> Result<(), Box<dyn std::error::Error>> {
        let context = RetrievedContext {
            formatted_context: "Context: First chunk...".to_owned(),
            source_chunks: vec![DocumentChunk::new("First chunk", "doc1.txt")?],
            total_tokens: 150,
            sources: vec!["doc1.txt".to_owned()],
        };
        let decoded: RetrievedContext = serde_json::from_str(&serde_json::to_string(&context)?)?;
        assert_eq!(decoded, context);
        Ok(())
    }
}
