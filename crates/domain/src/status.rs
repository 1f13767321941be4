//! System health snapshots and ingestion run summaries.

use crate::ModelError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Coarse system health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemHealth {
    /// All components nominal.
    Healthy,
    /// Serving with errors.
    Degraded,
    /// Not serving.
    Unhealthy,
    /// Not yet assessed.
    #[default]
    Unknown,
}

impl SystemHealth {
    /// Lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Degraded => "degraded",
            Self::Unhealthy => "unhealthy",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SystemHealth {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Point-in-time status of the system and its components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemStatus {
    /// Overall health.
    pub health: SystemHealth,
    /// Snapshot time (UTC).
    pub timestamp: DateTime<Utc>,
    /// Per-component status labels.
    pub components_status: BTreeMap<String, String>,
    /// Named performance metrics.
    pub performance_metrics: BTreeMap<String, f64>,
    /// Errors recorded since start.
    pub error_count: u64,
    /// Most recent error message.
    pub last_error: Option<String>,
    /// Seconds since start.
    pub uptime_seconds: f64,
}

impl Default for SystemStatus {
    fn default() -> Self {
        Self::new(SystemHealth::Unknown)
    }
}

impl SystemStatus {
    /// Fresh snapshot with the given health.
    #[must_use]
    pub fn new(health: SystemHealth) -> Self {
        Self {
            health,
            timestamp: Utc::now(),
            components_status: BTreeMap::new(),
            performance_metrics: BTreeMap::new(),
            error_count: 0,
            last_error: None,
            uptime_seconds: 0.0,
        }
    }

    /// Whether health is `Healthy`.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.health == SystemHealth::Healthy
    }

    /// Insert or replace a component status.
    pub fn set_component_status(&mut self, component: impl Into<String>, status: impl Into<String>) {
        self.components_status.insert(component.into(), status.into());
    }

    /// Insert or replace a performance metric.
    pub fn set_performance_metric(&mut self, metric: impl Into<String>, value: f64) {
        self.performance_metrics.insert(metric.into(), value);
    }

    /// Count an error; a healthy system becomes degraded.
    pub fn record_error(&mut self, message: impl Into<String>) {
        self.error_count = self.error_count.saturating_add(1);
        self.last_error = Some(message.into());
        if self.health == SystemHealth::Healthy {
            self.health = SystemHealth::Degraded;
        }
    }
}

/// Outcome of a document ingestion run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "IngestionResultsRecord")]
pub struct IngestionResults {
    total_documents: usize,
    successful_documents: usize,
    failed_documents: usize,
    total_chunks: usize,
    total_embeddings: usize,
    processing_time: f64,
    errors: Vec<String>,
    processed_files: Vec<String>,
    failed_files: Vec<String>,
}

impl IngestionResults {
    /// Start a summary for `total_documents` documents.
    pub fn new(total_documents: usize, processing_time: f64) -> Result<Self, ModelError> {
        check_processing_time(processing_time)?;
        Ok(Self {
            total_documents,
            successful_documents: 0,
            failed_documents: 0,
            total_chunks: 0,
            total_embeddings: 0,
            processing_time,
            errors: Vec::new(),
            processed_files: Vec::new(),
            failed_files: Vec::new(),
        })
    }

    /// Record a processed document and its chunk count.
    pub fn add_successful_document(&mut self, file_path: impl Into<String>, chunks: usize) {
        self.successful_documents += 1;
        self.total_chunks += chunks;
        self.processed_files.push(file_path.into());
    }

    /// Record a failed document; the error entry is `"<path>: <message>"`.
    pub fn add_failed_document(&mut self, file_path: impl Into<String>, message: &str) {
        let file_path = file_path.into();
        self.failed_documents += 1;
        self.errors.push(format!("{file_path}: {message}"));
        self.failed_files.push(file_path);
    }

    /// Add to the embedding total.
    pub fn add_embeddings(&mut self, count: usize) {
        self.total_embeddings += count;
    }

    /// Replace the processing time.
    pub fn set_processing_time(&mut self, seconds: f64) -> Result<(), ModelError> {
        check_processing_time(seconds)?;
        self.processing_time = seconds;
        Ok(())
    }

    /// Successful share of `total_documents`; `0.0` when there are none.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn success_rate(&self) -> f64 {
        if self.total_documents == 0 {
            return 0.0;
        }
        self.successful_documents as f64 / self.total_documents as f64
    }

    /// No failures and at least one success.
    #[must_use]
    pub const fn is_successful(&self) -> bool {
        self.failed_documents == 0 && self.successful_documents > 0
    }

    /// Whether any error entry was recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Documents in scope.
    #[must_use]
    pub const fn total_documents(&self) -> usize {
        self.total_documents
    }

    /// Documents processed.
    #[must_use]
    pub const fn successful_documents(&self) -> usize {
        self.successful_documents
    }

    /// Documents that failed.
    #[must_use]
    pub const fn failed_documents(&self) -> usize {
        self.failed_documents
    }

    /// Chunks produced.
    #[must_use]
    pub const fn total_chunks(&self) -> usize {
        self.total_chunks
    }

    /// Embeddings produced.
    #[must_use]
    pub const fn total_embeddings(&self) -> usize {
        self.total_embeddings
    }

    /// Seconds spent.
    #[must_use]
    pub const fn processing_time(&self) -> f64 {
        self.processing_time
    }

    /// Error entries.
    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Processed file paths.
    #[must_use]
    pub fn processed_files(&self) -> &[String] {
        &self.processed_files
    }

    /// Failed file paths.
    #[must_use]
    pub fn failed_files(&self) -> &[String] {
        &self.failed_files
    }
}

fn check_processing_time(seconds: f64) -> Result<(), ModelError> {
    if seconds.is_nan() || seconds < 0.0 {
        return Err(ModelError::NegativeProcessingTime { value: seconds });
    }
    Ok(())
}

impl fmt::Display for IngestionResults {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "IngestionResults(total={}, successful={}, failed={}, chunks={})",
            self.total_documents, self.successful_documents, self.failed_documents, self.total_chunks
        )
    }
}

impl Serialize for IngestionResults {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        IngestionResultsView {
            total_documents: self.total_documents,
            successful_documents: self.successful_documents,
            failed_documents: self.failed_documents,
            total_chunks: self.total_chunks,
            total_embeddings: self.total_embeddings,
            processing_time: self.processing_time,
            success_rate: self.success_rate(),
            errors: &self.errors,
            processed_files: &self.processed_files,
            failed_files: &self.failed_files,
        }
        .serialize(serializer)
    }
}

#[derive(Serialize)]
struct IngestionResultsView<'a> {
    total_documents: usize,
    successful_documents: usize,
    failed_documents: usize,
    total_chunks: usize,
    total_embeddings: usize,
    processing_time: f64,
    success_rate: f64,
    errors: &'a [String],
    processed_files: &'a [String],
    failed_files: &'a [String],
}

#[derive(Deserialize)]
struct IngestionResultsRecord {
    #[serde(default)]
    total_documents: usize,
    #[serde(default)]
    successful_documents: usize,
    #[serde(default)]
    failed_documents: usize,
    #[serde(default)]
    total_chunks: usize,
    #[serde(default)]
    total_embeddings: usize,
    #[serde(default)]
    processing_time: f64,
    #[serde(default)]
    errors: Vec<String>,
    #[serde(default)]
    processed_files: Vec<String>,
    #[serde(default)]
    failed_files: Vec<String>,
}

impl TryFrom<IngestionResultsRecord> for IngestionResults {
    type Error = ModelError;

    fn try_from(record: IngestionResultsRecord) -> Result<Self, Self::Error> {
        check_processing_time(record.processing_time)?;
        Ok(Self {
            total_documents: record.total_documents,
            successful_documents: record.successful_documents,
            failed_documents: record.failed_documents,
            total_chunks: record.total_chunks,
            total_embeddings: record.total_embeddings,
            processing_time: record.processing_time,
            errors: record.errors,
            processed_files: record.processed_files,
            failed_files: record.failed_files,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_ingestion() -> Result<IngestionResults, ModelError> {
        let mut results = IngestionResults::new(5, 10.5)?;
        results.add_successful_document("doc1.txt", 4);
        results.add_successful_document("doc2.txt", 3);
        results.add_successful_document("doc3.txt", 3);
        results.add_failed_document("doc4.pdf", "corrupted");
        results.add_failed_document("doc5.pdf", "too large");
        Ok(results)
    }

    #[test]
    fn status_records_errors_and_degrades() {
        let mut status = SystemStatus::new(SystemHealth::Healthy);
        assert!(status.is_healthy());
        status.record_error("Test error message");
        assert_eq!(status.error_count, 1);
        assert_eq!(status.last_error.as_deref(), Some("Test error message"));
        assert_eq!(status.health, SystemHealth::Degraded);

        let mut unhealthy = SystemStatus::new(SystemHealth::Unhealthy);
        unhealthy.record_error("again");
        assert_eq!(unhealthy.health, SystemHealth::Unhealthy);
    }

    #[test]
    fn status_serializes_lowercase_health() -> Result<(), Box<dyn std::error::Error>> {
        let mut status = SystemStatus::new(SystemHealth::Healthy);
        status.set_component_status("vector_store", "active");
        status.set_performance_metric("avg_query_time", 0.5);
        let encoded = serde_json::to_value(&status)?;
        assert_eq!(encoded["health"], json!("healthy"));
        assert_eq!(encoded["components_status"]["vector_store"], json!("active"));
        assert_eq!(SystemStatus::default().health, SystemHealth::Unknown);
        Ok(())
    }

    #[test]
    fn ingestion_counts_and_rates() -> Result<(), ModelError> {
        let results = sample_ingestion()?;
        assert_eq!(results.successful_documents(), 3);
        assert_eq!(results.failed_documents(), 2);
        assert_eq!(results.total_chunks(), 10);
        assert!(results.has_errors());
        assert!(!results.is_successful());
        assert!((results.success_rate() - 0.6).abs() < f64::EPSILON);
        assert_eq!(results.errors()[0], "doc4.pdf: corrupted");
        assert_eq!(
            results.to_string(),
            "IngestionResults(total=5, successful=3, failed=2, chunks=10)"
        );
        Ok(())
    }

    #[test]
    fn empty_ingestion_has_zero_rate() -> Result<(), ModelError> {
        let results = IngestionResults::new(0, 0.0)?;
        assert!(results.success_rate().abs() < f64::EPSILON);
        assert!(!results.is_successful());
        assert!(IngestionResults::new(1, -1.0).is_err());
        Ok(())
    }

    #[test]
    fn ingestion_serializes_success_rate() -> Result<(), Box<dyn std::error::Error>> {
        let results = sample_ingestion()?;
        let encoded = serde_json::to_value(&results)?;
        assert_eq!(encoded["success_rate"], json!(results.success_rate()));

        let decoded: IngestionResults = serde_json::from_value(encoded)?;
        assert_eq!(decoded, results);
        Ok(())
    }
}
