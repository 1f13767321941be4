//! Error taxonomy and the structured `RagError` shared across crates.
//!
//! Codes are a closed set grouped by domain prefix. The per-domain
//! constructors fix the owning component and fill one conventional detail
//! key, so callers never need a type hierarchy to classify a failure.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::{fmt, io};

/// Open key/value detail map attached to an error.
pub type ErrorDetails = BTreeMap<String, serde_json::Value>;

/// Boxed underlying cause.
pub type ErrorCause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Maximum query characters kept in error details.
pub const QUERY_DETAIL_MAX_CHARS: usize = 100;

/// Component names owned by the per-domain constructors.
pub mod component {
    /// Document ingestion and parsing.
    pub const DOCUMENT_PROCESSOR: &str = "DocumentProcessor";
    /// Embedding generation.
    pub const EMBEDDING_GENERATOR: &str = "EmbeddingGenerator";
    /// Vector index persistence and search.
    pub const VECTOR_STORE: &str = "VectorStore";
    /// Query parsing and retrieval.
    pub const QUERY_PROCESSOR: &str = "QueryProcessor";
    /// LLM-backed response generation.
    pub const RESPONSE_GENERATOR: &str = "ResponseGenerator";
    /// Configuration loading and validation.
    pub const CONFIGURATION: &str = "Configuration";
    /// System-level failures.
    pub const SYSTEM: &str = "System";
    /// Component reported for untyped errors.
    pub const UNKNOWN: &str = "Unknown";
    /// Count-key prefix for untyped errors.
    pub const GENERIC: &str = "Generic";
}

/// Domain an error code belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorDomain {
    /// Document processing.
    Document,
    /// Embedding generation.
    Embedding,
    /// Vector store.
    VectorStore,
    /// Query processing.
    Query,
    /// Response generation.
    Generation,
    /// Configuration.
    Configuration,
    /// System.
    System,
}

impl ErrorDomain {
    /// Three-letter code prefix for the domain.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Document => "DOC",
            Self::Embedding => "EMB",
            Self::VectorStore => "VEC",
            Self::Query => "QRY",
            Self::Generation => "LLM",
            Self::Configuration => "CFG",
            Self::System => "SYS",
        }
    }
}

impl fmt::Display for ErrorDomain {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Document => "document",
            Self::Embedding => "embedding",
            Self::VectorStore => "vector_store",
            Self::Query => "query",
            Self::Generation => "generation",
            Self::Configuration => "configuration",
            Self::System => "system",
        };
        formatter.write_str(label)
    }
}

/// Stable error codes. String values are external identifiers and are never
/// reused or renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorCode {
    /// `DOC_001`
    DocumentNotFound,
    /// `DOC_002`
    DocumentInvalidFormat,
    /// `DOC_003`
    DocumentCorrupted,
    /// `DOC_004`
    DocumentTooLarge,
    /// `DOC_005`
    DocumentEmpty,
    /// `EMB_001`
    EmbeddingModelNotFound,
    /// `EMB_002`
    EmbeddingApiError,
    /// `EMB_003`
    EmbeddingRateLimit,
    /// `EMB_004`
    EmbeddingDimensionMismatch,
    /// `EMB_005`
    EmbeddingGenerationFailed,
    /// `VEC_001`
    VectorStoreNotInitialized,
    /// `VEC_002`
    VectorStoreIndexCorrupted,
    /// `VEC_003`
    VectorStoreSearchFailed,
    /// `VEC_004`
    VectorStoreSaveFailed,
    /// `VEC_005`
    VectorStoreLoadFailed,
    /// `QRY_001`
    QueryEmpty,
    /// `QRY_002`
    QueryTooLong,
    /// `QRY_003`
    QueryProcessingFailed,
    /// `QRY_004`
    QueryNoResults,
    /// `LLM_001`
    LlmModelNotFound,
    /// `LLM_002`
    LlmApiError,
    /// `LLM_003`
    LlmRateLimit,
    /// `LLM_004`
    LlmContextTooLong,
    /// `LLM_005`
    LlmGenerationFailed,
    /// `CFG_001`
    ConfigInvalid,
    /// `CFG_002`
    ConfigMissingRequired,
    /// `CFG_003`
    ConfigValidationFailed,
    /// `SYS_001`
    SystemInitializationFailed,
    /// `SYS_002`
    SystemResourceExhausted,
    /// `SYS_003`
    SystemTimeout,
    /// `SYS_999`
    SystemUnknownError,
}

impl ErrorCode {
    /// Every code, in declaration order.
    pub const ALL: [Self; 31] = [
        Self::DocumentNotFound,
        Self::DocumentInvalidFormat,
        Self::DocumentCorrupted,
        Self::DocumentTooLarge,
        Self::DocumentEmpty,
        Self::EmbeddingModelNotFound,
        Self::EmbeddingApiError,
        Self::EmbeddingRateLimit,
        Self::EmbeddingDimensionMismatch,
        Self::EmbeddingGenerationFailed,
        Self::VectorStoreNotInitialized,
        Self::VectorStoreIndexCorrupted,
        Self::VectorStoreSearchFailed,
        Self::VectorStoreSaveFailed,
        Self::VectorStoreLoadFailed,
        Self::QueryEmpty,
        Self::QueryTooLong,
        Self::QueryProcessingFailed,
        Self::QueryNoResults,
        Self::LlmModelNotFound,
        Self::LlmApiError,
        Self::LlmRateLimit,
        Self::LlmContextTooLong,
        Self::LlmGenerationFailed,
        Self::ConfigInvalid,
        Self::ConfigMissingRequired,
        Self::ConfigValidationFailed,
        Self::SystemInitializationFailed,
        Self::SystemResourceExhausted,
        Self::SystemTimeout,
        Self::SystemUnknownError,
    ];

    /// Returns the stable code string (e.g. `DOC_001`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DocumentNotFound => "DOC_001",
            Self::DocumentInvalidFormat => "DOC_002",
            Self::DocumentCorrupted => "DOC_003",
            Self::DocumentTooLarge => "DOC_004",
            Self::DocumentEmpty => "DOC_005",
            Self::EmbeddingModelNotFound => "EMB_001",
            Self::EmbeddingApiError => "EMB_002",
            Self::EmbeddingRateLimit => "EMB_003",
            Self::EmbeddingDimensionMismatch => "EMB_004",
            Self::EmbeddingGenerationFailed => "EMB_005",
            Self::VectorStoreNotInitialized => "VEC_001",
            Self::VectorStoreIndexCorrupted => "VEC_002",
            Self::VectorStoreSearchFailed => "VEC_003",
            Self::VectorStoreSaveFailed => "VEC_004",
            Self::VectorStoreLoadFailed => "VEC_005",
            Self::QueryEmpty => "QRY_001",
            Self::QueryTooLong => "QRY_002",
            Self::QueryProcessingFailed => "QRY_003",
            Self::QueryNoResults => "QRY_004",
            Self::LlmModelNotFound => "LLM_001",
            Self::LlmApiError => "LLM_002",
            Self::LlmRateLimit => "LLM_003",
            Self::LlmContextTooLong => "LLM_004",
            Self::LlmGenerationFailed => "LLM_005",
            Self::ConfigInvalid => "CFG_001",
            Self::ConfigMissingRequired => "CFG_002",
            Self::ConfigValidationFailed => "CFG_003",
            Self::SystemInitializationFailed => "SYS_001",
            Self::SystemResourceExhausted => "SYS_002",
            Self::SystemTimeout => "SYS_003",
            Self::SystemUnknownError => "SYS_999",
        }
    }

    /// Parse a stable code string.
    pub fn parse(input: &str) -> Option<Self> {
        let normalized = input.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|code| code.as_str() == normalized)
    }

    /// Domain the code belongs to.
    #[must_use]
    pub const fn domain(self) -> ErrorDomain {
        match self {
            Self::DocumentNotFound
            | Self::DocumentInvalidFormat
            | Self::DocumentCorrupted
            | Self::DocumentTooLarge
            | Self::DocumentEmpty => ErrorDomain::Document,
            Self::EmbeddingModelNotFound
            | Self::EmbeddingApiError
            | Self::EmbeddingRateLimit
            | Self::EmbeddingDimensionMismatch
            | Self::EmbeddingGenerationFailed => ErrorDomain::Embedding,
            Self::VectorStoreNotInitialized
            | Self::VectorStoreIndexCorrupted
            | Self::VectorStoreSearchFailed
            | Self::VectorStoreSaveFailed
            | Self::VectorStoreLoadFailed => ErrorDomain::VectorStore,
            Self::QueryEmpty
            | Self::QueryTooLong
            | Self::QueryProcessingFailed
            | Self::QueryNoResults => ErrorDomain::Query,
            Self::LlmModelNotFound
            | Self::LlmApiError
            | Self::LlmRateLimit
            | Self::LlmContextTooLong
            | Self::LlmGenerationFailed => ErrorDomain::Generation,
            Self::ConfigInvalid | Self::ConfigMissingRequired | Self::ConfigValidationFailed => {
                ErrorDomain::Configuration
            },
            Self::SystemInitializationFailed
            | Self::SystemResourceExhausted
            | Self::SystemTimeout
            | Self::SystemUnknownError => ErrorDomain::System,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ErrorCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown error code: {raw}")))
    }
}

/// Structured error carrying a code, owning component, details, and cause.
pub struct RagError {
    message: String,
    code: ErrorCode,
    component: String,
    details: ErrorDetails,
    cause: Option<ErrorCause>,
}

impl RagError {
    /// Create an error for an arbitrary component.
    pub fn new(message: impl Into<String>, code: ErrorCode, component: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code,
            component: component.into(),
            details: ErrorDetails::new(),
            cause: None,
        }
    }

    /// Document processing failure; records `file_path` when non-empty.
    pub fn document(message: impl Into<String>, code: ErrorCode, file_path: &str) -> Self {
        Self::new(message, code, component::DOCUMENT_PROCESSOR)
            .with_non_empty_detail("file_path", file_path)
    }

    /// Embedding generation failure; records `model_name` when non-empty.
    pub fn embedding(message: impl Into<String>, code: ErrorCode, model_name: &str) -> Self {
        Self::new(message, code, component::EMBEDDING_GENERATOR)
            .with_non_empty_detail("model_name", model_name)
    }

    /// Vector store failure; records `index_type` when non-empty.
    pub fn vector_store(message: impl Into<String>, code: ErrorCode, index_type: &str) -> Self {
        Self::new(message, code, component::VECTOR_STORE)
            .with_non_empty_detail("index_type", index_type)
    }

    /// Query processing failure; records the (truncated) `query` when non-empty.
    pub fn query(message: impl Into<String>, code: ErrorCode, query: &str) -> Self {
        Self::new(message, code, component::QUERY_PROCESSOR)
            .with_non_empty_detail("query", &truncate_query(query))
    }

    /// Response generation failure; records `model_name` when non-empty.
    pub fn response(message: impl Into<String>, code: ErrorCode, model_name: &str) -> Self {
        Self::new(message, code, component::RESPONSE_GENERATOR)
            .with_non_empty_detail("model_name", model_name)
    }

    /// Configuration failure; records `config_key` when non-empty.
    pub fn configuration(message: impl Into<String>, code: ErrorCode, config_key: &str) -> Self {
        Self::new(message, code, component::CONFIGURATION)
            .with_non_empty_detail("config_key", config_key)
    }

    /// System-level failure; records `system_component` when non-empty.
    pub fn system(message: impl Into<String>, code: ErrorCode, system_component: &str) -> Self {
        Self::new(message, code, component::SYSTEM)
            .with_non_empty_detail("system_component", system_component)
    }

    /// Replace the detail map.
    #[must_use]
    pub fn with_details(mut self, details: ErrorDetails) -> Self {
        self.details = details;
        self
    }

    /// Attach a single detail entry.
    #[must_use]
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Attach the underlying cause.
    #[must_use]
    pub fn with_cause<E>(mut self, cause: E) -> Self
    where
        E: Into<ErrorCause>,
    {
        self.cause = Some(cause.into());
        self
    }

    fn with_non_empty_detail(self, key: &str, value: &str) -> Self {
        if value.is_empty() {
            self
        } else {
            self.with_detail(key, value)
        }
    }

    /// Human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Error code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    /// Owning component name.
    #[must_use]
    pub fn component(&self) -> &str {
        &self.component
    }

    /// Detail map.
    #[must_use]
    pub const fn details(&self) -> &ErrorDetails {
        &self.details
    }

    /// Underlying cause, if any.
    #[must_use]
    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// Snapshot the error as a serializable record.
    #[must_use]
    pub fn to_record(&self) -> ErrorRecord {
        ErrorRecord {
            message: self.message.clone(),
            error_code: self.code,
            component: self.component.clone(),
            details: self.details.clone(),
            cause: self.cause.as_ref().map(ToString::to_string),
        }
    }
}

impl fmt::Debug for RagError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("RagError")
            .field("message", &self.message)
            .field("code", &self.code)
            .field("component", &self.component)
            .field("details", &self.details)
            .field("cause", &self.cause.as_ref().map(ToString::to_string))
            .finish()
    }
}

impl fmt::Display for RagError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "[{}] {}: {}",
            self.code, self.component, self.message
        )
    }
}

impl std::error::Error for RagError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

impl From<io::Error> for RagError {
    fn from(error: io::Error) -> Self {
        let code = match error.kind() {
            io::ErrorKind::TimedOut => ErrorCode::SystemTimeout,
            _ => ErrorCode::SystemUnknownError,
        };
        Self::system(format!("I/O failure: {error}"), code, "io").with_cause(error)
    }
}

/// Serializable snapshot of a `RagError`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// Human-readable message.
    pub message: String,
    /// Stable code string.
    pub error_code: ErrorCode,
    /// Owning component.
    pub component: String,
    /// Detail map.
    pub details: ErrorDetails,
    /// Cause rendered with `Display`, or `null` when absent.
    pub cause: Option<String>,
}

fn truncate_query(query: &str) -> String {
    match query.char_indices().nth(QUERY_DETAIL_MAX_CHARS) {
        Some((cut, _)) => {
            let mut truncated = query.get(..cut).unwrap_or(query).to_owned();
            truncated.push_str("...");
            truncated
        },
        None => query.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::error::Error as _;

    #[test]
    fn display_matches_external_contract() {
        let error = RagError::new(
            "Test error",
            ErrorCode::DocumentNotFound,
            component::DOCUMENT_PROCESSOR,
        );
        assert_eq!(error.to_string(), "[DOC_001] DocumentProcessor: Test error");
    }

    #[test]
    fn base_error_starts_without_details_or_cause() {
        let error = RagError::new("boom", ErrorCode::SystemUnknownError, "TestComponent");
        assert_eq!(error.message(), "boom");
        assert_eq!(error.code(), ErrorCode::SystemUnknownError);
        assert_eq!(error.component(), "TestComponent");
        assert!(error.details().is_empty());
        assert!(error.cause().is_none());
        assert!(error.source().is_none());
    }

    #[test]
    fn record_renders_cause_or_null() -> Result<(), Box<dyn std::error::Error>> {
        let error = RagError::new("Test error", ErrorCode::ConfigInvalid, component::CONFIGURATION)
            .with_detail("key", "value");
        let record = error.to_record();
        assert_eq!(record.error_code, ErrorCode::ConfigInvalid);
        assert_eq!(record.details.get("key"), Some(&json!("value")));
        assert_eq!(record.cause, None);

        let encoded = serde_json::to_value(&record)?;
        assert_eq!(encoded["error_code"], json!("CFG_001"));
        assert_eq!(encoded["cause"], serde_json::Value::Null);

        let wrapped = RagError::new("Wrapped", ErrorCode::SystemUnknownError, "Test")
            .with_cause(io::Error::other("Original error"));
        assert_eq!(wrapped.to_record().cause.as_deref(), Some("Original error"));
        assert!(wrapped.source().is_some());
        Ok(())
    }

    #[test]
    fn record_is_deterministic() {
        let error = RagError::document("bad", ErrorCode::DocumentCorrupted, "a.pdf")
            .with_detail("line_number", 42);
        assert_eq!(error.to_record(), error.to_record());
    }

    #[test]
    fn domain_constructors_fix_component_and_detail_key() {
        let cases = [
            (
                RagError::document("m", ErrorCode::DocumentNotFound, "missing.txt"),
                component::DOCUMENT_PROCESSOR,
                "file_path",
                "missing.txt",
            ),
            (
                RagError::embedding("m", ErrorCode::EmbeddingModelNotFound, "invalid-model"),
                component::EMBEDDING_GENERATOR,
                "model_name",
                "invalid-model",
            ),
            (
                RagError::vector_store("m", ErrorCode::VectorStoreIndexCorrupted, "faiss"),
                component::VECTOR_STORE,
                "index_type",
                "faiss",
            ),
            (
                RagError::response("m", ErrorCode::LlmApiError, "gpt-3.5-turbo"),
                component::RESPONSE_GENERATOR,
                "model_name",
                "gpt-3.5-turbo",
            ),
            (
                RagError::configuration("m", ErrorCode::ConfigInvalid, "embedding_model"),
                component::CONFIGURATION,
                "config_key",
                "embedding_model",
            ),
            (
                RagError::system("m", ErrorCode::SystemResourceExhausted, "memory"),
                component::SYSTEM,
                "system_component",
                "memory",
            ),
        ];

        for (error, expected_component, key, value) in cases {
            assert_eq!(error.component(), expected_component);
            assert_eq!(error.details().get(key), Some(&json!(value)));
        }
    }

    #[test]
    fn empty_detail_argument_is_not_recorded() {
        let error = RagError::document("Error", ErrorCode::DocumentNotFound, "");
        assert!(error.details().is_empty());
    }

    #[test]
    fn query_detail_is_truncated() {
        let long_query = "very long query text".repeat(100);
        let error = RagError::query("Query too long", ErrorCode::QueryTooLong, &long_query);
        let stored = error
            .details()
            .get("query")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default();
        assert_eq!(stored.chars().count(), 103);
        assert!(stored.ends_with("..."));

        let exact = "q".repeat(100);
        let error = RagError::query("m", ErrorCode::QueryEmpty, &exact);
        assert_eq!(error.details().get("query"), Some(&json!(exact)));
    }

    #[test]
    fn codes_parse_back_and_carry_domain_prefix() {
        for code in ErrorCode::ALL {
            assert_eq!(ErrorCode::parse(code.as_str()), Some(code));
            assert!(code.as_str().starts_with(code.domain().prefix()));
        }
        assert_eq!(ErrorCode::parse("XYZ_001"), None);
    }

    #[test]
    fn codes_are_unique() {
        let mut seen = std::collections::BTreeSet::new();
        for code in ErrorCode::ALL {
            assert!(seen.insert(code.as_str()), "duplicate code {code}");
        }
    }

    #[test]
    fn io_errors_map_to_system_codes() {
        let timeout: RagError = io::Error::new(io::ErrorKind::TimedOut, "slow").into();
        assert_eq!(timeout.code(), ErrorCode::SystemTimeout);
        assert_eq!(timeout.component(), component::SYSTEM);

        let other: RagError = io::Error::other("disk").into();
        assert_eq!(other.code(), ErrorCode::SystemUnknownError);
        assert!(other.cause().is_some());
    }
}
