//! RAG configuration schema, defaults, and aggregate validation.
//!
//! - Deserialization uses `serde` with unknown keys rejected.
//! - Validation checks every rule and reports all violations at once.
//! - `ValidatedRagConfig` is the only form handed to callers; updates
//!   produce a new validated value.

use rag_twin_shared::{ErrorCode, RagError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Providers accepted for both the embedding and the LLM backend.
pub const VALID_PROVIDERS: [&str; 2] = ["openai", "huggingface"];

const SIMILARITY_THRESHOLD_MIN: f64 = 0.0;
const SIMILARITY_THRESHOLD_MAX: f64 = 1.0;
const TEMPERATURE_MIN: f64 = 0.0;
const TEMPERATURE_MAX: f64 = 2.0;

/// Value type of a configuration field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// String value.
    Text,
    /// Signed integer value.
    Integer,
    /// Floating point value.
    Float,
}

/// Every configuration field with its value type, in declaration order.
pub const CONFIG_FIELDS: [(&str, FieldKind); 17] = [
    ("embedding_provider", FieldKind::Text),
    ("embedding_model", FieldKind::Text),
    ("llm_provider", FieldKind::Text),
    ("llm_model", FieldKind::Text),
    ("chunk_size", FieldKind::Integer),
    ("chunk_overlap", FieldKind::Integer),
    ("max_context_length", FieldKind::Integer),
    ("top_k_results", FieldKind::Integer),
    ("similarity_threshold", FieldKind::Float),
    ("max_response_tokens", FieldKind::Integer),
    ("temperature", FieldKind::Float),
    ("batch_size", FieldKind::Integer),
    ("max_retries", FieldKind::Integer),
    ("timeout_seconds", FieldKind::Integer),
    ("data_directory", FieldKind::Text),
    ("embeddings_directory", FieldKind::Text),
    ("logs_directory", FieldKind::Text),
];

/// Look up the value type of a field name.
#[must_use]
pub fn field_kind(name: &str) -> Option<FieldKind> {
    CONFIG_FIELDS
        .iter()
        .find(|(field, _)| *field == name)
        .map(|(_, kind)| *kind)
}

/// Flat configuration record.
///
/// Integer fields are signed so that negative inputs reach validation and
/// are reported alongside every other violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct RagConfig {
    /// Embedding backend (`openai` or `huggingface`).
    pub embedding_provider: String,
    /// Embedding model identifier.
    pub embedding_model: String,
    /// LLM backend (`openai` or `huggingface`).
    pub llm_provider: String,
    /// LLM model identifier.
    pub llm_model: String,
    /// Characters per chunk.
    pub chunk_size: i64,
    /// Characters shared between consecutive chunks.
    pub chunk_overlap: i64,
    /// Maximum context characters passed to the LLM.
    pub max_context_length: i64,
    /// Number of chunks retrieved per query.
    pub top_k_results: i64,
    /// Minimum similarity for a hit, in `[0.0, 1.0]`.
    pub similarity_threshold: f64,
    /// Maximum generated tokens.
    pub max_response_tokens: i64,
    /// Sampling temperature, in `[0.0, 2.0]`.
    pub temperature: f64,
    /// Items per embedding batch.
    pub batch_size: i64,
    /// Retries for transient failures.
    pub max_retries: i64,
    /// Per-request timeout.
    pub timeout_seconds: i64,
    /// Source documents directory.
    pub data_directory: String,
    /// Persisted embeddings directory.
    pub embeddings_directory: String,
    /// Log file directory.
    pub logs_directory: String,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            embedding_provider: "openai".to_owned(),
            embedding_model: "text-embedding-ada-002".to_owned(),
            llm_provider: "openai".to_owned(),
            llm_model: "gpt-3.5-turbo".to_owned(),
            chunk_size: 1000,
            chunk_overlap: 200,
            max_context_length: 4000,
            top_k_results: 5,
            similarity_threshold: 0.7,
            max_response_tokens: 500,
            temperature: 0.1,
            batch_size: 10,
            max_retries: 3,
            timeout_seconds: 30,
            data_directory: "data".to_owned(),
            embeddings_directory: "embeddings".to_owned(),
            logs_directory: "logs".to_owned(),
        }
    }
}

impl RagConfig {
    /// Check every rule, collecting all violations.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let mut violations = Vec::new();

        if !VALID_PROVIDERS.contains(&self.embedding_provider.as_str()) {
            violations.push(ConfigViolation::InvalidEmbeddingProvider {
                provider: self.embedding_provider.clone(),
            });
        }
        if !VALID_PROVIDERS.contains(&self.llm_provider.as_str()) {
            violations.push(ConfigViolation::InvalidLlmProvider {
                provider: self.llm_provider.clone(),
            });
        }

        if self.chunk_size <= 0 {
            violations.push(ConfigViolation::ChunkSizeNotPositive {
                value: self.chunk_size,
            });
        }
        if self.chunk_overlap < 0 {
            violations.push(ConfigViolation::ChunkOverlapNegative {
                value: self.chunk_overlap,
            });
        }
        if self.chunk_overlap >= self.chunk_size {
            violations.push(ConfigViolation::ChunkOverlapTooLarge {
                overlap: self.chunk_overlap,
                size: self.chunk_size,
            });
        }
        if self.max_context_length <= 0 {
            violations.push(ConfigViolation::MaxContextLengthNotPositive {
                value: self.max_context_length,
            });
        }
        if self.top_k_results <= 0 {
            violations.push(ConfigViolation::TopKNotPositive {
                value: self.top_k_results,
            });
        }
        if !(SIMILARITY_THRESHOLD_MIN..=SIMILARITY_THRESHOLD_MAX)
            .contains(&self.similarity_threshold)
        {
            violations.push(ConfigViolation::SimilarityThresholdOutOfRange {
                value: self.similarity_threshold,
            });
        }
        if self.max_response_tokens <= 0 {
            violations.push(ConfigViolation::MaxResponseTokensNotPositive {
                value: self.max_response_tokens,
            });
        }
        if !(TEMPERATURE_MIN..=TEMPERATURE_MAX).contains(&self.temperature) {
            violations.push(ConfigViolation::TemperatureOutOfRange {
                value: self.temperature,
            });
        }
        if self.batch_size <= 0 {
            violations.push(ConfigViolation::BatchSizeNotPositive {
                value: self.batch_size,
            });
        }
        if self.max_retries < 0 {
            violations.push(ConfigViolation::MaxRetriesNegative {
                value: self.max_retries,
            });
        }
        if self.timeout_seconds <= 0 {
            violations.push(ConfigViolation::TimeoutNotPositive {
                value: self.timeout_seconds,
            });
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ConfigValidationError { violations })
        }
    }

    /// Validate and wrap.
    pub fn into_validated(self) -> Result<ValidatedRagConfig, ConfigValidationError> {
        ValidatedRagConfig::new(self)
    }
}

impl fmt::Display for RagConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "RagConfig(embedding={}/{}, llm={}/{})",
            self.embedding_provider, self.embedding_model, self.llm_provider, self.llm_model
        )
    }
}

/// Validate a config, surfacing violations as a `CFG_003` error.
pub fn validate_config(config: &RagConfig) -> Result<()> {
    config.validate().map_err(RagError::from)
}

/// Validated config wrapper. Read access goes through `Deref`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidatedRagConfig {
    #[serde(deserialize_with = "deserialize_validated")]
    raw: RagConfig,
}

fn deserialize_validated<'de, D>(deserializer: D) -> Result<RagConfig, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = RagConfig::deserialize(deserializer)?;
    raw.validate().map_err(serde::de::Error::custom)?;
    Ok(raw)
}

impl ValidatedRagConfig {
    /// Validate at construction.
    pub fn new(raw: RagConfig) -> Result<Self, ConfigValidationError> {
        raw.validate()?;
        Ok(Self { raw })
    }

    /// Default configuration (always valid).
    #[must_use]
    pub fn defaults() -> Self {
        Self {
            raw: RagConfig::default(),
        }
    }

    /// Return a new validated config with `update` applied; `self` is untouched.
    pub fn update(&self, update: ConfigUpdate) -> Result<Self, ConfigValidationError> {
        Self::new(update.apply(self.raw.clone()))
    }

    /// Flat mapping of all seventeen fields under their stable names.
    #[must_use]
    pub fn to_map(&self) -> serde_json::Map<String, serde_json::Value> {
        let raw = &self.raw;
        let mut map = serde_json::Map::new();
        map.insert("embedding_provider".into(), raw.embedding_provider.clone().into());
        map.insert("embedding_model".into(), raw.embedding_model.clone().into());
        map.insert("llm_provider".into(), raw.llm_provider.clone().into());
        map.insert("llm_model".into(), raw.llm_model.clone().into());
        map.insert("chunk_size".into(), raw.chunk_size.into());
        map.insert("chunk_overlap".into(), raw.chunk_overlap.into());
        map.insert("max_context_length".into(), raw.max_context_length.into());
        map.insert("top_k_results".into(), raw.top_k_results.into());
        map.insert("similarity_threshold".into(), raw.similarity_threshold.into());
        map.insert("max_response_tokens".into(), raw.max_response_tokens.into());
        map.insert("temperature".into(), raw.temperature.into());
        map.insert("batch_size".into(), raw.batch_size.into());
        map.insert("max_retries".into(), raw.max_retries.into());
        map.insert("timeout_seconds".into(), raw.timeout_seconds.into());
        map.insert("data_directory".into(), raw.data_directory.clone().into());
        map.insert("embeddings_directory".into(), raw.embeddings_directory.clone().into());
        map.insert("logs_directory".into(), raw.logs_directory.clone().into());
        map
    }

    /// Build from a flat mapping. Missing keys take defaults; unknown keys and
    /// mistyped values are `CFG_001`, rule violations `CFG_003`.
    pub fn from_map(map: serde_json::Map<String, serde_json::Value>) -> Result<Self> {
        let raw: RagConfig =
            serde_json::from_value(serde_json::Value::Object(map)).map_err(|error| {
                RagError::configuration(
                    format!("Invalid configuration value: {error}"),
                    ErrorCode::ConfigInvalid,
                    "",
                )
                .with_cause(error)
            })?;
        Self::new(raw).map_err(RagError::from)
    }

    /// Borrow the raw config.
    #[must_use]
    pub const fn as_ref(&self) -> &RagConfig {
        &self.raw
    }

    /// Consume the wrapper and return the raw config.
    #[must_use]
    pub fn into_inner(self) -> RagConfig {
        self.raw
    }
}

impl AsRef<RagConfig> for ValidatedRagConfig {
    fn as_ref(&self) -> &RagConfig {
        &self.raw
    }
}

impl std::ops::Deref for ValidatedRagConfig {
    type Target = RagConfig;

    fn deref(&self) -> &Self::Target {
        &self.raw
    }
}

impl fmt::Display for ValidatedRagConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.raw, formatter)
    }
}

impl TryFrom<RagConfig> for ValidatedRagConfig {
    type Error = ConfigValidationError;

    fn try_from(raw: RagConfig) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

/// Partial replacement of configuration fields.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ConfigUpdate {
    /// New embedding provider.
    pub embedding_provider: Option<String>,
    /// New embedding model.
    pub embedding_model: Option<String>,
    /// New LLM provider.
    pub llm_provider: Option<String>,
    /// New LLM model.
    pub llm_model: Option<String>,
    /// New chunk size.
    pub chunk_size: Option<i64>,
    /// New chunk overlap.
    pub chunk_overlap: Option<i64>,
    /// New max context length.
    pub max_context_length: Option<i64>,
    /// New top-k.
    pub top_k_results: Option<i64>,
    /// New similarity threshold.
    pub similarity_threshold: Option<f64>,
    /// New max response tokens.
    pub max_response_tokens: Option<i64>,
    /// New temperature.
    pub temperature: Option<f64>,
    /// New batch size.
    pub batch_size: Option<i64>,
    /// New retry count.
    pub max_retries: Option<i64>,
    /// New timeout.
    pub timeout_seconds: Option<i64>,
    /// New data directory.
    pub data_directory: Option<String>,
    /// New embeddings directory.
    pub embeddings_directory: Option<String>,
    /// New logs directory.
    pub logs_directory: Option<String>,
}

impl ConfigUpdate {
    /// Overlay the set fields onto `config`.
    #[must_use]
    pub fn apply(self, mut config: RagConfig) -> RagConfig {
        if let Some(value) = self.embedding_provider {
            config.embedding_provider = value;
        }
        if let Some(value) = self.embedding_model {
            config.embedding_model = value;
        }
        if let Some(value) = self.llm_provider {
            config.llm_provider = value;
        }
        if let Some(value) = self.llm_model {
            config.llm_model = value;
        }
        if let Some(value) = self.chunk_size {
            config.chunk_size = value;
        }
        if let Some(value) = self.chunk_overlap {
            config.chunk_overlap = value;
        }
        if let Some(value) = self.max_context_length {
            config.max_context_length = value;
        }
        if let Some(value) = self.top_k_results {
            config.top_k_results = value;
        }
        if let Some(value) = self.similarity_threshold {
            config.similarity_threshold = value;
        }
        if let Some(value) = self.max_response_tokens {
            config.max_response_tokens = value;
        }
        if let Some(value) = self.temperature {
            config.temperature = value;
        }
        if let Some(value) = self.batch_size {
            config.batch_size = value;
        }
        if let Some(value) = self.max_retries {
            config.max_retries = value;
        }
        if let Some(value) = self.timeout_seconds {
            config.timeout_seconds = value;
        }
        if let Some(value) = self.data_directory {
            config.data_directory = value;
        }
        if let Some(value) = self.embeddings_directory {
            config.embeddings_directory = value;
        }
        if let Some(value) = self.logs_directory {
            config.logs_directory = value;
        }
        config
    }
}

/// A single broken configuration rule.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigViolation {
    /// Embedding provider not in [`VALID_PROVIDERS`].
    InvalidEmbeddingProvider {
        /// Provider given.
        provider: String,
    },
    /// LLM provider not in [`VALID_PROVIDERS`].
    InvalidLlmProvider {
        /// Provider given.
        provider: String,
    },
    /// `chunk_size <= 0`.
    ChunkSizeNotPositive {
        /// Value given.
        value: i64,
    },
    /// `chunk_overlap < 0`.
    ChunkOverlapNegative {
        /// Value given.
        value: i64,
    },
    /// `chunk_overlap >= chunk_size`.
    ChunkOverlapTooLarge {
        /// Overlap given.
        overlap: i64,
        /// Chunk size given.
        size: i64,
    },
    /// `max_context_length <= 0`.
    MaxContextLengthNotPositive {
        /// Value given.
        value: i64,
    },
    /// `top_k_results <= 0`.
    TopKNotPositive {
        /// Value given.
        value: i64,
    },
    /// `similarity_threshold` outside `[0.0, 1.0]`.
    SimilarityThresholdOutOfRange {
        /// Value given.
        value: f64,
    },
    /// `max_response_tokens <= 0`.
    MaxResponseTokensNotPositive {
        /// Value given.
        value: i64,
    },
    /// `temperature` outside `[0.0, 2.0]`.
    TemperatureOutOfRange {
        /// Value given.
        value: f64,
    },
    /// `batch_size <= 0`.
    BatchSizeNotPositive {
        /// Value given.
        value: i64,
    },
    /// `max_retries < 0`.
    MaxRetriesNegative {
        /// Value given.
        value: i64,
    },
    /// `timeout_seconds <= 0`.
    TimeoutNotPositive {
        /// Value given.
        value: i64,
    },
}

impl ConfigViolation {
    /// Field the rule applies to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::InvalidEmbeddingProvider { .. } => "embedding_provider",
            Self::InvalidLlmProvider { .. } => "llm_provider",
            Self::ChunkSizeNotPositive { .. } => "chunk_size",
            Self::ChunkOverlapNegative { .. } | Self::ChunkOverlapTooLarge { .. } => {
                "chunk_overlap"
            },
            Self::MaxContextLengthNotPositive { .. } => "max_context_length",
            Self::TopKNotPositive { .. } => "top_k_results",
            Self::SimilarityThresholdOutOfRange { .. } => "similarity_threshold",
            Self::MaxResponseTokensNotPositive { .. } => "max_response_tokens",
            Self::TemperatureOutOfRange { .. } => "temperature",
            Self::BatchSizeNotPositive { .. } => "batch_size",
            Self::MaxRetriesNegative { .. } => "max_retries",
            Self::TimeoutNotPositive { .. } => "timeout_seconds",
        }
    }
}

impl fmt::Display for ConfigViolation {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEmbeddingProvider { provider } => {
                write!(formatter, "Invalid embedding provider: {provider}")
            },
            Self::InvalidLlmProvider { provider } => {
                write!(formatter, "Invalid LLM provider: {provider}")
            },
            Self::ChunkSizeNotPositive { .. } => formatter.write_str("Chunk size must be positive"),
            Self::ChunkOverlapNegative { .. } => {
                formatter.write_str("Chunk overlap cannot be negative")
            },
            Self::ChunkOverlapTooLarge { .. } => {
                formatter.write_str("Chunk overlap must be less than chunk size")
            },
            Self::MaxContextLengthNotPositive { .. } => {
                formatter.write_str("Max context length must be positive")
            },
            Self::TopKNotPositive { .. } => formatter.write_str("Top-k results must be positive"),
            Self::SimilarityThresholdOutOfRange { .. } => {
                formatter.write_str("Similarity threshold must be between 0.0 and 1.0")
            },
            Self::MaxResponseTokensNotPositive { .. } => {
                formatter.write_str("Max response tokens must be positive")
            },
            Self::TemperatureOutOfRange { .. } => {
                formatter.write_str("Temperature must be between 0.0 and 2.0")
            },
            Self::BatchSizeNotPositive { .. } => formatter.write_str("Batch size must be positive"),
            Self::MaxRetriesNegative { .. } => formatter.write_str("Max retries cannot be negative"),
            Self::TimeoutNotPositive { .. } => {
                formatter.write_str("Timeout seconds must be positive")
            },
        }
    }
}

/// Aggregate validation failure listing every violated rule.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValidationError {
    /// Violations in rule order. Never empty.
    pub violations: Vec<ConfigViolation>,
}

impl ConfigValidationError {
    /// Violated field names, in rule order.
    #[must_use]
    pub fn fields(&self) -> Vec<&'static str> {
        self.violations.iter().map(ConfigViolation::field).collect()
    }
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("Configuration validation failed: ")?;
        for (index, violation) in self.violations.iter().enumerate() {
            if index > 0 {
                formatter.write_str("; ")?;
            }
            write!(formatter, "{violation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigValidationError {}

impl From<ConfigValidationError> for RagError {
    fn from(error: ConfigValidationError) -> Self {
        let violations: Vec<serde_json::Value> = error
            .violations
            .iter()
            .map(|violation| violation.to_string().into())
            .collect();
        let fields: Vec<serde_json::Value> =
            error.fields().into_iter().map(Into::into).collect();
        Self::configuration(error.to_string(), ErrorCode::ConfigValidationFailed, "")
            .with_detail("violations", violations)
            .with_detail("fields", fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rag_twin_shared::component;
    use serde_json::json;

    #[test]
    fn defaults_are_valid() {
        let config = RagConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.chunk_size, 1000);
        assert_eq!(config.chunk_overlap, 200);
        assert_eq!(
            config.to_string(),
            "RagConfig(embedding=openai/text-embedding-ada-002, llm=openai/gpt-3.5-turbo)"
        );
    }

    #[test]
    fn validation_reports_every_violation() {
        let config = RagConfig {
            embedding_provider: "invalid_provider".to_owned(),
            chunk_size: -1,
            similarity_threshold: 1.5,
            max_retries: -2,
            ..RagConfig::default()
        };
        let error = config.validate().err();
        let fields = error.as_ref().map(ConfigValidationError::fields);
        assert_eq!(
            fields,
            Some(vec![
                "embedding_provider",
                "chunk_size",
                "chunk_overlap",
                "similarity_threshold",
                "max_retries",
            ])
        );

        let message = error.map(|error| error.to_string()).unwrap_or_default();
        assert!(message.starts_with("Configuration validation failed: "));
        assert!(message.contains("Invalid embedding provider: invalid_provider"));
        assert!(message.contains("; Chunk size must be positive"));
    }

    #[test]
    fn overlap_equal_to_size_is_rejected() {
        let config = RagConfig {
            chunk_size: 100,
            chunk_overlap: 100,
            ..RagConfig::default()
        };
        let error = config.validate().err();
        assert!(matches!(
            error.as_ref().map(|error| error.violations.as_slice()),
            Some([ConfigViolation::ChunkOverlapTooLarge { .. }])
        ));
    }

    #[test]
    fn nan_values_fail_range_checks() {
        let config = RagConfig {
            similarity_threshold: f64::NAN,
            temperature: f64::NAN,
            ..RagConfig::default()
        };
        let fields = config.validate().err().map(|error| error.fields());
        assert_eq!(fields, Some(vec!["similarity_threshold", "temperature"]));
    }

    #[test]
    fn validation_error_converts_to_cfg_003() {
        let config = RagConfig {
            llm_provider: "local".to_owned(),
            ..RagConfig::default()
        };
        let result = validate_config(&config);
        assert!(result.is_err());
        if let Err(error) = result {
            assert_eq!(error.code(), ErrorCode::ConfigValidationFailed);
            assert_eq!(error.component(), component::CONFIGURATION);
            assert_eq!(
                error.details().get("violations"),
                Some(&json!(["Invalid LLM provider: local"]))
            );
        }
    }

    #[test]
    fn update_returns_new_instance() -> Result<(), ConfigValidationError> {
        let config = ValidatedRagConfig::defaults();
        let updated = config.update(ConfigUpdate {
            chunk_size: Some(2000),
            top_k_results: Some(10),
            ..ConfigUpdate::default()
        })?;

        assert_eq!(updated.chunk_size, 2000);
        assert_eq!(updated.top_k_results, 10);
        assert_eq!(updated.embedding_provider, config.embedding_provider);
        assert_eq!(config.chunk_size, 1000);

        let rejected = config.update(ConfigUpdate {
            chunk_overlap: Some(5000),
            ..ConfigUpdate::default()
        });
        assert!(rejected.is_err());
        Ok(())
    }

    #[test]
    fn map_round_trip_preserves_fields() -> Result<(), RagError> {
        let config = ValidatedRagConfig::defaults().update(ConfigUpdate {
            embedding_provider: Some("huggingface".to_owned()),
            similarity_threshold: Some(0.8),
            ..ConfigUpdate::default()
        })?;
        let map = config.to_map();
        assert_eq!(map.len(), CONFIG_FIELDS.len());
        for (field, _) in CONFIG_FIELDS {
            assert!(map.contains_key(field), "missing {field}");
        }
        let restored = ValidatedRagConfig::from_map(map)?;
        assert_eq!(restored, config);
        Ok(())
    }

    #[test]
    fn from_map_rejects_unknown_keys() {
        let mut map = ValidatedRagConfig::defaults().to_map();
        map.insert("unknown_field".to_owned(), json!(1));
        let error = ValidatedRagConfig::from_map(map).err();
        assert_eq!(
            error.map(|error| error.code()),
            Some(ErrorCode::ConfigInvalid)
        );
    }

    #[test]
    fn validated_deserialization_rejects_invalid() {
        let parsed = serde_json::from_value::<ValidatedRagConfig>(json!({"chunk_size": 0}));
        assert!(parsed.is_err());
        let parsed = serde_json::from_value::<ValidatedRagConfig>(json!({"chunk_size": 800}));
        assert!(parsed.is_ok());
    }

    proptest! {
        #[test]
        fn overlap_below_size_is_accepted(size in 1_i64..10_000, ratio in 0.0_f64..1.0) {
            #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
            let overlap = ((size as f64) * ratio) as i64;
            prop_assume!(overlap < size);
            let config = RagConfig { chunk_size: size, chunk_overlap: overlap, ..RagConfig::default() };
            let validated = config.into_validated();
            prop_assert!(validated.is_ok());
            if let Ok(validated) = validated {
                prop_assert_eq!(validated.chunk_size, size);
                prop_assert_eq!(validated.chunk_overlap, overlap);
            }
        }

        #[test]
        fn overlap_at_or_above_size_is_rejected(size in 1_i64..5_000, extra in 0_i64..5_000) {
            let config = RagConfig { chunk_size: size, chunk_overlap: size + extra, ..RagConfig::default() };
            prop_assert!(config.validate().is_err());
        }

        #[test]
        fn threshold_inside_unit_interval_is_kept(threshold in 0.0_f64..=1.0) {
            let config = RagConfig { similarity_threshold: threshold, ..RagConfig::default() };
            let validated = config.into_validated();
            prop_assert!(validated.is_ok());
            if let Ok(validated) = validated {
                prop_assert!((validated.similarity_threshold - threshold).abs() < f64::EPSILON);
            }
        }

        #[test]
        fn threshold_outside_unit_interval_is_rejected(
            threshold in prop_oneof![-1_000.0_f64..-f64::EPSILON, (1.0_f64 + 1e-9)..1_000.0],
        ) {
            let config = RagConfig { similarity_threshold: threshold, ..RagConfig::default() };
            prop_assert!(config.validate().is_err());
        }
    }
}
