//! Nested config layout to flat field mapping.
//!
//! Two passes write into the same output map: the nested `(section, key)`
//! table first, then top-level keys named after a field. The second pass
//! runs last, so a flat key overrides its nested counterpart.

use crate::schema::CONFIG_FIELDS;
use rag_twin_shared::{ErrorCode, RagError};
use serde_json::{Map, Value};
use std::fmt;

/// Flat configuration values keyed by field name.
pub type FlatConfig = Map<String, Value>;

/// `(section, key) -> field` table for the nested layout.
pub const NESTED_FIELD_MAP: [(&str, &str, &str); 17] = [
    ("embedding", "provider", "embedding_provider"),
    ("embedding", "model", "embedding_model"),
    ("llm", "provider", "llm_provider"),
    ("llm", "model", "llm_model"),
    ("document_processing", "chunk_size", "chunk_size"),
    ("document_processing", "chunk_overlap", "chunk_overlap"),
    ("retrieval", "top_k_results", "top_k_results"),
    ("retrieval", "similarity_threshold", "similarity_threshold"),
    ("retrieval", "max_context_length", "max_context_length"),
    ("response", "max_tokens", "max_response_tokens"),
    ("response", "temperature", "temperature"),
    ("system", "batch_size", "batch_size"),
    ("system", "max_retries", "max_retries"),
    ("system", "timeout_seconds", "timeout_seconds"),
    ("paths", "data_directory", "data_directory"),
    ("paths", "embeddings_directory", "embeddings_directory"),
    ("paths", "logs_directory", "logs_directory"),
];

/// The parsed document root is not a mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlattenError {
    /// JSON type name of the root.
    pub found: &'static str,
}

impl fmt::Display for FlattenError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "Configuration root must be a mapping, found {}",
            self.found
        )
    }
}

impl std::error::Error for FlattenError {}

impl From<FlattenError> for RagError {
    fn from(error: FlattenError) -> Self {
        Self::configuration(error.to_string(), ErrorCode::ConfigInvalid, "")
            .with_detail("found", error.found)
    }
}

/// Map a parsed config document onto flat field names.
///
/// Unknown sections and keys are ignored, as are sections that are not
/// mappings.
pub fn flatten_config(root: &Value) -> Result<FlatConfig, FlattenError> {
    let Value::Object(root) = root else {
        return Err(FlattenError {
            found: value_type_name(root),
        });
    };

    let mut flat = FlatConfig::new();

    for (section, key, field) in NESTED_FIELD_MAP {
        let nested = root
            .get(section)
            .and_then(Value::as_object)
            .and_then(|section| section.get(key));
        if let Some(value) = nested {
            flat.insert(field.to_owned(), value.clone());
        }
    }

    for (field, _) in CONFIG_FIELDS {
        if let Some(value) = root.get(field) {
            flat.insert(field.to_owned(), value.clone());
        }
    }

    Ok(flat)
}

const fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_sections_map_to_fields() -> Result<(), FlattenError> {
        let flat = flatten_config(&json!({
            "embedding": {"provider": "openai", "model": "text-embedding-ada-002"},
            "response": {"max_tokens": 800, "temperature": 0.3},
            "paths": {"logs_directory": "var/logs"}
        }))?;

        assert_eq!(flat.get("embedding_provider"), Some(&json!("openai")));
        assert_eq!(flat.get("max_response_tokens"), Some(&json!(800)));
        assert_eq!(flat.get("temperature"), Some(&json!(0.3)));
        assert_eq!(flat.get("logs_directory"), Some(&json!("var/logs")));
        assert_eq!(flat.len(), 5);
        Ok(())
    }

    #[test]
    fn flat_keys_override_nested_keys() -> Result<(), FlattenError> {
        let flat = flatten_config(&json!({
            "embedding": {"provider": "a"},
            "embedding_provider": "b"
        }))?;
        assert_eq!(flat.get("embedding_provider"), Some(&json!("b")));
        Ok(())
    }

    #[test]
    fn unknown_sections_and_keys_are_ignored() -> Result<(), FlattenError> {
        let flat = flatten_config(&json!({
            "vector_store": {"type": "faiss"},
            "embedding": {"dimension": 1536},
            "llm": "not-a-mapping",
            "max_tokens": 5
        }))?;
        assert!(flat.is_empty());
        Ok(())
    }

    #[test]
    fn every_table_target_is_a_field() {
        for (_, _, field) in NESTED_FIELD_MAP {
            assert!(
                CONFIG_FIELDS.iter().any(|(name, _)| *name == field),
                "unknown field {field}"
            );
        }
    }

    #[test]
    fn non_mapping_root_is_rejected() {
        assert_eq!(
            flatten_config(&Value::Null).err(),
            Some(FlattenError { found: "null" })
        );
        let error: RagError = FlattenError { found: "sequence" }.into();
        assert_eq!(error.code(), ErrorCode::ConfigInvalid);
    }
}
