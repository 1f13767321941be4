//! `${NAME}` placeholder substitution for flattened config values.
//!
//! Substitution is strict: an unset variable fails the load rather than
//! falling back to a default. Values of secret-looking variables are
//! redacted in error details.

use crate::flatten::FlatConfig;
use crate::schema::{FieldKind, field_kind};
use rag_twin_shared::{ErrorCode, RagError, redact_if_secret};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Read access to environment variables.
pub trait EnvSource {
    /// Value of `name`, or `None` when unset.
    fn get(&self, name: &str) -> Option<String>;
}

/// The process environment. Non-UTF-8 values count as unset.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdEnv;

impl EnvSource for StdEnv {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl EnvSource for BTreeMap<String, String> {
    fn get(&self, name: &str) -> Option<String> {
        Self::get(self, name).cloned()
    }
}

/// Placeholder substitution failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvSubstitutionError {
    /// A referenced variable is not set.
    MissingVariable {
        /// Variable name.
        var: String,
        /// Config field holding the placeholder.
        field: String,
    },
    /// A substituted value does not parse as the field's number type.
    InvalidNumber {
        /// Variable name.
        var: String,
        /// Config field holding the placeholder.
        field: String,
        /// Substituted value.
        value: String,
    },
}

impl EnvSubstitutionError {
    const fn error_code(&self) -> ErrorCode {
        match self {
            Self::MissingVariable { .. } => ErrorCode::ConfigMissingRequired,
            Self::InvalidNumber { .. } => ErrorCode::ConfigInvalid,
        }
    }
}

impl fmt::Display for EnvSubstitutionError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingVariable { var, .. } => {
                write!(formatter, "Environment variable not found: {var}")
            },
            Self::InvalidNumber { var, field, .. } => write!(
                formatter,
                "Environment variable {var} is not a valid number for {field}"
            ),
        }
    }
}

impl std::error::Error for EnvSubstitutionError {}

impl From<EnvSubstitutionError> for RagError {
    fn from(error: EnvSubstitutionError) -> Self {
        let code = error.error_code();
        let message = error.to_string();
        match error {
            EnvSubstitutionError::MissingVariable { var, field } => {
                Self::configuration(message, code, &var).with_detail("field", field)
            },
            EnvSubstitutionError::InvalidNumber { var, field, value } => {
                let value = redact_if_secret(&var, &value);
                Self::configuration(message, code, &var)
                    .with_detail("field", field)
                    .with_detail("value", value)
            },
        }
    }
}

/// Variable name of a whole-string `${NAME}` placeholder.
#[must_use]
pub fn placeholder_name(value: &str) -> Option<&str> {
    value.strip_prefix("${")?.strip_suffix('}')
}

/// Replace every `${NAME}` string value with the variable's value.
///
/// Substituted values for numeric fields are parsed as the field's number
/// type. Values that are not placeholders pass through untouched.
pub fn substitute_env<E>(flat: FlatConfig, env: &E) -> Result<FlatConfig, EnvSubstitutionError>
where
    E: EnvSource + ?Sized,
{
    let mut resolved = FlatConfig::new();

    for (field, value) in flat {
        let Some(var) = value.as_str().and_then(placeholder_name) else {
            resolved.insert(field, value);
            continue;
        };

        let Some(raw) = env.get(var) else {
            return Err(EnvSubstitutionError::MissingVariable {
                var: var.to_owned(),
                field,
            });
        };
        tracing::debug!(
            field = %field,
            var = %var,
            value = %redact_if_secret(var, &raw),
            "substituted config placeholder"
        );

        let typed = coerce(field_kind(&field), &raw).ok_or_else(|| {
            EnvSubstitutionError::InvalidNumber {
                var: var.to_owned(),
                field: field.clone(),
                value: raw.clone(),
            }
        })?;
        resolved.insert(field, typed);
    }

    Ok(resolved)
}

fn coerce(kind: Option<FieldKind>, raw: &str) -> Option<Value> {
    match kind {
        Some(FieldKind::Integer) => raw.trim().parse::<i64>().ok().map(Value::from),
        Some(FieldKind::Float) => raw
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number),
        Some(FieldKind::Text) | None => Some(Value::String(raw.to_owned())),
    }
}
