//! Terminal error funnel: classify, count, and log any error.
//!
//! Typed errors ([`RagError`]) keep their code and component and are checked
//! against the transient-failure set. Everything else becomes `SYS_999` from
//! component `Unknown` and is never retried. Handling never fails.

use rag_twin_ports::{LogEvent, LogFields, LogLevel, LoggerPort};
use rag_twin_shared::{ErrorCode, RagError, component};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// Codes for transient failures: retrying with the same input may succeed.
pub const RECOVERABLE_CODES: [ErrorCode; 5] = [
    ErrorCode::EmbeddingRateLimit,
    ErrorCode::LlmRateLimit,
    ErrorCode::SystemTimeout,
    ErrorCode::EmbeddingApiError,
    ErrorCode::LlmApiError,
];

const UNTYPED_LABEL: &str = "Error";

/// True when the caller may recover from `code` without changing inputs.
#[must_use]
pub fn is_recoverable(code: ErrorCode) -> bool {
    RECOVERABLE_CODES.contains(&code)
}

/// True when the failed operation is worth retrying.
#[must_use]
pub fn should_retry(code: ErrorCode) -> bool {
    RECOVERABLE_CODES.contains(&code)
}

/// Free-form context recorded alongside a handled error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorContext(BTreeMap<String, Value>);

impl ErrorContext {
    /// Empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Look up an entry.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// True when no entry is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn to_value(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        )
    }
}

impl<K, V> FromIterator<(K, V)> for ErrorContext
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// Uniform payload returned for every handled error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always `true`.
    pub error: bool,
    /// Error message (`Display` output for untyped errors).
    pub message: String,
    /// Stable code.
    pub error_code: ErrorCode,
    /// Owning component, `Unknown` for untyped errors.
    pub component: String,
    /// See [`is_recoverable`].
    pub recoverable: bool,
    /// See [`should_retry`].
    pub retry_suggested: bool,
}

/// Classifies errors, counts them per `"{component}:{code}"`, and logs one
/// event per call when a logger is attached.
///
/// Counters belong to the instance. Concurrent calls never lose increments.
#[derive(Default)]
pub struct ErrorHandler {
    logger: Option<Arc<dyn LoggerPort>>,
    counts: Mutex<BTreeMap<String, u64>>,
}

impl ErrorHandler {
    /// Handler without a logger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Handler that logs every handled error to `logger`.
    #[must_use]
    pub fn with_logger(logger: Arc<dyn LoggerPort>) -> Self {
        Self {
            logger: Some(logger),
            counts: Mutex::default(),
        }
    }

    /// Handle any error. [`RagError`] takes the typed path; other types are
    /// counted under `Generic:<type name>`.
    pub fn handle_error<E>(&self, error: &E, context: &ErrorContext) -> ErrorResponse
    where
        E: Error + 'static,
    {
        let erased: &(dyn Error + 'static) = error;
        match erased.downcast_ref::<RagError>() {
            Some(rag_error) => self.handle_rag_error(rag_error, context),
            None => self.handle_untyped(erased, short_type_name::<E>(), context),
        }
    }

    /// Handle a type-erased error. Untyped errors are counted under
    /// `Generic:Error`.
    pub fn handle_dyn_error(
        &self,
        error: &(dyn Error + 'static),
        context: &ErrorContext,
    ) -> ErrorResponse {
        match error.downcast_ref::<RagError>() {
            Some(rag_error) => self.handle_rag_error(rag_error, context),
            None => self.handle_untyped(error, UNTYPED_LABEL, context),
        }
    }

    /// Handle a typed error.
    pub fn handle_rag_error(&self, error: &RagError, context: &ErrorContext) -> ErrorResponse {
        self.increment(format!("{}:{}", error.component(), error.code()));

        if let Some(logger) = &self.logger {
            let mut event = LogEvent::new(
                LogLevel::Error,
                "error.rag",
                &format!("RAG Error: {error}"),
            )
            .with_fields(context_fields(context));
            if let Ok(record) = serde_json::to_value(error.to_record()) {
                event = event.with_error(record);
            }
            logger.log(event);
        }

        ErrorResponse {
            error: true,
            message: error.message().to_owned(),
            error_code: error.code(),
            component: error.component().to_owned(),
            recoverable: is_recoverable(error.code()),
            retry_suggested: should_retry(error.code()),
        }
    }

    fn handle_untyped(
        &self,
        error: &(dyn Error + 'static),
        type_label: &str,
        context: &ErrorContext,
    ) -> ErrorResponse {
        self.increment(format!("{}:{type_label}", component::GENERIC));

        if let Some(logger) = &self.logger {
            let mut error_payload = serde_json::Map::new();
            error_payload.insert("type".to_owned(), Value::from(type_label));
            logger.log(
                LogEvent::new(
                    LogLevel::Error,
                    "error.unexpected",
                    &format!("Unexpected error: {error}"),
                )
                .with_fields(context_fields(context))
                .with_error(Value::Object(error_payload)),
            );
        }

        ErrorResponse {
            error: true,
            message: error.to_string(),
            error_code: ErrorCode::SystemUnknownError,
            component: component::UNKNOWN.to_owned(),
            recoverable: false,
            retry_suggested: false,
        }
    }

    /// Snapshot of the occurrence counters.
    #[must_use]
    pub fn error_statistics(&self) -> BTreeMap<String, u64> {
        self.counts().clone()
    }

    /// Clear all counters.
    pub fn reset_error_counts(&self) {
        self.counts().clear();
    }

    fn increment(&self, key: String) {
        let mut counts = self.counts();
        let count = counts.entry(key).or_insert(0);
        *count = count.saturating_add(1);
    }

    fn counts(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, u64>> {
        self.counts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for ErrorHandler {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ErrorHandler")
            .field("has_logger", &self.logger.is_some())
            .field("counts", &*self.counts())
            .finish()
    }
}

fn context_fields(context: &ErrorContext) -> LogFields {
    let mut fields = LogFields::new();
    fields.insert("context".into(), context.to_value());
    fields
}

/// Last path segment of the type name, without generic arguments.
fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
