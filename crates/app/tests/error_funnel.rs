//! End-to-end: failures from config and domain code flow through the
//! handler into a JSON log sink.

use rag_twin_adapters::{JsonLogger, LogSink};
use rag_twin_app::{ErrorContext, ErrorHandler};
use rag_twin_config::{
    ConfigFormat, ConfigUpdate, RagConfig, ValidatedRagConfig, parse_config_str,
};
use rag_twin_domain::DocumentChunk;
use rag_twin_shared::{ErrorCode, RagError};
use serde_json::Value;
use std::collections::BTreeMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    fn take(&self) -> Vec<String> {
        let mut guard = self.lines.lock().expect("memory sink lock");
        std::mem::take(&mut *guard)
    }
}

impl LogSink for MemorySink {
    fn write_line(&self, line: &str) {
        let mut guard = self.lines.lock().expect("memory sink lock");
        guard.push(line.to_string());
    }
}

fn handler_with_sink() -> (ErrorHandler, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::default());
    let logger = JsonLogger::new(sink.clone());
    (ErrorHandler::with_logger(Arc::new(logger)), sink)
}

#[test]
fn validation_failure_is_logged_once_with_violations() -> Result<(), Box<dyn Error>> {
    let (handler, sink) = handler_with_sink();
    let invalid = RagConfig {
        chunk_size: 100,
        chunk_overlap: 200,
        temperature: 3.0,
        ..RagConfig::default()
    };
    let error = RagError::from(
        ValidatedRagConfig::new(invalid)
            .err()
            .ok_or("expected validation error")?,
    );

    let context = ErrorContext::new().with("operation", "load_config");
    let response = handler.handle_error(&error, &context);
    assert_eq!(response.error_code, ErrorCode::ConfigValidationFailed);
    assert_eq!(response.component, "Configuration");
    assert!(!response.recoverable);

    let lines = sink.take();
    assert_eq!(lines.len(), 1);
    let payload: Value = serde_json::from_str(lines[0].trim())?;
    assert_eq!(payload["level"], "error");
    assert_eq!(payload["event"], "error.rag");
    assert_eq!(payload["fields"]["context"]["operation"], "load_config");
    assert_eq!(payload["error"]["error_code"], "CFG_003");
    assert_eq!(
        payload["error"]["details"]["fields"],
        serde_json::json!(["chunk_overlap", "temperature"])
    );
    Ok(())
}

#[test]
fn config_and_domain_failures_are_counted_separately() -> Result<(), Box<dyn Error>> {
    let (handler, sink) = handler_with_sink();

    let parse_error = parse_config_str("chunk_size: [", ConfigFormat::Yaml, &BTreeMap::new())
        .err()
        .ok_or("expected parse error")?;
    handler.handle_error(&parse_error, &ErrorContext::new());

    let update_error = ValidatedRagConfig::defaults()
        .update(ConfigUpdate {
            top_k_results: Some(0),
            ..ConfigUpdate::default()
        })
        .err()
        .ok_or("expected update error")?;
    handler.handle_error(&update_error, &ErrorContext::new());

    let chunk_error = DocumentChunk::new("   ", "notes.md")
        .err()
        .ok_or("expected chunk error")?;
    handler.handle_error(&RagError::from(chunk_error), &ErrorContext::new());

    let stats = handler.error_statistics();
    assert_eq!(stats.get("Configuration:CFG_001"), Some(&1));
    assert_eq!(stats.get("Generic:ConfigValidationError"), Some(&1));
    assert_eq!(stats.get("DocumentProcessor:DOC_005"), Some(&1));
    assert_eq!(sink.take().len(), 3);
    Ok(())
}

#[test]
fn secrets_in_context_are_redacted() -> Result<(), Box<dyn Error>> {
    let (handler, sink) = handler_with_sink();
    let context = ErrorContext::new()
        .with("api_key", "sk-live-123")
        .with("model", "gpt-4");
    handler.handle_error(
        &RagError::response("Upstream 502", ErrorCode::LlmApiError, "gpt-4"),
        &context,
    );

    let lines = sink.take();
    let payload: Value = serde_json::from_str(lines[0].trim())?;
    assert_eq!(payload["fields"]["context"]["api_key"], "[REDACTED]");
    assert_eq!(payload["fields"]["context"]["model"], "gpt-4");
    Ok(())
}
