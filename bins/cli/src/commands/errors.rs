//! Error code listing.

use crate::CliOutput;
use crate::error::{CliError, ExitCode};
use crate::format::{OutputMode, to_json_output};
use rag_twin_app::{is_recoverable, should_retry};
use rag_twin_shared::ErrorCode;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct CodeEntry {
    code: ErrorCode,
    domain: String,
    recoverable: bool,
    retry_suggested: bool,
}

/// List every error code with its domain and retry classification.
pub fn run_errors(mode: OutputMode) -> Result<CliOutput, CliError> {
    let entries: Vec<CodeEntry> = ErrorCode::ALL
        .iter()
        .map(|code| CodeEntry {
            code: *code,
            domain: code.domain().to_string(),
            recoverable: is_recoverable(*code),
            retry_suggested: should_retry(*code),
        })
        .collect();

    let stdout = if mode.is_json() {
        to_json_output(&serde_json::json!({
            "status": "ok",
            "codes": entries,
        }))?
    } else {
        entries
            .iter()
            .map(|entry| {
                let flag = if entry.recoverable { "  recoverable" } else { "" };
                format!("{}  {}{flag}\n", entry.code, entry.domain)
            })
            .collect()
    };

    Ok(CliOutput {
        stdout,
        exit_code: ExitCode::Ok,
    })
}
