//! Info command handler.

use crate::CliOutput;
use crate::error::{CliError, ExitCode};
use crate::format::{OutputMode, text_lines, to_json_output};
use rag_twin_adapters::SUPPORTED_FILE_TYPES;
use rag_twin_config::DEFAULT_CONFIG_PATH;
use rag_twin_shared::ErrorCode;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct BuildInfo {
    name: &'static str,
    version: &'static str,
    default_config_path: &'static str,
    error_codes: usize,
    supported_file_types: &'static [&'static str],
}

impl BuildInfo {
    fn current() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            default_config_path: DEFAULT_CONFIG_PATH,
            error_codes: ErrorCode::ALL.len(),
            supported_file_types: &SUPPORTED_FILE_TYPES,
        }
    }
}

/// Run the info command.
pub fn run_info(mode: OutputMode) -> Result<CliOutput, CliError> {
    let build = BuildInfo::current();

    let stdout = if mode.is_json() {
        to_json_output(&serde_json::json!({
            "status": "ok",
            "build": build,
        }))?
    } else {
        text_lines([
            ("status", "ok".to_owned()),
            ("name", build.name.to_owned()),
            ("version", build.version.to_owned()),
            ("default_config_path", build.default_config_path.to_owned()),
            ("error_codes", build.error_codes.to_string()),
            ("supported_file_types", build.supported_file_types.join(", ")),
        ])
    };

    Ok(CliOutput {
        stdout,
        exit_code: ExitCode::Ok,
    })
}
