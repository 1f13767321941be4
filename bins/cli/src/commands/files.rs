//! Document file inspection.

use crate::CliOutput;
use crate::error::{CliError, ExitCode};
use crate::format::{OutputMode, text_lines, to_json_output};
use rag_twin_adapters::{
    FileType, directory_size, file_size, find_files, format_file_size, is_supported_file_type,
    validate_file,
};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;

#[derive(Debug, Serialize)]
struct FileReport {
    path: String,
    file_type: FileType,
    supported: bool,
    bytes: u64,
    size: String,
}

impl FileReport {
    fn for_path(path: &Path) -> Result<Self, CliError> {
        let bytes = file_size(path)?;
        Ok(Self {
            path: path.display().to_string(),
            file_type: FileType::from_path(path),
            supported: is_supported_file_type(path),
            bytes,
            size: format_file_size(bytes),
        })
    }
}

/// Validate one file and describe it.
pub fn run_files_inspect(
    mode: OutputMode,
    path: &Path,
    max_size_mb: Option<u64>,
) -> Result<CliOutput, CliError> {
    validate_file(path, max_size_mb).into_result()?;
    let report = FileReport::for_path(path)?;

    let stdout = if mode.is_json() {
        to_json_output(&serde_json::json!({
            "status": "ok",
            "file": report,
        }))?
    } else {
        text_lines([
            ("status", "ok".to_owned()),
            ("path", report.path),
            ("type", report.file_type.to_string()),
            ("supported", report.supported.to_string()),
            ("size", report.size),
        ])
    };

    Ok(CliOutput {
        stdout,
        exit_code: ExitCode::Ok,
    })
}

/// List files under `dir` matching `pattern`.
pub fn run_files_list(
    mode: OutputMode,
    dir: &Path,
    pattern: &str,
    recursive: bool,
) -> Result<CliOutput, CliError> {
    let reports = find_files(dir, pattern, recursive)?
        .iter()
        .map(|path| FileReport::for_path(path))
        .collect::<Result<Vec<_>, _>>()?;
    let total_bytes = directory_size(dir)?;

    let stdout = if mode.is_json() {
        to_json_output(&serde_json::json!({
            "status": "ok",
            "directory": dir.display().to_string(),
            "files": reports,
            "directory_bytes": total_bytes,
        }))?
    } else {
        let mut out = text_lines([
            ("status", "ok".to_owned()),
            ("directory", dir.display().to_string()),
            ("matches", reports.len().to_string()),
            ("directory_size", format_file_size(total_bytes)),
        ]);
        for report in &reports {
            let _ = writeln!(out, "  {} ({}, {})", report.path, report.file_type, report.size);
        }
        out
    };

    Ok(CliOutput {
        stdout,
        exit_code: ExitCode::Ok,
    })
}
