//! Config command handlers.

use crate::CliOutput;
use crate::error::{CliError, ExitCode};
use crate::format::{OutputMode, scalar_text, text_lines, to_json_output};
use rag_twin_config::{CONFIG_FIELDS, ValidatedRagConfig, create_default_config, load_config};
use rag_twin_shared::{ErrorCode, RagError};
use std::path::Path;

/// Write the default config to `path`. Existing files are kept unless `force`.
pub fn run_config_init(mode: OutputMode, path: &Path, force: bool) -> Result<CliOutput, CliError> {
    let existed = path.exists();
    if existed && !force {
        return Err(RagError::configuration(
            format!(
                "Configuration file already exists: {} (use --force to overwrite)",
                path.display()
            ),
            ErrorCode::ConfigInvalid,
            "config_path",
        )
        .into());
    }
    create_default_config(path)?;
    tracing::info!(path = %path.display(), overwritten = existed, "wrote default config");

    let stdout = if mode.is_json() {
        to_json_output(&serde_json::json!({
            "status": "ok",
            "path": path.display().to_string(),
            "overwritten": existed,
        }))?
    } else {
        text_lines([
            ("status", "ok".to_owned()),
            ("path", path.display().to_string()),
            ("overwritten", existed.to_string()),
        ])
    };

    Ok(CliOutput {
        stdout,
        exit_code: ExitCode::Ok,
    })
}

/// Load, validate, and print the effective config.
pub fn run_config_show(mode: OutputMode, path: &Path) -> Result<CliOutput, CliError> {
    let config = load_config(path)?;

    let stdout = if mode.is_json() {
        to_json_output(&serde_json::json!({
            "status": "ok",
            "path": path.display().to_string(),
            "config": config.as_ref(),
        }))?
    } else {
        let mut out = text_lines([
            ("status", "ok".to_owned()),
            ("path", path.display().to_string()),
        ]);
        out.push_str("config:\n");
        out.push_str(&format_config_text(&config));
        out
    };

    Ok(CliOutput {
        stdout,
        exit_code: ExitCode::Ok,
    })
}

/// Load and validate the config, printing a one-line summary.
pub fn run_config_validate(mode: OutputMode, path: &Path) -> Result<CliOutput, CliError> {
    let config = load_config(path)?;

    let stdout = if mode.is_json() {
        to_json_output(&serde_json::json!({
            "status": "ok",
            "path": path.display().to_string(),
            "summary": config.to_string(),
        }))?
    } else {
        text_lines([
            ("status", "ok".to_owned()),
            ("path", path.display().to_string()),
            ("summary", config.to_string()),
        ])
    };

    Ok(CliOutput {
        stdout,
        exit_code: ExitCode::Ok,
    })
}

fn format_config_text(config: &ValidatedRagConfig) -> String {
    let values = config.to_map();
    CONFIG_FIELDS
        .iter()
        .filter_map(|(field, _)| {
            values
                .get(*field)
                .map(|value| format!("  {field}: {}\n", scalar_text(value)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_text_lists_fields_in_declaration_order() {
        let text = format_config_text(&ValidatedRagConfig::defaults());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), CONFIG_FIELDS.len());
        assert_eq!(lines[0], "  embedding_provider: openai");
        assert_eq!(lines[4], "  chunk_size: 1000");
        assert_eq!(lines[16], "  logs_directory: logs");
    }
}
