//! Config file loading and writing.
//!
//! Load order: existence check, format by extension, read, parse, flatten,
//! substitute `${NAME}` placeholders, build, validate. Nothing is cached;
//! every call re-reads the file.

use crate::env::{EnvSource, StdEnv, substitute_env};
use crate::flatten::flatten_config;
use crate::schema::{RagConfig, ValidatedRagConfig};
use rag_twin_shared::{ErrorCode, RagError, Result};
use std::path::Path;

/// Default location of the config file.
pub const DEFAULT_CONFIG_PATH: &str = "config/rag_config.yaml";

/// Supported config file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.yaml` / `.yml`
    Yaml,
    /// `.json`
    Json,
}

impl ConfigFormat {
    /// Pick the format from a path extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|value| value.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("yaml" | "yml") => Ok(Self::Yaml),
            Some("json") => Ok(Self::Json),
            other => Err(RagError::configuration(
                format!(
                    "Unsupported configuration file format: {}",
                    other.map(|ext| format!(".{ext}")).unwrap_or_default()
                ),
                ErrorCode::ConfigInvalid,
                "file_format",
            )),
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Yaml => "YAML",
            Self::Json => "JSON",
        }
    }
}

/// Default config file path.
#[must_use]
pub fn default_config_path() -> &'static Path {
    Path::new(DEFAULT_CONFIG_PATH)
}

/// Load a config file, resolving placeholders from the process environment.
pub fn load_config(path: &Path) -> Result<ValidatedRagConfig> {
    load_config_with_env(path, &StdEnv)
}

/// Load a config file, resolving placeholders from `env`.
pub fn load_config_with_env<E>(path: &Path, env: &E) -> Result<ValidatedRagConfig>
where
    E: EnvSource + ?Sized,
{
    if !path.exists() {
        return Err(RagError::configuration(
            format!("Configuration file not found: {}", path.display()),
            ErrorCode::ConfigMissingRequired,
            "config_path",
        ));
    }

    let format = ConfigFormat::from_path(path)?;
    tracing::debug!(path = %path.display(), format = format.label(), "loading config file");

    let text = read_config_file(path)?;
    parse_config_str(&text, format, env)
}

/// Parse config text in the nested or flat layout and validate it.
pub fn parse_config_str<E>(
    input: &str,
    format: ConfigFormat,
    env: &E,
) -> Result<ValidatedRagConfig>
where
    E: EnvSource + ?Sized,
{
    let document = parse_document(input, format)?;
    let flat = flatten_config(&document)?;
    tracing::debug!(fields = flat.len(), "flattened config document");

    let resolved = substitute_env(flat, env)?;
    let config = ValidatedRagConfig::from_map(resolved)?;
    tracing::debug!(config = %config, "config validated");
    Ok(config)
}

/// Serialize the config as deterministic pretty JSON (with trailing newline).
pub fn to_pretty_json(config: &RagConfig) -> Result<String> {
    let mut output = serde_json::to_string_pretty(config).map_err(|error| {
        RagError::configuration(
            format!("Failed to serialize configuration: {error}"),
            ErrorCode::ConfigInvalid,
            "",
        )
        .with_cause(error)
    })?;
    output.push('\n');
    Ok(output)
}

/// Write `config` to `path` as flat pretty JSON.
pub fn write_config_json(config: &RagConfig, path: &Path) -> Result<()> {
    let output = to_pretty_json(config)?;
    std::fs::write(path, output).map_err(|error| write_error(path, error))
}

/// Read a flat JSON config file written by [`write_config_json`].
pub fn read_config_json(path: &Path) -> Result<ValidatedRagConfig> {
    let text = read_config_file(path)?;
    let raw: RagConfig = serde_json::from_str(&text).map_err(|error| {
        RagError::configuration(
            format!("Invalid JSON configuration: {error}"),
            ErrorCode::ConfigInvalid,
            "",
        )
        .with_cause(error)
    })?;
    raw.into_validated().map_err(RagError::from)
}

/// Write the default config to `path` as JSON, whatever its extension.
/// Parent directories are created as needed.
pub fn create_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|error| write_error(parent, error))?;
    }
    write_config_json(&RagConfig::default(), path)?;
    tracing::debug!(path = %path.display(), "wrote default config");
    Ok(())
}

fn parse_document(input: &str, format: ConfigFormat) -> Result<serde_json::Value> {
    match format {
        ConfigFormat::Json => serde_json::from_str(input).map_err(|error| {
            RagError::configuration(
                format!("Invalid JSON configuration: {error}"),
                ErrorCode::ConfigInvalid,
                "",
            )
            .with_cause(error)
        }),
        ConfigFormat::Yaml => serde_yaml_ng::from_str(input).map_err(|error| {
            RagError::configuration(
                format!("Invalid YAML configuration: {error}"),
                ErrorCode::ConfigInvalid,
                "",
            )
            .with_cause(error)
        }),
    }
}

fn read_config_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|error| {
        let (code, key) = match error.kind() {
            std::io::ErrorKind::NotFound => (ErrorCode::ConfigMissingRequired, "config_path"),
            _ => (ErrorCode::ConfigInvalid, ""),
        };
        RagError::configuration(format!("Failed to load configuration: {error}"), code, key)
            .with_detail("path", path.to_string_lossy().to_string())
            .with_cause(error)
    })
}

fn write_error(path: &Path, error: std::io::Error) -> RagError {
    RagError::system(
        format!("Failed to write configuration: {error}"),
        ErrorCode::SystemUnknownError,
        "filesystem",
    )
    .with_detail("path", path.to_string_lossy().to_string())
    .with_cause(error)
}
