//! # rag-twin-config
//!
//! Configuration schema, validation, and loading for rag-twin.
//! This crate depends on `shared` only.

/// `${NAME}` placeholder substitution.
pub mod env;
/// Nested-to-flat layout mapping.
pub mod flatten;
/// Config file loading and writing.
pub mod load;
/// Configuration schema types and validation.
pub mod schema;

pub use env::{EnvSource, EnvSubstitutionError, StdEnv, placeholder_name, substitute_env};
pub use flatten::{FlatConfig, FlattenError, NESTED_FIELD_MAP, flatten_config};
pub use load::{
    ConfigFormat, DEFAULT_CONFIG_PATH, create_default_config, default_config_path, load_config,
    load_config_with_env, parse_config_str, read_config_json, to_pretty_json, write_config_json,
};
pub use schema::{
    CONFIG_FIELDS, ConfigUpdate, ConfigValidationError, ConfigViolation, FieldKind, RagConfig,
    VALID_PROVIDERS, ValidatedRagConfig, field_kind, validate_config,
};

/// Returns the config crate version.
#[must_use]
pub const fn config_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
