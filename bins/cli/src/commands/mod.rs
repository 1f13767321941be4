//! CLI command handlers.

pub mod config;
pub mod errors;
pub mod files;
pub mod info;

pub use config::{run_config_init, run_config_show, run_config_validate};
pub use errors::run_errors;
pub use files::{run_files_inspect, run_files_list};
pub use info::run_info;
