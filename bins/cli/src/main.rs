//! CLI binary entrypoint.

mod commands;
mod error;
mod format;

use clap::{Args, Parser, Subcommand};
use commands::{
    run_config_init, run_config_show, run_config_validate, run_errors, run_files_inspect,
    run_files_list, run_info,
};
use error::{CliError, ExitCode};
use format::{OutputArgs, OutputMode, text_lines, to_json_output};
use rag_twin_adapters::{LoggingOptions, setup_logging};
use rag_twin_app::{ErrorContext, ErrorHandler, ErrorResponse};
use rag_twin_config::DEFAULT_CONFIG_PATH;
use rag_twin_shared::RagError;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the `tracing` filter for diagnostics.
const LOG_FILTER_ENV: &str = "RAG_TWIN_LOG";

#[derive(Debug, Parser)]
#[command(
    name = "rag-twin",
    version,
    about = "Configuration and error tooling for the RAG digital twin",
    long_about = None
)]
struct Cli {
    #[command(flatten)]
    output: OutputArgs,

    #[command(flatten)]
    logging: LoggingArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Structured error log flags.
#[derive(Debug, Args)]
struct LoggingArgs {
    /// Minimum level for the structured error log (DEBUG, INFO, WARNING, ERROR, CRITICAL).
    #[arg(long, global = true, default_value = "ERROR")]
    log_level: String,
    /// Also append structured error logs to this rotating file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show build and version details.
    Info,
    /// Config-related commands.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// List every error code with its domain.
    Errors,
    /// Document file checks.
    Files {
        #[command(subcommand)]
        command: FilesCommands,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigCommands {
    /// Write the default config file.
    Init {
        /// Target path (YAML or JSON extension; content is always JSON).
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        path: PathBuf,
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
    /// Print the effective config.
    Show {
        /// Config file path.
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        path: PathBuf,
    },
    /// Validate a config file.
    Validate {
        /// Config file path.
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        path: PathBuf,
    },
}

#[derive(Debug, Subcommand)]
enum FilesCommands {
    /// Check that a file can be ingested and describe it.
    Inspect {
        /// File to check.
        path: PathBuf,
        /// Reject files larger than this many MiB.
        #[arg(long)]
        max_size_mb: Option<u64>,
    },
    /// List files in a directory.
    List {
        /// Directory to search.
        dir: PathBuf,
        /// Pattern with `*`, `?` and `[...]` per path segment (`sub/*.md`).
        #[arg(long, default_value = "*")]
        pattern: String,
        /// Only look at the top level.
        #[arg(long)]
        no_recursive: bool,
    },
}

impl Commands {
    const fn name(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Config { command } => match command {
                ConfigCommands::Init { .. } => "config init",
                ConfigCommands::Show { .. } => "config show",
                ConfigCommands::Validate { .. } => "config validate",
            },
            Self::Errors => "errors",
            Self::Files { command } => match command {
                FilesCommands::Inspect { .. } => "files inspect",
                FilesCommands::List { .. } => "files list",
            },
        }
    }
}

pub(crate) struct CliOutput {
    stdout: String,
    exit_code: ExitCode,
}

fn main() -> std::process::ExitCode {
    init_tracing();
    let cli = Cli::parse();
    let mode = OutputMode::from_args(&cli.output);

    let output = match build_error_handler(&cli.logging) {
        Ok(handler) => run(&cli.command, mode).unwrap_or_else(|error| {
            format_failure(mode, &handler, &error, cli.command.name())
        }),
        Err(error) => format_failure(
            mode,
            &ErrorHandler::new(),
            &CliError::Rag(error),
            cli.command.name(),
        ),
    };

    match write_output(&output) {
        Ok(()) => std::process::ExitCode::from(output.exit_code.as_u8()),
        Err(error) => {
            let _ = writeln!(io::stderr(), "error: {error}");
            std::process::ExitCode::from(ExitCode::Failure.as_u8())
        },
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn build_error_handler(args: &LoggingArgs) -> Result<ErrorHandler, RagError> {
    let mut options = LoggingOptions::default().with_level(&args.log_level);
    if let Some(path) = &args.log_file {
        options = options.with_log_file(path);
    }
    let logger = setup_logging(&options)?;
    Ok(ErrorHandler::with_logger(Arc::new(logger)))
}

fn run(command: &Commands, mode: OutputMode) -> Result<CliOutput, CliError> {
    match command {
        Commands::Info => run_info(mode),
        Commands::Config { command } => match command {
            ConfigCommands::Init { path, force } => run_config_init(mode, path, *force),
            ConfigCommands::Show { path } => run_config_show(mode, path),
            ConfigCommands::Validate { path } => run_config_validate(mode, path),
        },
        Commands::Errors => run_errors(mode),
        Commands::Files { command } => match command {
            FilesCommands::Inspect { path, max_size_mb } => {
                run_files_inspect(mode, path, *max_size_mb)
            },
            FilesCommands::List {
                dir,
                pattern,
                no_recursive,
            } => run_files_list(mode, dir, pattern, !*no_recursive),
        },
    }
}

fn format_failure(
    mode: OutputMode,
    handler: &ErrorHandler,
    error: &CliError,
    command: &str,
) -> CliOutput {
    let context = ErrorContext::new().with("command", command);
    let response = error.funnel(handler, &context);
    tracing::debug!(command, code = %response.error_code, "command failed");

    let stdout = if mode.is_json() {
        to_json_output(&response).unwrap_or_else(|_| {
            "{\"error\":true,\"message\":\"internal error\",\"error_code\":\"SYS_999\",\"component\":\"Unknown\",\"recoverable\":false,\"retry_suggested\":false}\n".to_string()
        })
    } else {
        format_error_text(&response)
    };

    CliOutput {
        stdout,
        exit_code: error.exit_code(),
    }
}

fn format_error_text(response: &ErrorResponse) -> String {
    text_lines([
        ("status", "error".to_owned()),
        ("error_code", response.error_code.to_string()),
        ("component", response.component.clone()),
        ("message", response.message.clone()),
        ("recoverable", response.recoverable.to_string()),
        ("retry_suggested", response.retry_suggested.to_string()),
    ])
}

fn write_output(output: &CliOutput) -> Result<(), CliError> {
    let mut stdout = io::stdout();
    stdout.write_all(output.stdout.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
