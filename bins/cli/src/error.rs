use rag_twin_app::{ErrorContext, ErrorHandler, ErrorResponse};
use rag_twin_shared::{ErrorDomain, RagError};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Ok = 0,
    Failure = 1,
    Configuration = 2,
}

impl ExitCode {
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

#[derive(Debug)]
pub enum CliError {
    Rag(RagError),
    Io(std::io::Error),
    Serialization(serde_json::Error),
}

impl CliError {
    #[must_use]
    pub const fn exit_code(&self) -> ExitCode {
        match self {
            Self::Rag(error) if matches!(error.code().domain(), ErrorDomain::Configuration) => {
                ExitCode::Configuration
            },
            Self::Rag(_) | Self::Io(_) | Self::Serialization(_) => ExitCode::Failure,
        }
    }

    /// Route the failure through the handler.
    pub fn funnel(&self, handler: &ErrorHandler, context: &ErrorContext) -> ErrorResponse {
        match self {
            Self::Rag(error) => handler.handle_rag_error(error, context),
            Self::Io(error) => handler.handle_error(error, context),
            Self::Serialization(error) => handler.handle_error(error, context),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rag(error) => write!(formatter, "{error}"),
            Self::Io(error) => write!(formatter, "io error: {error}"),
            Self::Serialization(error) => write!(formatter, "serialization error: {error}"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<RagError> for CliError {
    fn from(error: RagError) -> Self {
        Self::Rag(error)
    }
}

impl From<std::io::Error> for CliError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error)
    }
}
