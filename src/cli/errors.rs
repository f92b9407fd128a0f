//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero exit code.

use std::fmt;
use std::io;

use crate::errors::ChemSpiderError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file or environment error
    ConfigError,
    /// No API key on the command line or in the environment
    MissingApiKey,
    /// Bad argument value
    InvalidArgument,
    /// I/O error (stdout or output file)
    IoError,
    /// The service call failed
    RequestFailed,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "CHEMSPIDER_CLI_CONFIG_ERROR",
            Self::MissingApiKey => "CHEMSPIDER_CLI_MISSING_API_KEY",
            Self::InvalidArgument => "CHEMSPIDER_CLI_INVALID_ARGUMENT",
            Self::IoError => "CHEMSPIDER_CLI_IO_ERROR",
            Self::RequestFailed => "CHEMSPIDER_CLI_REQUEST_FAILED",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
    /// Code of the underlying client error, if any
    source_code: Option<&'static str>,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source_code: None,
        }
    }

    /// Missing API key
    pub fn missing_api_key() -> Self {
        Self::new(
            CliErrorCode::MissingApiKey,
            "No API key. Pass --api-key or set CHEMSPIDER_API_KEY.",
        )
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Most specific code string: the client error's if there is one
    pub fn code_str(&self) -> &'static str {
        self.source_code.unwrap_or_else(|| self.code.code())
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code_str(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<ChemSpiderError> for CliError {
    fn from(e: ChemSpiderError) -> Self {
        let code = match e {
            ChemSpiderError::Config(_) => CliErrorCode::ConfigError,
            ChemSpiderError::Validation(_) => CliErrorCode::InvalidArgument,
            _ => CliErrorCode::RequestFailed,
        };
        Self {
            code,
            message: e.to_string(),
            source_code: Some(e.code()),
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
