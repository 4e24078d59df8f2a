//! CLI-specific error types
//!
//! Every CLI error ends the process with exit status 1.

use std::fmt;
use std::io;

use crate::shuffle::{ShuffleError, ShuffleErrorCode};

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file or flag error
    ConfigError,
    /// Input file missing
    InputNotFound,
    /// I/O error during the run or while writing the response
    IoError,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "CHUNKSHUF_CLI_CONFIG_ERROR",
            Self::InputNotFound => "CHUNKSHUF_CLI_INPUT_NOT_FOUND",
            Self::IoError => "CHUNKSHUF_CLI_IO_ERROR",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn input_not_found(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::InputNotFound, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        1
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<ShuffleError> for CliError {
    fn from(e: ShuffleError) -> Self {
        match e.code() {
            ShuffleErrorCode::InputNotFound => Self::input_not_found(e.to_string()),
            ShuffleErrorCode::IoFailure => Self::io_error(e.to_string()),
            ShuffleErrorCode::InvalidConfig => Self::config_error(e.to_string()),
        }
    }
}

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

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
