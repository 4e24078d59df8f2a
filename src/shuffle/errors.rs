//! Shuffle error types
//!
//! Error codes:
//! - SHUF_INPUT_NOT_FOUND: input path missing or not a regular file
//! - SHUF_IO_FAILURE: any read, write or temp-storage failure
//! - SHUF_INVALID_CONFIG: rejected configuration value
//!
//! No phase retries. Errors surface to the pipeline unchanged.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type for shuffle operations
pub type ShuffleResult<T> = Result<T, ShuffleError>;

/// Stable error codes for shuffle failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShuffleErrorCode {
    InputNotFound,
    IoFailure,
    InvalidConfig,
}

impl ShuffleErrorCode {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ShuffleErrorCode::InputNotFound => "SHUF_INPUT_NOT_FOUND",
            ShuffleErrorCode::IoFailure => "SHUF_IO_FAILURE",
            ShuffleErrorCode::InvalidConfig => "SHUF_INVALID_CONFIG",
        }
    }
}

impl fmt::Display for ShuffleErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Shuffle errors
#[derive(Debug, Error)]
pub enum ShuffleError {
    #[error("Input file not found: {}", .path.display())]
    InputNotFound { path: PathBuf },

    #[error("I/O failure: {context}: {source}")]
    IoFailure {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ShuffleError {
    /// Input path does not resolve to a readable file
    pub fn input_not_found(path: &Path) -> Self {
        ShuffleError::InputNotFound {
            path: path.to_path_buf(),
        }
    }

    /// I/O failure with a description of what was being attempted
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        ShuffleError::IoFailure {
            context: context.into(),
            source,
        }
    }

    /// I/O failure at a specific path
    pub fn io_at_path(action: &str, path: &Path, source: io::Error) -> Self {
        Self::io(format!("{} {}", action, path.display()), source)
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        ShuffleError::InvalidConfig(msg.into())
    }

    /// Get the error code
    pub fn code(&self) -> ShuffleErrorCode {
        match self {
            ShuffleError::InputNotFound { .. } => ShuffleErrorCode::InputNotFound,
            ShuffleError::IoFailure { .. } => ShuffleErrorCode::IoFailure,
            ShuffleError::InvalidConfig(_) => ShuffleErrorCode::InvalidConfig,
        }
    }
}
