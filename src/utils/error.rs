//! Error types for the IPTV player core
//!
//! This module defines custom error types used throughout the library.
//! We use thiserror for convenient error type definitions and anyhow for
//! application-level error handling in the CLI.

use thiserror::Error;

/// Main error type for the player core
#[derive(Error, Debug)]
pub enum IptvError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("File error: {0}")]
    FileIO(#[from] std::io::Error),

    /// Serialization errors (JSON/TOML)
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Persistent storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Storage quota exhausted
    #[error("Storage quota exceeded: {needed} bytes needed, {limit} allowed")]
    QuotaExceeded { needed: usize, limit: usize },

    /// Decoder/backend boundary errors
    #[error("Backend error: {0}")]
    Backend(String),

    /// Generic error for unexpected situations
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for IptvError {
    fn from(err: serde_json::Error) -> Self {
        IptvError::Serialization(format!("JSON error: {}", err))
    }
}

impl IptvError {
    /// Create an invalid input error from string
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        IptvError::InvalidInput(msg.into())
    }
}

/// Convenience type alias for Results in the player core
pub type Result<T> = std::result::Result<T, IptvError>;

/// Extension trait for converting other errors to IptvError
pub trait IntoIptvError<T> {
    /// Convert this error into an IptvError with the given context
    fn config_err(self, context: &str) -> Result<T>;
    fn storage_err(self, context: &str) -> Result<T>;
}

impl<T, E: std::fmt::Display> IntoIptvError<T> for std::result::Result<T, E> {
    fn config_err(self, context: &str) -> Result<T> {
        self.map_err(|e| IptvError::Config(format!("{}: {}", context, e)))
    }

    fn storage_err(self, context: &str) -> Result<T> {
        self.map_err(|e| IptvError::Storage(format!("{}: {}", context, e)))
    }
}

/// Helper macro for creating internal errors with file and line information
#[macro_export]
macro_rules! internal_error {
    ($msg:expr) => {
        $crate::utils::error::IptvError::Internal(
            format!("{} at {}:{}", $msg, file!(), line!())
        )
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::utils::error::IptvError::Internal(
            format!("{} at {}:{}", format!($fmt, $($arg)*), file!(), line!())
        )
    };
}
