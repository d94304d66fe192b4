//! Unified application error type.
//!
//! Each layer has its own error enum; this one wraps them so the binaries can
//! use `?` and print a single message.

use crate::config::ConfigError;
use crate::console::ConsoleError;
use crate::port::{PortError, SelectionError};
use crate::scanner::ScanError;
use thiserror::Error;

/// A specialized `Result` type for the binaries' top-level flows.
pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Opening, reading or writing the serial device failed.
    #[error("Connection error: {0}")]
    Connection(#[from] PortError),

    #[error(transparent)]
    InvalidSelection(#[from] SelectionError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Terminal error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to initialise logging: {0}")]
    Logging(String),

    #[error("Failed to install signal handler: {0}")]
    Signal(#[from] ctrlc::Error),
}

impl From<ConsoleError> for AppError {
    fn from(err: ConsoleError) -> Self {
        match err {
            ConsoleError::Port(e) => Self::Connection(e),
            ConsoleError::Terminal(e) => Self::Io(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_error_conversion() {
        let err: AppError = ConsoleError::Port(PortError::NotOpen).into();
        assert!(matches!(err, AppError::Connection(PortError::NotOpen)));
        assert_eq!(err.to_string(), "Connection error: Port is not open");
    }

    #[test]
    fn test_selection_message_passes_through() {
        let err: AppError = SelectionError {
            requested: "COM2".to_string(),
        }
        .into();
        assert!(err.to_string().starts_with("Invalid port 'COM2'"));
    }
}
