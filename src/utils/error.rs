//! Error types for playerkit
//!
//! This module defines custom error types used throughout the crate.
//! We use thiserror for convenient error type definitions and anyhow for
//! application-level error handling in the demo binary.

use thiserror::Error;

/// Main error type for playerkit
#[derive(Error, Debug)]
pub enum PlayerKitError {
    /// Media engine errors
    #[error("Engine error: {0}")]
    Engine(String),

    /// Presentation / full screen errors
    #[error("Presentation error: {0}")]
    Presentation(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("File error: {0}")]
    FileIO(#[from] std::io::Error),

    /// Invalid input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Generic error for unexpected situations
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience type alias for Results in playerkit
pub type Result<T> = std::result::Result<T, PlayerKitError>;

/// Extension trait for converting other errors to PlayerKitError
pub trait IntoPlayerError<T> {
    /// Convert this error into a PlayerKitError with the given context
    fn engine_err(self, context: &str) -> Result<T>;
    fn presentation_err(self, context: &str) -> Result<T>;
    fn config_err(self, context: &str) -> Result<T>;
}

impl<T, E: std::fmt::Display> IntoPlayerError<T> for std::result::Result<T, E> {
    fn engine_err(self, context: &str) -> Result<T> {
        self.map_err(|e| PlayerKitError::Engine(format!("{}: {}", context, e)))
    }

    fn presentation_err(self, context: &str) -> Result<T> {
        self.map_err(|e| PlayerKitError::Presentation(format!("{}: {}", context, e)))
    }

    fn config_err(self, context: &str) -> Result<T> {
        self.map_err(|e| PlayerKitError::Config(format!("{}: {}", context, e)))
    }
}
