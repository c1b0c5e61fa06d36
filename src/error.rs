//! Error types for utterance synchrony analysis

use thiserror::Error;

/// Errors that can occur while reading, configuring, or computing synchrony
#[derive(Debug, Error)]
pub enum SynchronyError {
    #[error("Malformed input at line {line}: {reason}")]
    InputFormat { line: u64, reason: String },

    #[error("Turn {turn_id} of session '{session_id}' has no code for column '{column}'")]
    MissingCode {
        session_id: String,
        turn_id: String,
        column: String,
    },

    #[error("Column not in declared attribute set: {0}")]
    InvalidColumn(String),

    #[error("Reference window {index} is empty")]
    EmptyReferenceWindow { index: usize },

    #[error("Reference window '{label}' has length {found}, expected {expected}")]
    MismatchedWindowLength {
        label: String,
        expected: usize,
        found: usize,
    },

    #[error("At least one reference window is required")]
    NoReferenceWindows,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type used throughout the crate
pub type Result<T> = std::result::Result<T, SynchronyError>;
