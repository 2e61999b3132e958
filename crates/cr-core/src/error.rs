//! # AppError
//!
//! Centralized error handling for civic-report.
//! Maps aggregation and storage failures to actionable error types.

use thiserror::Error;

/// The primary error type for all cr-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// A submission is missing its location or tags, or carries bad coordinates.
    #[error("invalid report: {0}")]
    InvalidReport(String),

    /// The backing store could not be read or written, or held an unreadable blob.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Resource not found (kind, id)
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// Aggregator settings out of range
    #[error("configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Wraps a backend failure. The chain is flattened into the message so the
    /// API layer can log it without holding on to `anyhow` types.
    pub fn persistence(err: anyhow::Error) -> Self {
        AppError::Persistence(format!("{err:#}"))
    }
}

/// A specialized Result type for civic-report logic.
pub type Result<T> = std::result::Result<T, AppError>;
