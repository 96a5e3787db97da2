//! Error types
//!
//! `CalcError` covers the pure calculation core. `AppError` wraps it together
//! with the I/O layers (files, database, HTTP).

use std::path::PathBuf;

use thiserror::Error;

use crate::db::DbError;

/// Errors raised by nutrition and energy calculations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    /// Malformed or out-of-range input
    #[error("Validation error: {0}")]
    Validation(String),

    /// An operation needs a field that was never set
    #[error("Missing data: {0}")]
    MissingData(String),
}

impl CalcError {
    pub fn validation(msg: impl Into<String>) -> Self {
        CalcError::Validation(msg.into())
    }

    pub fn missing(msg: impl Into<String>) -> Self {
        CalcError::MissingData(msg.into())
    }
}

/// Result type for calculations
pub type CalcResult<T> = Result<T, CalcError>;

/// Application-level error types
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Calc(#[from] CalcError),

    #[error("Database error: {0}")]
    Db(#[from] DbError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("No file found at: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Recipe extraction failed: {0}")]
    Extraction(String),

    #[error("Recipe {0} not found")]
    RecipeNotFound(i64),

    #[error("{0}")]
    Usage(String),
}

/// Result type for I/O-facing operations
pub type AppResult<T> = Result<T, AppError>;
