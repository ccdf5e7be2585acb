//! Error types for the irisshap core library.
//!
//! Uses `thiserror` for public API error types with structured variants
//! covering table loading, query validation and configuration.

use std::path::PathBuf;

/// Top-level error type for the irisshap core library.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Chart error: {0}")]
    Chart(#[from] crate::canvas::ChartError),
}

/// Errors raised while reading or writing the attribution table.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Attribution file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Failed to read attribution file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed TSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unexpected header: expected column {index} to be '{expected}', found '{found}'")]
    HeaderMismatch {
        index: usize,
        expected: String,
        found: String,
    },

    #[error("Line {line}: expected {expected} fields, found {found}")]
    FieldCount {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("Line {line}, column '{column}': invalid number '{value}'")]
    InvalidNumber {
        line: u64,
        column: String,
        value: String,
    },

    #[error("Line {line}: invalid class label {value}")]
    InvalidClass { line: u64, value: String },

    #[error("Attribution file contains no records")]
    Empty,
}

/// Errors from the query layer.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QueryError {
    #[error("Row index {index} out of range: valid rows are 0..{len}")]
    RowOutOfRange { index: i64, len: usize },

    #[error("Unknown class label {value}: expected 0 or 1")]
    UnknownClass { value: i64 },
}

/// Errors from configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Configuration parse error: {message}")]
    ParseError { message: String },
}

/// Convenience type alias for irisshap core results.
pub type Result<T> = std::result::Result<T, DashboardError>;
