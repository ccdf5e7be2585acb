//! Error types for the irisshap-ml crate.

use irisshap_core::error::LoadError;
use thiserror::Error;

/// Top-level error type for ML operations.
#[derive(Debug, Error)]
pub enum MlError {
    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Training error: {0}")]
    Training(String),

    #[error("Explainer error: {0}")]
    Explainer(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Additivity check failed: attributions miss the margin shift by {residual:e} (tolerance {tolerance:e})")]
    Additivity { residual: f64, tolerance: f64 },

    #[error("Failed to write attribution table: {0}")]
    Table(#[from] LoadError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl MlError {
    pub fn dataset(msg: impl Into<String>) -> Self {
        Self::Dataset(msg.into())
    }

    pub fn training(msg: impl Into<String>) -> Self {
        Self::Training(msg.into())
    }

    pub fn explainer(msg: impl Into<String>) -> Self {
        Self::Explainer(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
