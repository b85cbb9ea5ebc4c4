//! Error types for the data layer.
//!
//! The library reports typed errors via `thiserror`; the binary wraps them
//! with `anyhow` context where they reach the user.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading the sales dataset.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("data file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("row {row}: {message}")]
    InvalidRow { row: usize, message: String },

    #[error("expected a top-level JSON array of records, found {0}")]
    JsonShape(&'static str),

    #[error("data file contains no rows")]
    NoRows,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

impl LoadError {
    pub(crate) fn invalid_row(row: usize, message: impl Into<String>) -> Self {
        LoadError::InvalidRow {
            row,
            message: message.into(),
        }
    }
}

/// Errors that can occur while exporting derived tables.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}
