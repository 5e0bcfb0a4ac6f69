//! Error types for sitetox-state

use thiserror::Error;

/// Errors that can occur in the worksheet persistence layer
#[derive(Error, Debug)]
pub enum StoreError {
    /// An expected header is absent from row 1
    #[error("column '{column}' not found in header (headers seen: {seen:?})")]
    MissingColumn { column: String, seen: Vec<String> },

    /// Cell coordinates are 1-based; zero is never valid
    #[error("invalid cell position: row {row}, column {column}")]
    InvalidCell { row: usize, column: usize },

    /// Network or transport failure talking to the backend
    #[error("worksheet request failed: {0}")]
    Http(String),

    /// Backend answered with a non-success status
    #[error("worksheet API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Missing or malformed configuration
    #[error("worksheet configuration error: {0}")]
    Config(String),

    /// Response body could not be decoded
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// Fault injected by a fake backend
    #[error("injected failure: {0}")]
    Injected(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::Http(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Deserialization(err.to_string())
    }
}
