//! Domain-level error taxonomy for sitetox.

use sitetox_reasoning::ReasoningError;
use sitetox_state::StoreError;

/// sitetox domain errors.
#[derive(Debug, thiserror::Error)]
pub enum GraderError {
    #[error("case details not found: {0}")]
    CaseNotFound(String),

    #[error("invalid case catalog: {0}")]
    Catalog(String),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    #[error("reasoning service error: {0}")]
    Reasoning(#[from] ReasoningError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for sitetox domain operations.
pub type Result<T> = std::result::Result<T, GraderError>;
