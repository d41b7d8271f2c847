//! Error types for cost persistence and reporting.

use thiserror::Error;

/// Failures surfaced by the store and the report aggregator.
#[derive(Error, Debug)]
pub enum CostError {
    /// The persistence backend could not be initialized
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// A specific read or write failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Malformed input
    #[error("Validation error: {0}")]
    Validation(String),
}

impl CostError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::StorageUnavailable(_))
    }
}

impl From<serde_json::Error> for CostError {
    fn from(err: serde_json::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<fjall::Error> for CostError {
    fn from(err: fjall::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

pub type CostResult<T> = Result<T, CostError>;
