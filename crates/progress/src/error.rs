//! Error types for evaluation services.

use kpiboard_core::IndicatorId;
use kpiboard_storage::StorageError;

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, ProgressError>;

/// Errors raised by services that read or write the store.
#[derive(Debug, thiserror::Error)]
pub enum ProgressError {
    /// Underlying store failed
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// No indicator with this id
    #[error("indicator not found: {0}")]
    IndicatorNotFound(IndicatorId),
}
