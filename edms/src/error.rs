//! Error types for metadata reconciliation

use mayan_client::MayanError;
use thiserror::Error;

/// Reconciliation error
///
/// Every variant aborts the current call. Writes issued before the failure
/// stay applied.
#[derive(Debug, Error)]
pub enum DecorateError {
    /// Transport or remote failure from the backend
    #[error(transparent)]
    Client(#[from] MayanError),

    /// Key matches neither an attached entry nor an available metadata type
    #[error("no such metadata key: {0}")]
    UnknownMetadataKey(String),

    /// Reserved directive carries a value of the wrong shape
    #[error("invalid value for {key}: {reason}")]
    InvalidDirective { key: String, reason: String },
}

impl DecorateError {
    /// Whether the caller's input is at fault (as opposed to the backend).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            DecorateError::UnknownMetadataKey(_) | DecorateError::InvalidDirective { .. }
        )
    }
}

/// Result type for reconciliation
pub type Result<T> = std::result::Result<T, DecorateError>;
