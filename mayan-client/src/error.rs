//! Error types for the mayan-edms client

use thiserror::Error;

/// Client error
#[derive(Debug, Error)]
pub enum MayanError {
    /// Connection failure or a response that breaks the API's shape
    #[error("Transport failure: {0}")]
    Transport(String),

    /// Server answered with a non-success status
    #[error("Remote write failed with status {status}: {body}")]
    RemoteWrite { status: u16, body: String },

    /// Connection settings are unusable
    #[error("Configuration error: {0}")]
    Config(String),
}

impl MayanError {
    /// Build a protocol-violation error for `path`.
    pub(crate) fn protocol(path: &str, detail: impl std::fmt::Display) -> Self {
        MayanError::Transport(format!("protocol violation at {}: {}", path, detail))
    }
}

impl From<reqwest::Error> for MayanError {
    fn from(err: reqwest::Error) -> Self {
        MayanError::Transport(err.to_string())
    }
}

impl From<url::ParseError> for MayanError {
    fn from(err: url::ParseError) -> Self {
        MayanError::Config(err.to_string())
    }
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, MayanError>;
