//! Messaging and preference-store errors.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ChannelError {
    #[error("No response")]
    NoResponse,

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Invalid message: {0}")]
    InvalidMessage(String),
}

#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid preference file: {0}")]
    Parse(#[from] serde_json::Error),
}
