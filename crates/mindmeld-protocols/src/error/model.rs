//! Language-model capability errors.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ModelError {
    #[error("Language model unavailable: {0}")]
    Unavailable(String),

    #[error("Session destroyed: {0}")]
    SessionDestroyed(String),

    #[error("Session creation failed: {0}")]
    Creation(String),

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ModelError {
    /// Whether the error says the underlying session is gone and must be
    /// recreated before another prompt can succeed.
    pub fn is_session_destroyed(&self) -> bool {
        match self {
            ModelError::SessionDestroyed(_) => true,
            other => other.to_string().to_lowercase().contains("destroyed"),
        }
    }
}
