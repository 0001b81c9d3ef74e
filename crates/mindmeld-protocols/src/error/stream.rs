//! Streaming completion errors.

use thiserror::Error;

/// Terminal outcome of a retried streaming completion.
///
/// Per-attempt failures (timeouts, stream errors, empty output) are handled
/// inside the retry loop and never surface on their own.
#[derive(Debug, Clone, Error)]
pub enum StreamError {
    #[error("Failed to get a non-empty streaming response after {attempts} attempts")]
    Exhausted {
        attempts: u32,
        last_error: Option<String>,
    },

    #[error("Invalid stream options: {0}")]
    InvalidOptions(String),
}
