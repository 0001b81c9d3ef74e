//! Rewrite pass errors.

use thiserror::Error;

use super::{SessionError, StreamError};

/// Errors reported to the caller of a rewrite pass or a single-shot
/// completion.
#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("Already simplifying")]
    Busy,

    #[error(transparent)]
    Initialization(#[from] SessionError),

    #[error("No article paragraphs found")]
    NoContent,

    #[error(transparent)]
    Stream(#[from] StreamError),
}

impl RewriteError {
    /// Whether the error came from the model capability being absent.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, RewriteError::Initialization(SessionError::Unavailable(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_busy_message() {
        assert_eq!(RewriteError::Busy.to_string(), "Already simplifying");
    }

    #[test]
    fn test_no_content_message() {
        assert_eq!(RewriteError::NoContent.to_string(), "No article paragraphs found");
    }

    #[test]
    fn test_from_session_error_is_transparent() {
        let err: RewriteError = SessionError::Creation("boom".to_string()).into();
        assert_eq!(err.to_string(), "Session creation failed: boom");
        assert!(!err.is_unavailable());
    }

    #[test]
    fn test_unavailable_detected() {
        let err: RewriteError = SessionError::Unavailable("absent".to_string()).into();
        assert!(err.is_unavailable());
    }

    #[test]
    fn test_from_stream_error() {
        let err: RewriteError = StreamError::Exhausted {
            attempts: 2,
            last_error: Some("timeout".to_string()),
        }
        .into();
        assert!(err.to_string().contains("after 2 attempts"));
    }
}
