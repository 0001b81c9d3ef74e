//! Session initialization errors.

use thiserror::Error;

/// Errors raised while initializing or recreating the model session.
///
/// Cloneable because every caller waiting on the same in-flight
/// initialization receives the same outcome.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    #[error("Language model unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to load system prompts: {0}")]
    PromptsUnavailable(String),

    #[error("Selected system prompt is undefined for level {0}")]
    MissingProfile(String),

    #[error("Failed to read preferences: {0}")]
    Preferences(String),

    #[error("Session creation failed: {0}")]
    Creation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_profile_names_level() {
        let err = SessionError::MissingProfile("7".to_string());
        assert!(err.to_string().contains("level 7"));
    }

    #[test]
    fn test_prompts_unavailable() {
        let err = SessionError::PromptsUnavailable("No response".to_string());
        assert!(err.to_string().contains("system prompts"));
        assert!(err.to_string().contains("No response"));
    }

    #[test]
    fn test_all_variants_display() {
        let errors = vec![
            SessionError::Unavailable("a".to_string()),
            SessionError::PromptsUnavailable("b".to_string()),
            SessionError::MissingProfile("c".to_string()),
            SessionError::Preferences("d".to_string()),
            SessionError::Creation("e".to_string()),
        ];
        for err in errors {
            assert!(!err.to_string().is_empty());
        }
    }
}
