use super::*;

#[test]
fn test_validate_default_config() {
    let config = Config::default();
    let result = ConfigValidator::validate(&config);
    assert!(result.is_valid());
    assert!(result.warnings.is_empty());
}

#[test]
fn test_validate_invalid_endpoint() {
    let mut config = Config::default();
    config.model.endpoint = "localhost:11434".to_string();

    let result = ConfigValidator::validate(&config);
    assert!(!result.is_valid());
    assert!(result.errors.iter().any(|e| e.path == "model.endpoint"));
}

#[test]
fn test_validate_empty_model_warning() {
    let mut config = Config::default();
    config.model.model = String::new();

    let result = ConfigValidator::validate(&config);
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "model.model"));
}

#[test]
fn test_validate_zero_budget() {
    let mut config = Config::default();
    config.rewrite.max_chunk_tokens = 0;

    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "rewrite.max_chunk_tokens"));
}

#[test]
fn test_validate_high_budget_warning() {
    let mut config = Config::default();
    config.rewrite.max_chunk_tokens = 8000;

    let result = ConfigValidator::validate(&config);
    assert!(result.is_valid());
    assert!(!result.warnings.is_empty());
}

#[test]
fn test_validate_zero_attempts() {
    let mut config = Config::default();
    config.stream.max_attempts = 0;

    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "stream.max_attempts"));
}

#[test]
fn test_validate_zero_timeout() {
    let mut config = Config::default();
    config.stream.generate_timeout_ms = 0;

    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "stream.timeout_ms"));
}

#[test]
fn test_validate_empty_stop_sequence() {
    let mut config = Config::default();
    config.stream.stop_sequences = vec![String::new()];

    let result = ConfigValidator::validate(&config);
    assert!(!result.is_valid());
}

#[test]
fn test_validate_shrinking_backoff() {
    let mut config = Config::default();
    config.retry.backoff_multiplier = 0.5;

    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "retry.backoff_multiplier"));
}

#[test]
fn test_into_result_reports_first_error() {
    let mut config = Config::default();
    config.stream.max_attempts = 0;

    let err = ConfigValidator::validate(&config).into_result().unwrap_err();
    assert!(err.to_string().contains("stream.max_attempts"));
}

#[test]
fn test_into_result_returns_warnings() {
    let mut config = Config::default();
    config.model.model = String::new();

    let warnings = ConfigValidator::validate(&config).into_result().unwrap();
    assert_eq!(warnings.len(), 1);
}

#[test]
fn test_validation_result_add() {
    let mut result = ValidationResult::default();
    assert!(result.is_valid());

    result.add_warning(ValidationWarning::new("a", "warn"));
    assert!(result.is_valid());

    result.add_error(ValidationError::new("b", "err"));
    assert!(!result.is_valid());
}
