//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::Config;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Convert the first error into a [`ConfigError`].
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        match self.errors.into_iter().next() {
            Some(error) => Err(ConfigError::InvalidValue {
                field: error.path,
                message: error.message,
            }),
            None => Ok(self.warnings),
        }
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_model(config, &mut result);
        Self::validate_rewrite(config, &mut result);
        Self::validate_stream(config, &mut result);
        Self::validate_retry(config, &mut result);

        result
    }

    fn validate_model(config: &Config, result: &mut ValidationResult) {
        let endpoint = &config.model.endpoint;
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            result.add_error(ValidationError::new(
                "model.endpoint",
                "endpoint must start with http:// or https://",
            ));
        }

        if config.model.model.trim().is_empty() {
            result.add_warning(ValidationWarning::new(
                "model.model",
                "Model name is empty, the backend default will be used",
            ));
        }

        if config.model.request_timeout_secs == 0 {
            result.add_error(ValidationError::new(
                "model.request_timeout_secs",
                "request_timeout_secs must be greater than 0",
            ));
        }
    }

    fn validate_rewrite(config: &Config, result: &mut ValidationResult) {
        if config.rewrite.max_chunk_tokens == 0 {
            result.add_error(ValidationError::new(
                "rewrite.max_chunk_tokens",
                "max_chunk_tokens must be greater than 0",
            ));
        }

        if config.rewrite.max_chunk_tokens > 4000 {
            result.add_warning(ValidationWarning::new(
                "rewrite.max_chunk_tokens",
                "max_chunk_tokens is very high (>4000), small on-device models may truncate",
            ));
        }

        if config.rewrite.max_extract_chars == 0 {
            result.add_error(ValidationError::new(
                "rewrite.max_extract_chars",
                "max_extract_chars must be greater than 0",
            ));
        }
    }

    fn validate_stream(config: &Config, result: &mut ValidationResult) {
        if config.stream.max_attempts == 0 {
            result.add_error(ValidationError::new(
                "stream.max_attempts",
                "max_attempts must be at least 1",
            ));
        }

        if config.stream.generate_max_attempts == 0 {
            result.add_error(ValidationError::new(
                "stream.generate_max_attempts",
                "generate_max_attempts must be at least 1",
            ));
        }

        if config.stream.timeout_ms == 0 || config.stream.generate_timeout_ms == 0 {
            result.add_error(ValidationError::new(
                "stream.timeout_ms",
                "timeouts must be greater than 0",
            ));
        }

        if config.stream.stop_sequences.iter().any(|s| s.is_empty()) {
            result.add_error(ValidationError::new(
                "stream.stop_sequences",
                "stop sequences cannot be empty strings",
            ));
        }
    }

    fn validate_retry(config: &Config, result: &mut ValidationResult) {
        if config.retry.backoff_multiplier < 1.0 {
            result.add_error(ValidationError::new(
                "retry.backoff_multiplier",
                "backoff_multiplier must be at least 1.0",
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
