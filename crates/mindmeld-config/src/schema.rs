//! Configuration schema definitions.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub rewrite: RewriteConfig,

    #[serde(default)]
    pub stream: StreamConfig,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub preferences: PreferencesConfig,
}

/// Local model backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    #[serde(default = "default_top_k")]
    pub default_top_k: u32,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            endpoint: default_endpoint(),
            model: default_model(),
            default_temperature: default_temperature(),
            default_top_k: default_top_k(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_provider() -> String {
    "ollama".to_string()
}

fn default_endpoint() -> String {
    "http://127.0.0.1:11434".to_string()
}

fn default_model() -> String {
    "gemma3:1b".to_string()
}

fn default_temperature() -> f32 {
    0.8
}

fn default_top_k() -> u32 {
    40
}

fn default_request_timeout() -> u64 {
    120
}

/// Extraction and chunking configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewriteConfig {
    /// Estimated token budget per chunk.
    #[serde(default = "default_max_chunk_tokens")]
    pub max_chunk_tokens: usize,

    /// Paragraph-like elements shorter than this are treated as metadata.
    #[serde(default = "default_min_paragraph_chars")]
    pub min_paragraph_chars: usize,

    /// Character cap for plain-text extraction.
    #[serde(default = "default_max_extract_chars")]
    pub max_extract_chars: usize,

    /// Render model output as markdown instead of escaped text.
    #[serde(default = "default_true")]
    pub render_markdown: bool,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            max_chunk_tokens: default_max_chunk_tokens(),
            min_paragraph_chars: default_min_paragraph_chars(),
            max_extract_chars: default_max_extract_chars(),
            render_markdown: true,
        }
    }
}

fn default_max_chunk_tokens() -> usize {
    600
}

fn default_min_paragraph_chars() -> usize {
    50
}

fn default_max_extract_chars() -> usize {
    150_000
}

fn default_true() -> bool {
    true
}

/// Streaming completion configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Attempts per rewrite chunk.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Per-attempt timeout for rewrite chunks.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Attempts for single-shot completions.
    #[serde(default = "default_generate_max_attempts")]
    pub generate_max_attempts: u32,

    /// Per-attempt timeout for single-shot completions.
    #[serde(default = "default_timeout_ms")]
    pub generate_timeout_ms: u64,

    /// Substrings that end a stream early when they appear.
    #[serde(default)]
    pub stop_sequences: Vec<String>,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            timeout_ms: default_timeout_ms(),
            generate_max_attempts: default_generate_max_attempts(),
            generate_timeout_ms: default_timeout_ms(),
            stop_sequences: Vec::new(),
        }
    }
}

impl StreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn generate_timeout(&self) -> Duration {
        Duration::from_millis(self.generate_timeout_ms)
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_generate_max_attempts() -> u32 {
    2
}

fn default_timeout_ms() -> u64 {
    25_000
}

/// Backoff between failed streaming attempts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    #[serde(default = "default_jitter_ms")]
    pub jitter_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: default_base_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter_ms: default_jitter_ms(),
        }
    }
}

fn default_base_delay_ms() -> u64 {
    300
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_jitter_ms() -> u64 {
    100
}

/// Preference store location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferencesConfig {
    #[serde(default = "default_preferences_path")]
    pub path: String,
}

impl Default for PreferencesConfig {
    fn default() -> Self {
        Self {
            path: default_preferences_path(),
        }
    }
}

fn default_preferences_path() -> String {
    "~/.mindmeld/preferences.json".to_string()
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
