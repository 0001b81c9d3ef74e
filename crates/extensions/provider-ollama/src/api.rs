//! Ollama API types.

use serde::{Deserialize, Serialize};

/// `POST /api/generate` body.
#[derive(Debug, Serialize)]
pub struct GenerateRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub system: &'a str,
    pub stream: bool,
    pub options: GenerateOptions,
}

/// Sampling options.
#[derive(Debug, Serialize)]
pub struct GenerateOptions {
    pub temperature: f32,
    pub top_k: u32,
}

/// One NDJSON line of a streamed generation.
#[derive(Debug, Default, Deserialize)]
pub struct GenerateChunk {
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// `GET /api/tags` response.
#[derive(Debug, Deserialize)]
pub struct TagsResponse {
    #[serde(default)]
    pub models: Vec<TagModel>,
}

/// A locally installed model.
#[derive(Debug, Deserialize)]
pub struct TagModel {
    pub name: String,
}

impl TagsResponse {
    /// Whether `model` is installed. A name without a tag means `:latest`.
    pub fn contains(&self, model: &str) -> bool {
        let wanted = with_tag(model);
        self.models.iter().any(|m| with_tag(&m.name) == wanted)
    }
}

fn with_tag(name: &str) -> String {
    if name.contains(':') {
        name.to_string()
    } else {
        format!("{name}:latest")
    }
}

/// `POST /api/pull` body.
#[derive(Debug, Serialize)]
pub struct PullRequest<'a> {
    pub model: &'a str,
    pub stream: bool,
}

/// Final `POST /api/pull` response when not streaming.
#[derive(Debug, Deserialize)]
pub struct PullResponse {
    #[serde(default)]
    pub status: String,
}

/// Error body returned with non-success statuses.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
