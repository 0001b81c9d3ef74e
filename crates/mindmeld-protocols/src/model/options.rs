//! Model parameters and session options.

use serde::{Deserialize, Serialize};

/// Whether the language-model capability can be used in this context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    /// Ready to create sessions.
    Available,
    /// Reachable, but the model must be fetched before first use.
    /// Creating a session performs the fetch.
    Downloadable,
    /// Not present at all.
    Unavailable,
}

impl Availability {
    /// Whether a session can be created, possibly after a download.
    pub fn is_usable(&self) -> bool {
        !matches!(self, Availability::Unavailable)
    }
}

/// Default sampling parameters advertised by the model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelParams {
    pub default_temperature: f32,
    pub default_top_k: u32,
}

/// Configuration a session is bound to for its whole life.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionOptions {
    pub temperature: f32,
    pub top_k: u32,
    pub system_prompt: String,
}

impl SessionOptions {
    /// Build options from the model defaults and a fixed system directive.
    pub fn from_params(params: &ModelParams, system_prompt: impl Into<String>) -> Self {
        Self {
            temperature: params.default_temperature,
            top_k: params.default_top_k,
            system_prompt: system_prompt.into(),
        }
    }
}

#[cfg(test)]
#[path = "options_tests.rs"]
mod tests;
