//! Ollama language model backend for MindMeld.
//!
//! Talks to a local Ollama server: `/api/tags` for availability and
//! `/api/generate` for streamed completions.

mod api;
mod parser;
mod provider;

pub use provider::{OllamaModel, OllamaSession};
