//! Request/response protocol between the privileged context, the content
//! context and the popup.
//!
//! Requests are a tagged union over the `action` field; responses always
//! carry `success` plus whichever payload the action produces.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ChannelError;
use crate::profile::SystemPrompts;

/// A request sent to a context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum Request {
    /// Fetch the instruction profiles (privileged context).
    #[serde(rename = "getSystemPrompts")]
    GetSystemPrompts,
    /// Run the full rewrite pipeline on the page.
    #[serde(rename = "simplify")]
    Simplify,
    /// Plain-text extraction for comparison.
    #[serde(rename = "extractText")]
    ExtractText,
    /// Single-shot completion outside the rewrite pipeline.
    #[serde(rename = "generateAIResponse")]
    GenerateAiResponse { prompt: String },
}

impl Request {
    /// Parse a JSON request.
    pub fn from_json(json: &str) -> Result<Self, ChannelError> {
        serde_json::from_str(json).map_err(|e| ChannelError::InvalidMessage(e.to_string()))
    }

    pub fn action(&self) -> &'static str {
        match self {
            Request::GetSystemPrompts => "getSystemPrompts",
            Request::Simplify => "simplify",
            Request::ExtractText => "extractText",
            Request::GenerateAiResponse { .. } => "generateAIResponse",
        }
    }
}

/// Response to a [`Request`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompts: Option<SystemPrompts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Default::default()
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }

    pub fn unknown_action() -> Self {
        Self::failure("Unknown action")
    }

    pub fn with_prompts(mut self, prompts: SystemPrompts) -> Self {
        self.prompts = Some(prompts);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Turn an unsuccessful response into an error.
    pub fn into_result(self) -> Result<Self, ChannelError> {
        if self.success {
            Ok(self)
        } else {
            match self.error {
                Some(error) => Err(ChannelError::Rejected(error)),
                None => Err(ChannelError::NoResponse),
            }
        }
    }
}

/// A context able to answer requests.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, request: Request) -> Response;
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
