//! Message handlers for the privileged and content contexts.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use mindmeld_dom::Document;
use mindmeld_protocols::{
    ChannelError, MessageHandler, ProfileKey, PromptSource, Request, Response, SystemPrompts,
};

use crate::controller::RewriteController;

const CALM_PROMPT: &str = "Minimal edits only. You are helping the user feel relaxed and reduce overwhelm. Preserve all facts, names, places, and quotes exactly. Make only light stylistic changes to reduce cognitive load: shorten long sentences where necessary, replace harsh or technical words with gentler synonyms, and prefer short sentences. Use second-person where it fits naturally, but do not invent or remove factual content. Do NOT add humor inside the rewritten paragraph. After the rewritten text,sometimes on a new line, add a single short light-hearted calm comment (separate from main text) such as: 'You’re doing great — breathe and take it slow 🌿'.";

const CLARITY_PROMPT: &str = "Minimal edits only. You are helping the user understand the webpage clearly and take away actionable insights. Preserve all facts, names, places, and quotes exactly. Reformat lightly into short structured chunks or bullet-style highlights if that increases clarity, but keep original wording where possible. Use second-person phrasing sparingly and only when it improves clarity. Do NOT add humor inside the main text. After the rewritten text, sometimes on a new line, add one short clarity-focused line addressing the user (e.g., 'Now you can easily see the main point 🔍'). Avoid changing technical terms or claims; only rephrase for clarity.";

const ENERGIZE_PROMPT: &str = "Minimal edits only. You are helping the user feel energized and motivated. Preserve all facts, names, places, and quotes exactly. Make small energetic phrasing adjustments (shorter sentences, second-person encouragement) but do not alter or exaggerate claims. Do NOT put humor or rewards inside the main paragraph. After the rewritten paragraph, sometimes on a new line add one motivational line addressing the user (e.g., 'You’ve got this! ⚡'), or add a reward statement such as '+10 XP 🎉'. Keep the main content changes conservative to maintain credibility.";

/// The three built-in instruction profiles keyed by level.
pub fn builtin_system_prompts() -> SystemPrompts {
    [
        (ProfileKey::Calm, CALM_PROMPT),
        (ProfileKey::Clarity, CLARITY_PROMPT),
        (ProfileKey::Energize, ENERGIZE_PROMPT),
    ]
    .into_iter()
    .map(|(key, prompt)| (key.level().to_string(), prompt.to_string()))
    .collect()
}

/// The privileged context: owns the instruction profiles.
pub struct BackgroundHandler {
    prompts: SystemPrompts,
}

impl BackgroundHandler {
    pub fn new(prompts: SystemPrompts) -> Self {
        Self { prompts }
    }

    pub fn builtin() -> Self {
        Self::new(builtin_system_prompts())
    }
}

#[async_trait]
impl MessageHandler for BackgroundHandler {
    async fn handle(&self, request: Request) -> Response {
        match request {
            Request::GetSystemPrompts => {
                debug!("Serving system prompts");
                Response::ok().with_prompts(self.prompts.clone())
            }
            _ => Response::unknown_action(),
        }
    }
}

/// The content context: answers requests against one page.
pub struct ContentHandler {
    controller: Arc<RewriteController>,
    page: Arc<Mutex<Document>>,
}

impl ContentHandler {
    pub fn new(controller: Arc<RewriteController>, page: Document) -> Self {
        Self::with_shared_page(controller, Arc::new(Mutex::new(page)))
    }

    pub fn with_shared_page(controller: Arc<RewriteController>, page: Arc<Mutex<Document>>) -> Self {
        Self { controller, page }
    }

    pub fn page(&self) -> &Arc<Mutex<Document>> {
        &self.page
    }

    pub fn controller(&self) -> &Arc<RewriteController> {
        &self.controller
    }
}

#[async_trait]
impl MessageHandler for ContentHandler {
    async fn handle(&self, request: Request) -> Response {
        match request {
            Request::Simplify => match self.controller.simplify_page(&self.page).await {
                Ok(summary) => {
                    info!(replaced = summary.replaced, "Page simplified");
                    Response::ok()
                }
                Err(e) => {
                    error!(error = %e, "Simplify failed");
                    Response::failure(e.to_string())
                }
            },
            Request::ExtractText => {
                let page = self.page.lock().await;
                Response::ok().with_text(self.controller.extract_text(&page))
            }
            Request::GenerateAiResponse { prompt } => match self.controller.generate(&prompt).await {
                Ok(output) => Response::ok().with_output(output),
                Err(e) => {
                    error!(error = %e, "Generate failed");
                    Response::failure(e.to_string())
                }
            },
            Request::GetSystemPrompts => Response::unknown_action(),
        }
    }
}

/// Delivers each request to the context that owns it.
pub struct Router {
    background: Arc<BackgroundHandler>,
    content: Arc<ContentHandler>,
}

impl Router {
    pub fn new(background: Arc<BackgroundHandler>, content: Arc<ContentHandler>) -> Self {
        Self {
            background,
            content,
        }
    }

    pub fn content(&self) -> &Arc<ContentHandler> {
        &self.content
    }
}

#[async_trait]
impl MessageHandler for Router {
    async fn handle(&self, request: Request) -> Response {
        match request {
            Request::GetSystemPrompts => self.background.handle(request).await,
            other => self.content.handle(other).await,
        }
    }
}

/// Fetches instruction profiles by asking a handler for them.
pub struct ChannelPromptSource {
    handler: Arc<dyn MessageHandler>,
}

impl ChannelPromptSource {
    pub fn new(handler: Arc<dyn MessageHandler>) -> Self {
        Self { handler }
    }
}

#[async_trait]
impl PromptSource for ChannelPromptSource {
    async fn system_prompts(&self) -> Result<SystemPrompts, ChannelError> {
        let response = self.handler.handle(Request::GetSystemPrompts).await.into_result()?;
        response.prompts.ok_or(ChannelError::NoResponse)
    }
}

/// Answer one JSON-encoded request.
///
/// Requests naming an action nobody handles get `"Unknown action"`; other
/// malformed input, including a known action with bad fields, is reported
/// with the parse error.
pub async fn dispatch_json(handler: &dyn MessageHandler, line: &str) -> Response {
    match Request::from_json(line) {
        Ok(request) => {
            debug!(action = request.action(), "Dispatching request");
            handler.handle(request).await
        }
        Err(e) => {
            if names_unknown_action(line) {
                warn!(error = %e, "Unknown action");
                Response::unknown_action()
            } else {
                warn!(error = %e, "Invalid request");
                Response::failure(e.to_string())
            }
        }
    }
}

const KNOWN_ACTIONS: [&str; 4] = ["getSystemPrompts", "simplify", "extractText", "generateAIResponse"];

fn names_unknown_action(line: &str) -> bool {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(line) else {
        return false;
    };
    match value.get("action").and_then(serde_json::Value::as_str) {
        Some(action) => !KNOWN_ACTIONS.contains(&action),
        None => false,
    }
}

#[cfg(test)]
#[path = "handler_tests.rs"]
mod tests;
