use super::*;

use crate::controller::RewriteSettings;
use crate::preferences::MemoryPreferenceStore;
use crate::retry::RetryConfig;
use crate::session::SessionManager;
use crate::testing::{ScriptedModel, Step};

const PAGE: &str = "<html><head></head><body><main>\
    <p>Tidal pools hold small worlds of crabs, snails and bright green algae.</p>\
    <p>Visit at low tide and step carefully so the creatures stay undisturbed.</p>\
    </main></body></html>";

/// Router wired the way the binary wires it: the session manager reads its
/// prompts from the background handler.
fn router(model: Arc<ScriptedModel>) -> Router {
    let background = Arc::new(BackgroundHandler::builtin());
    let sessions = Arc::new(SessionManager::new(
        model,
        Arc::new(ChannelPromptSource::new(background.clone())),
        Arc::new(MemoryPreferenceStore::new()),
    ));
    let controller = Arc::new(RewriteController::new(
        sessions,
        RetryConfig::default(),
        RewriteSettings::default(),
    ));
    let content = Arc::new(ContentHandler::new(controller, Document::parse(PAGE)));
    Router::new(background, content)
}

#[test]
fn test_builtin_prompts_cover_every_profile() {
    let prompts = builtin_system_prompts();
    assert_eq!(prompts.len(), 3);
    for key in ProfileKey::ALL {
        let prompt = &prompts[key.level()];
        assert!(prompt.starts_with("Minimal edits only."));
    }
    assert!(prompts["1"].contains("relaxed"));
    assert!(prompts["2"].contains("clearly"));
    assert!(prompts["3"].contains("energized"));
}

#[tokio::test]
async fn test_background_answers_prompts_only() {
    let background = BackgroundHandler::builtin();

    let response = background.handle(Request::GetSystemPrompts).await;
    assert!(response.success);
    assert_eq!(response.prompts.unwrap().len(), 3);

    let response = background.handle(Request::Simplify).await;
    assert!(!response.success);
    assert_eq!(response.error.as_deref(), Some("Unknown action"));
}

#[tokio::test]
async fn test_channel_prompt_source() {
    let source = ChannelPromptSource::new(Arc::new(BackgroundHandler::builtin()));
    let prompts = source.system_prompts().await.unwrap();
    assert_eq!(prompts, builtin_system_prompts());
}

#[tokio::test]
async fn test_channel_prompt_source_reports_rejection() {
    struct Silent;

    #[async_trait]
    impl MessageHandler for Silent {
        async fn handle(&self, _request: Request) -> Response {
            Response::unknown_action()
        }
    }

    let source = ChannelPromptSource::new(Arc::new(Silent));
    let err = source.system_prompts().await.unwrap_err();
    assert!(matches!(err, ChannelError::Rejected(message) if message == "Unknown action"));
}

#[tokio::test]
async fn test_router_simplify_and_extract() {
    let model = Arc::new(ScriptedModel::new());
    model.script.push(Step::reply("Pools are tiny worlds.\n\nTread softly."));
    let router = router(model);

    let response = router.handle(Request::Simplify).await;
    assert!(response.success, "{:?}", response.error);

    let page = router.content().page().lock().await;
    assert!(page.html().contains("Pools are tiny worlds."));
    drop(page);

    // The rewritten paragraphs are too short to be candidates, so extraction
    // falls back to the visible body text.
    let response = router.handle(Request::ExtractText).await;
    assert!(response.success);
    assert_eq!(
        response.text.as_deref(),
        Some("Pools are tiny worlds.\nTread softly.")
    );
}

#[tokio::test]
async fn test_router_generate() {
    let model = Arc::new(ScriptedModel::new());
    model.script.push(Step::reply("Page A reads calmer."));
    let router = router(model);

    let response = router
        .handle(Request::GenerateAiResponse {
            prompt: "Which is calmer?".to_string(),
        })
        .await;
    assert_eq!(response.output.as_deref(), Some("Page A reads calmer."));
}

#[tokio::test]
async fn test_simplify_failure_is_reported() {
    let model = Arc::new(ScriptedModel::new());
    model.set_availability(mindmeld_protocols::Availability::Unavailable);
    let router = router(model);

    let response = router.handle(Request::Simplify).await;
    assert!(!response.success);
    assert!(response.error.unwrap().contains("unavailable"));
}

#[tokio::test]
async fn test_content_rejects_prompt_requests() {
    let model = Arc::new(ScriptedModel::new());
    let router = router(model);
    let response = router.content().handle(Request::GetSystemPrompts).await;
    assert_eq!(response, Response::unknown_action());
}

#[tokio::test]
async fn test_dispatch_json() {
    let background = BackgroundHandler::builtin();

    let response = dispatch_json(&background, r#"{"action":"getSystemPrompts"}"#).await;
    assert!(response.success);

    let response = dispatch_json(&background, r#"{"action":"dance"}"#).await;
    assert_eq!(response.error.as_deref(), Some("Unknown action"));

    let response = dispatch_json(&background, "not json").await;
    assert!(!response.success);
    assert!(response.error.unwrap().contains("Invalid message"));

    let response = dispatch_json(&background, r#"{"action":"generateAIResponse"}"#).await;
    assert!(response.error.unwrap().contains("prompt"));
}
