use super::*;

#[test]
fn test_request_unit_action_deserialization() {
    let request = Request::from_json(r#"{"action":"simplify"}"#).unwrap();
    assert_eq!(request, Request::Simplify);

    let request = Request::from_json(r#"{"action":"getSystemPrompts"}"#).unwrap();
    assert_eq!(request, Request::GetSystemPrompts);
}

#[test]
fn test_request_generate_deserialization() {
    let request = Request::from_json(r#"{"action":"generateAIResponse","prompt":"hi"}"#).unwrap();
    assert_eq!(
        request,
        Request::GenerateAiResponse {
            prompt: "hi".to_string()
        }
    );
}

#[test]
fn test_request_serialization_uses_action_tag() {
    let json = serde_json::to_value(Request::ExtractText).unwrap();
    assert_eq!(json, serde_json::json!({"action": "extractText"}));
}

#[test]
fn test_request_unknown_action() {
    let err = Request::from_json(r#"{"action":"dance"}"#).unwrap_err();
    assert!(matches!(err, ChannelError::InvalidMessage(_)));
}

#[test]
fn test_request_action_names() {
    assert_eq!(Request::Simplify.action(), "simplify");
    assert_eq!(
        Request::GenerateAiResponse {
            prompt: String::new()
        }
        .action(),
        "generateAIResponse"
    );
}

#[test]
fn test_response_ok_omits_empty_fields() {
    let json = serde_json::to_string(&Response::ok()).unwrap();
    assert_eq!(json, r#"{"success":true}"#);
}

#[test]
fn test_response_failure_shape() {
    let json = serde_json::to_value(Response::failure("Already simplifying")).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"success": false, "error": "Already simplifying"})
    );
}

#[test]
fn test_response_with_prompts() {
    let mut prompts = SystemPrompts::new();
    prompts.insert("1".to_string(), "calm".to_string());
    let json = serde_json::to_value(Response::ok().with_prompts(prompts)).unwrap();
    assert_eq!(json["prompts"]["1"], "calm");
}

#[test]
fn test_response_deserialize_partial() {
    let response: Response = serde_json::from_str(r#"{"success":true,"text":"abc"}"#).unwrap();
    assert!(response.success);
    assert_eq!(response.text.as_deref(), Some("abc"));
    assert!(response.output.is_none());
}

#[test]
fn test_into_result_success() {
    let response = Response::ok().with_output("done");
    assert_eq!(response.into_result().unwrap().output.as_deref(), Some("done"));
}

#[test]
fn test_into_result_failure() {
    let err = Response::unknown_action().into_result().unwrap_err();
    assert!(matches!(err, ChannelError::Rejected(ref msg) if msg == "Unknown action"));
}

#[test]
fn test_into_result_failure_without_error() {
    let err = Response::default().into_result().unwrap_err();
    assert!(matches!(err, ChannelError::NoResponse));
}
