use super::*;

#[test]
fn test_availability_usable() {
    assert!(Availability::Available.is_usable());
    assert!(Availability::Downloadable.is_usable());
    assert!(!Availability::Unavailable.is_usable());
}

#[test]
fn test_availability_serialization() {
    let json = serde_json::to_string(&Availability::Downloadable).unwrap();
    assert_eq!(json, "\"downloadable\"");
}

#[test]
fn test_session_options_from_params() {
    let params = ModelParams {
        default_temperature: 0.7,
        default_top_k: 8,
    };
    let options = SessionOptions::from_params(&params, "Be calm");
    assert_eq!(options.temperature, 0.7);
    assert_eq!(options.top_k, 8);
    assert_eq!(options.system_prompt, "Be calm");
}

#[test]
fn test_model_params_camel_case() {
    let params = ModelParams {
        default_temperature: 1.0,
        default_top_k: 3,
    };
    let json = serde_json::to_value(params).unwrap();
    assert_eq!(json["defaultTemperature"], 1.0);
    assert_eq!(json["defaultTopK"], 3);
}

#[test]
fn test_session_options_roundtrip_fields() {
    let json = r#"{"temperature":0.5,"topK":4,"systemPrompt":"x"}"#;
    let options: SessionOptions = serde_json::from_str(json).unwrap();
    assert_eq!(options.top_k, 4);
    assert_eq!(options.system_prompt, "x");
}
