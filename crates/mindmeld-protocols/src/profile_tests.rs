use super::*;

fn prompts() -> SystemPrompts {
    let mut prompts = SystemPrompts::new();
    prompts.insert("1".to_string(), "calm words".to_string());
    prompts.insert("2".to_string(), "clear words".to_string());
    prompts.insert("3".to_string(), "lively words".to_string());
    prompts
}

#[test]
fn test_levels() {
    assert_eq!(ProfileKey::Calm.level(), "1");
    assert_eq!(ProfileKey::Clarity.level(), "2");
    assert_eq!(ProfileKey::Energize.level(), "3");
}

#[test]
fn test_from_level() {
    assert_eq!(ProfileKey::from_level("2"), Some(ProfileKey::Clarity));
    assert_eq!(ProfileKey::from_level("4"), None);
}

#[test]
fn test_default_is_energize() {
    assert_eq!(ProfileKey::default(), ProfileKey::Energize);
}

#[test]
fn test_from_str_variants() {
    assert_eq!("calm".parse::<ProfileKey>().unwrap(), ProfileKey::Calm);
    assert_eq!("2".parse::<ProfileKey>().unwrap(), ProfileKey::Clarity);
    assert_eq!("Spark".parse::<ProfileKey>().unwrap(), ProfileKey::Energize);
    assert_eq!(" ENERGIZE ".parse::<ProfileKey>().unwrap(), ProfileKey::Energize);
}

#[test]
fn test_from_str_unknown() {
    let err = "loud".parse::<ProfileKey>().unwrap_err();
    assert_eq!(err, UnknownProfile("loud".to_string()));
}

#[test]
fn test_display_uses_name() {
    assert_eq!(ProfileKey::Clarity.to_string(), "clarity");
}

#[test]
fn test_resolve_profile() {
    let profile = InstructionProfile::resolve(&prompts(), "1").unwrap();
    assert_eq!(profile.key, ProfileKey::Calm);
    assert_eq!(profile.instruction, "calm words");
}

#[test]
fn test_resolve_unknown_level() {
    assert!(InstructionProfile::resolve(&prompts(), "9").is_none());
}

#[test]
fn test_resolve_missing_entry() {
    let mut prompts = prompts();
    prompts.remove("3");
    assert!(InstructionProfile::resolve(&prompts, "3").is_none());
}

#[test]
fn test_resolve_blank_instruction() {
    let mut prompts = prompts();
    prompts.insert("2".to_string(), "   ".to_string());
    assert!(InstructionProfile::resolve(&prompts, "2").is_none());
}
