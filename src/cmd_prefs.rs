//! Informational and preference subcommands.

use anyhow::bail;

use mindmeld_config::Config;
use mindmeld_protocols::preferences::{KNOWN_KEYS, SIMPLIFICATION_LEVEL};
use mindmeld_protocols::{PreferenceStore, Preferences, ProfileKey};
use mindmeld_runtime::{builtin_system_prompts, THEMES};

use crate::app::preference_store;
use crate::cli::PrefsAction;

/// Print the built-in instruction profiles.
pub(crate) fn prompts() -> anyhow::Result<()> {
    let prompts = builtin_system_prompts();
    for key in ProfileKey::ALL {
        let instruction = prompts.get(key.level()).map(String::as_str).unwrap_or("-");
        println!("{} ({}, level {})", key.label(), key.name(), key.level());
        println!("  {instruction}");
    }
    Ok(())
}

/// List the colour themes.
pub(crate) fn themes() -> anyhow::Result<()> {
    println!("{:<26} {:<12} {}", "NAME", "BACKGROUND", "TEXT");
    println!("{}", "-".repeat(50));
    for theme in &THEMES {
        println!(
            "{:<26} {:<12} {}",
            theme.name,
            theme.background.unwrap_or("-"),
            theme.text.unwrap_or("-")
        );
    }
    Ok(())
}

/// Handle preference subcommands.
pub(crate) async fn handle_prefs_command(config: &Config, action: PrefsAction) -> anyhow::Result<()> {
    let store = preference_store(config);
    match action {
        PrefsAction::Get { key: None } => {
            let prefs = Preferences::load(&store).await?;
            println!("{}", serde_json::to_string_pretty(&prefs)?);
        }
        PrefsAction::Get { key: Some(key) } => {
            check_key(&key)?;
            match store.get(&key).await? {
                Some(value) => println!("{value}"),
                None => println!("(unset)"),
            }
        }
        PrefsAction::Set { key, value } => {
            check_key(&key)?;
            let value = normalize(&key, &value)?;
            store.set(&key, &value).await?;
            println!("{key} = {value}");
        }
    }
    Ok(())
}

fn check_key(key: &str) -> anyhow::Result<()> {
    if !KNOWN_KEYS.contains(&key) {
        bail!("Unknown preference key: {key} (expected one of {})", KNOWN_KEYS.join(", "));
    }
    Ok(())
}

/// The level is stored as `"1"`..`"3"`; profile names and labels are accepted too.
fn normalize(key: &str, value: &str) -> anyhow::Result<String> {
    if key == SIMPLIFICATION_LEVEL {
        let profile: ProfileKey = value.parse()?;
        return Ok(profile.level().to_string());
    }
    Ok(value.to_string())
}
