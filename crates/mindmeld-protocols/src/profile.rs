//! Instruction profiles.
//!
//! A profile is a fixed system directive selecting the rewrite tone. Profiles
//! are stored under their preference level value (`"1"`, `"2"`, `"3"`).

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ChannelError;

/// Map from preference level value to instruction string.
pub type SystemPrompts = BTreeMap<String, String>;

/// One of the three rewrite tones.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKey {
    Calm,
    Clarity,
    #[default]
    Energize,
}

impl ProfileKey {
    pub const ALL: [ProfileKey; 3] = [ProfileKey::Calm, ProfileKey::Clarity, ProfileKey::Energize];

    /// Preference value stored under `simplificationLevel`.
    pub fn level(&self) -> &'static str {
        match self {
            ProfileKey::Calm => "1",
            ProfileKey::Clarity => "2",
            ProfileKey::Energize => "3",
        }
    }

    pub fn from_level(level: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.level() == level)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ProfileKey::Calm => "calm",
            ProfileKey::Clarity => "clarity",
            ProfileKey::Energize => "energize",
        }
    }

    /// Label shown next to the level selector.
    pub fn label(&self) -> &'static str {
        match self {
            ProfileKey::Calm => "Calm",
            ProfileKey::Clarity => "Clarity",
            ProfileKey::Energize => "Spark",
        }
    }
}

impl fmt::Display for ProfileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown profile: {0}")]
pub struct UnknownProfile(pub String);

impl FromStr for ProfileKey {
    type Err = UnknownProfile;

    /// Accepts the level value, the profile name or its label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|key| {
                key.level() == needle || key.name() == needle || key.label().to_lowercase() == needle
            })
            .ok_or_else(|| UnknownProfile(s.to_string()))
    }
}

/// A resolved instruction profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionProfile {
    pub key: ProfileKey,
    pub instruction: String,
}

impl InstructionProfile {
    /// Look up the instruction stored for a preference level.
    pub fn resolve(prompts: &SystemPrompts, level: &str) -> Option<Self> {
        let key = ProfileKey::from_level(level)?;
        let instruction = prompts.get(level)?;
        if instruction.trim().is_empty() {
            return None;
        }
        Some(Self {
            key,
            instruction: instruction.clone(),
        })
    }
}

/// Supplier of the instruction profiles, normally the privileged context.
#[async_trait]
pub trait PromptSource: Send + Sync {
    async fn system_prompts(&self) -> Result<SystemPrompts, ChannelError>;
}

#[cfg(test)]
#[path = "profile_tests.rs"]
mod tests;
