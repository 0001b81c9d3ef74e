//! User preference store protocol.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::PreferenceError;
use crate::profile::ProfileKey;

/// Selected instruction profile level (`"1"`, `"2"` or `"3"`).
pub const SIMPLIFICATION_LEVEL: &str = "simplificationLevel";
/// What the comparison view optimizes for.
pub const OPTIMIZE_FOR: &str = "optimizeFor";
/// Whether the reading font is enabled.
pub const FONT_ENABLED: &str = "fontEnabled";

pub const KNOWN_KEYS: [&str; 3] = [SIMPLIFICATION_LEVEL, OPTIMIZE_FOR, FONT_ENABLED];

/// Asynchronous key-value preference storage.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, PreferenceError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError>;
}

/// Typed snapshot of the known preference keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    /// Raw level value; `None` when never chosen.
    pub simplification_level: Option<String>,
    pub optimize_for: String,
    pub font_enabled: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            simplification_level: None,
            optimize_for: "general".to_string(),
            font_enabled: false,
        }
    }
}

impl Preferences {
    /// Read every known key from `store`, filling defaults for absent ones.
    pub async fn load(store: &dyn PreferenceStore) -> Result<Self, PreferenceError> {
        let defaults = Self::default();
        Ok(Self {
            simplification_level: store.get(SIMPLIFICATION_LEVEL).await?,
            optimize_for: store
                .get(OPTIMIZE_FOR)
                .await?
                .unwrap_or(defaults.optimize_for),
            font_enabled: store
                .get(FONT_ENABLED)
                .await?
                .map(|v| v == "true")
                .unwrap_or(defaults.font_enabled),
        })
    }

    /// Level used by the rewrite pipeline; unset means energize.
    pub fn rewrite_level(&self) -> &str {
        self.simplification_level
            .as_deref()
            .unwrap_or(ProfileKey::Energize.level())
    }
}
