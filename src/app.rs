//! Wiring of the model backend, handlers and rewrite controller.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use tracing::{info, warn};

use mindmeld_config::{Config, ConfigLoader, ConfigValidator};
use mindmeld_dom::Document;
use mindmeld_protocols::preferences::SIMPLIFICATION_LEVEL;
use mindmeld_protocols::{LanguageModel, PreferenceStore, ProfileKey};
use mindmeld_provider_ollama::OllamaModel;
use mindmeld_runtime::{
    BackgroundHandler, ChannelPromptSource, ContentHandler, FilePreferenceStore,
    MemoryPreferenceStore, RetryConfig, RewriteController, RewriteSettings, Router,
    SessionManager,
};

/// Load the configuration, logging validation warnings.
pub(crate) fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(ConfigLoader::default_path);
    let config = ConfigLoader::load_or_default(&path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;

    let warnings = ConfigValidator::validate(&config).into_result()?;
    for warning in warnings {
        warn!(path = %warning.path, "{}", warning.message);
    }
    Ok(config)
}

/// Preference store named by the configuration.
pub(crate) fn preference_store(config: &Config) -> FilePreferenceStore {
    FilePreferenceStore::new(ConfigLoader::expand_path(&config.preferences.path))
}

/// Build the language model selected in the configuration.
pub(crate) fn build_model(config: &Config) -> anyhow::Result<Arc<dyn LanguageModel>> {
    match config.model.provider.as_str() {
        "ollama" => {
            let model = OllamaModel::new(&config.model)?;
            info!(endpoint = %config.model.endpoint, model = model.model_name(), "Using Ollama");
            Ok(Arc::new(model))
        }
        other => bail!("Unsupported model provider: {other}"),
    }
}

/// Both contexts wired together around one page.
pub(crate) struct App {
    pub router: Arc<Router>,
    pub controller: Arc<RewriteController>,
}

impl App {
    /// Wire the contexts for `page`.
    ///
    /// `profile` overrides the stored level for this run only.
    pub(crate) fn new(
        config: &Config,
        page: Document,
        profile: Option<ProfileKey>,
    ) -> anyhow::Result<Self> {
        let model = build_model(config)?;
        let background = Arc::new(BackgroundHandler::builtin());
        let prompts = Arc::new(ChannelPromptSource::new(background.clone()));

        let preferences: Arc<dyn PreferenceStore> = match profile {
            Some(key) => Arc::new(MemoryPreferenceStore::with_values([(
                SIMPLIFICATION_LEVEL,
                key.level(),
            )])),
            None => Arc::new(preference_store(config)),
        };

        let sessions = Arc::new(SessionManager::new(model, prompts, preferences));
        let controller = Arc::new(RewriteController::new(
            sessions,
            RetryConfig::from(&config.retry),
            RewriteSettings::from_config(config),
        ));
        let content = Arc::new(ContentHandler::new(controller.clone(), page));

        Ok(Self {
            router: Arc::new(Router::new(background, content)),
            controller,
        })
    }

    /// Snapshot of the page as HTML.
    pub(crate) async fn page_html(&self) -> String {
        self.router.content().page().lock().await.html()
    }
}

/// Read and parse an HTML file.
pub(crate) async fn read_page(path: &Path) -> anyhow::Result<Document> {
    let html = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(Document::parse(&html))
}

/// Write `html` to `output`, or stdout when no path is given.
pub(crate) async fn write_output(output: Option<&Path>, html: &str) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            tokio::fs::write(path, html)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), "Page written");
        }
        None => println!("{html}"),
    }
    Ok(())
}
