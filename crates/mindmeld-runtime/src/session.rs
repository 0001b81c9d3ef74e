//! Model session lifecycle.
//!
//! One persistent session per page context, created lazily on first use and
//! replaced transactionally when it is found unusable.

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::{Mutex, RwLock};
use tracing::{error, info, warn};

use mindmeld_protocols::{
    InstructionProfile, LanguageModel, ModelError, ModelSession, PreferenceStore, Preferences,
    PromptSource, SessionError, SessionOptions,
};

type InitFuture = Shared<BoxFuture<'static, Result<Arc<SessionState>, SessionError>>>;

/// An initialized session and the profile it was bound to.
pub struct SessionState {
    profile: InstructionProfile,
    session: RwLock<Arc<dyn ModelSession>>,
}

impl SessionState {
    pub fn profile(&self) -> &InstructionProfile {
        &self.profile
    }

    /// Current session handle.
    pub fn session(&self) -> Arc<dyn ModelSession> {
        self.session.read().clone()
    }

    fn replace(&self, session: Arc<dyn ModelSession>) {
        *self.session.write() = session;
    }
}

/// Owns the shared session and its in-flight initialization.
pub struct SessionManager {
    model: Arc<dyn LanguageModel>,
    prompts: Arc<dyn PromptSource>,
    preferences: Arc<dyn PreferenceStore>,
    init: Mutex<Option<InitFuture>>,
}

impl SessionManager {
    pub fn new(
        model: Arc<dyn LanguageModel>,
        prompts: Arc<dyn PromptSource>,
        preferences: Arc<dyn PreferenceStore>,
    ) -> Self {
        Self {
            model,
            prompts,
            preferences,
            init: Mutex::new(None),
        }
    }

    pub fn model(&self) -> &Arc<dyn LanguageModel> {
        &self.model
    }

    /// Initialize once; concurrent callers await the same initialization.
    ///
    /// A failed initialization is forgotten so the next call starts over.
    pub async fn ensure_initialized(&self) -> Result<Arc<SessionState>, SessionError> {
        let init = {
            let mut slot = self.init.lock();
            match slot.as_ref() {
                Some(init) => init.clone(),
                None => {
                    let init = initialize(
                        self.model.clone(),
                        self.prompts.clone(),
                        self.preferences.clone(),
                    )
                    .boxed()
                    .shared();
                    *slot = Some(init.clone());
                    init
                }
            }
        };

        let result = init.clone().await;
        if let Err(e) = &result {
            let mut slot = self.init.lock();
            if slot.as_ref().is_some_and(|current| current.ptr_eq(&init)) {
                error!(error = %e, "Session initialization failed");
                *slot = None;
            }
        }
        result
    }

    /// Build a new session with the active profile and swap it in.
    ///
    /// The previous handle stays in place unless creation succeeds.
    pub async fn recreate(&self) -> Result<Arc<dyn ModelSession>, SessionError> {
        let state = self.ensure_initialized().await?;
        info!(profile = %state.profile().key, "Recreating model session");
        let session = create_session(self.model.as_ref(), state.profile()).await?;
        state.replace(session.clone());
        Ok(session)
    }

    /// State of a completed, successful initialization.
    pub fn state(&self) -> Option<Arc<SessionState>> {
        let slot = self.init.lock();
        slot.as_ref()?.peek()?.as_ref().ok().cloned()
    }

    pub fn session(&self) -> Option<Arc<dyn ModelSession>> {
        self.state().map(|state| state.session())
    }

    pub fn profile(&self) -> Option<InstructionProfile> {
        self.state().map(|state| state.profile().clone())
    }

    /// Forget the session; the next initialization re-reads preferences.
    pub fn reset(&self) {
        *self.init.lock() = None;
    }

    /// Reset when the stored rewrite level no longer matches the active
    /// profile, so a level changed while a page is open applies to the next
    /// pass. Returns whether the session was reset.
    pub async fn reset_if_level_changed(&self) -> bool {
        let Some(state) = self.state() else {
            return false;
        };
        let preferences = match Preferences::load(self.preferences.as_ref()).await {
            Ok(preferences) => preferences,
            Err(e) => {
                warn!(error = %e, "Failed to read preferences, keeping session");
                return false;
            }
        };
        let active = state.profile().key.level();
        let stored = preferences.rewrite_level();
        if stored == active {
            return false;
        }
        info!(active, stored, "Rewrite level changed, resetting session");
        self.reset();
        true
    }
}

async fn initialize(
    model: Arc<dyn LanguageModel>,
    prompts: Arc<dyn PromptSource>,
    preferences: Arc<dyn PreferenceStore>,
) -> Result<Arc<SessionState>, SessionError> {
    info!(backend = model.id(), "Initializing model session");

    let availability = model.availability().await;
    if !availability.is_usable() {
        return Err(SessionError::Unavailable(format!(
            "backend '{}' reported {:?}",
            model.id(),
            availability
        )));
    }

    let prompts = prompts
        .system_prompts()
        .await
        .map_err(|e| SessionError::PromptsUnavailable(e.to_string()))?;
    let preferences = Preferences::load(preferences.as_ref())
        .await
        .map_err(|e| SessionError::Preferences(e.to_string()))?;

    let level = preferences.rewrite_level();
    let profile = InstructionProfile::resolve(&prompts, level)
        .ok_or_else(|| SessionError::MissingProfile(level.to_string()))?;

    let session = create_session(model.as_ref(), &profile).await?;
    info!(profile = %profile.key, "Model session initialized");

    Ok(Arc::new(SessionState {
        profile,
        session: RwLock::new(session),
    }))
}

async fn create_session(
    model: &dyn LanguageModel,
    profile: &InstructionProfile,
) -> Result<Arc<dyn ModelSession>, SessionError> {
    let params = model
        .params()
        .await
        .map_err(|e| SessionError::Creation(e.to_string()))?;
    let options = SessionOptions::from_params(&params, profile.instruction.clone());

    let session = model.create(options).await.map_err(|e| match e {
        ModelError::Unavailable(message) => SessionError::Unavailable(message),
        other => SessionError::Creation(other.to_string()),
    })?;

    info!(
        temperature = params.default_temperature,
        top_k = params.default_top_k,
        "Created model session"
    );
    Ok(session)
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
