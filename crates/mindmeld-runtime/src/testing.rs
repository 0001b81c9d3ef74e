//! Scripted model doubles shared by the runtime tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use mindmeld_protocols::{
    Availability, ChannelError, FragmentStream, LanguageModel, ModelError, ModelParams,
    ModelSession, PromptSource, SessionOptions, SystemPrompts,
};

use crate::preferences::MemoryPreferenceStore;
use crate::session::SessionManager;

/// What one `prompt_streaming` call does.
#[derive(Debug, Clone)]
pub(crate) enum Step {
    /// Yield the fragments, then end.
    Reply(Vec<String>),
    /// Yield the fragments, then never end.
    Hang(Vec<String>),
    /// Yield one fragment, then fail mid-stream.
    Fail(ModelError),
    /// Fail before any stream exists.
    Reject(ModelError),
}

impl Step {
    pub(crate) fn reply(text: &str) -> Self {
        Step::Reply(vec![text.to_string()])
    }

    pub(crate) fn fragments(parts: &[&str]) -> Self {
        Step::Reply(parts.iter().map(|p| p.to_string()).collect())
    }

    pub(crate) fn hang(parts: &[&str]) -> Self {
        Step::Hang(parts.iter().map(|p| p.to_string()).collect())
    }

    fn into_stream(self) -> Result<FragmentStream, ModelError> {
        match self {
            Step::Reply(parts) => Ok(stream::iter(parts.into_iter().map(Ok::<String, ModelError>)).boxed()),
            Step::Hang(parts) => Ok(stream::iter(parts.into_iter().map(Ok::<String, ModelError>))
                .chain(stream::pending())
                .boxed()),
            Step::Fail(error) => Ok(stream::iter(vec![Ok("partial ".to_string()), Err(error)]).boxed()),
            Step::Reject(error) => Err(error),
        }
    }
}

/// Queue of steps shared by every session of a [`ScriptedModel`].
#[derive(Default)]
pub(crate) struct Script {
    steps: Mutex<VecDeque<Step>>,
    fallback: Mutex<Option<Step>>,
    calls: Mutex<Vec<(usize, String)>>,
    tokens: Mutex<Vec<CancellationToken>>,
}

impl Script {
    pub(crate) fn push(&self, step: Step) {
        self.steps.lock().push_back(step);
    }

    /// Step used once the queue is empty.
    pub(crate) fn set_fallback(&self, step: Step) {
        *self.fallback.lock() = Some(step);
    }

    /// `(session id, prompt)` for every call, in order.
    pub(crate) fn calls(&self) -> Vec<(usize, String)> {
        self.calls.lock().clone()
    }

    pub(crate) fn tokens(&self) -> Vec<CancellationToken> {
        self.tokens.lock().clone()
    }

    fn next(&self, session: usize, prompt: &str, cancel: CancellationToken) -> Step {
        self.calls.lock().push((session, prompt.to_string()));
        self.tokens.lock().push(cancel);
        self.steps
            .lock()
            .pop_front()
            .or_else(|| self.fallback.lock().clone())
            .unwrap_or(Step::Reply(Vec::new()))
    }
}

pub(crate) struct ScriptedModel {
    pub(crate) script: Arc<Script>,
    availability: Mutex<Availability>,
    created: AtomicUsize,
    failing_creates: AtomicUsize,
    create_delay: Mutex<Duration>,
    options: Mutex<Vec<SessionOptions>>,
}

impl ScriptedModel {
    pub(crate) fn new() -> Self {
        Self {
            script: Arc::new(Script::default()),
            availability: Mutex::new(Availability::Available),
            created: AtomicUsize::new(0),
            failing_creates: AtomicUsize::new(0),
            create_delay: Mutex::new(Duration::ZERO),
            options: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn set_availability(&self, availability: Availability) {
        *self.availability.lock() = availability;
    }

    pub(crate) fn fail_next_creates(&self, count: usize) {
        self.failing_creates.store(count, Ordering::SeqCst);
    }

    pub(crate) fn set_create_delay(&self, delay: Duration) {
        *self.create_delay.lock() = delay;
    }

    /// Number of sessions successfully created.
    pub(crate) fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub(crate) fn created_options(&self) -> Vec<SessionOptions> {
        self.options.lock().clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    fn id(&self) -> &str {
        "scripted"
    }

    async fn availability(&self) -> Availability {
        *self.availability.lock()
    }

    async fn params(&self) -> Result<ModelParams, ModelError> {
        Ok(ModelParams {
            default_temperature: 0.7,
            default_top_k: 5,
        })
    }

    async fn create(&self, options: SessionOptions) -> Result<Arc<dyn ModelSession>, ModelError> {
        let delay = *self.create_delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let failing = self.failing_creates.load(Ordering::SeqCst);
        if failing > 0 {
            self.failing_creates.store(failing - 1, Ordering::SeqCst);
            return Err(ModelError::Creation("scripted failure".to_string()));
        }

        let id = self.created.fetch_add(1, Ordering::SeqCst) + 1;
        self.options.lock().push(options.clone());
        Ok(Arc::new(ScriptedSession {
            id,
            options,
            script: self.script.clone(),
        }))
    }
}

pub(crate) struct ScriptedSession {
    pub(crate) id: usize,
    options: SessionOptions,
    script: Arc<Script>,
}

#[async_trait]
impl ModelSession for ScriptedSession {
    fn options(&self) -> &SessionOptions {
        &self.options
    }

    async fn prompt_streaming(
        &self,
        prompt: &str,
        cancel: CancellationToken,
    ) -> Result<FragmentStream, ModelError> {
        self.script.next(self.id, prompt, cancel).into_stream()
    }
}

/// Prompt source answering from a fixed map, or failing when empty.
pub(crate) struct FixedPrompts(pub(crate) Option<SystemPrompts>);

#[async_trait]
impl PromptSource for FixedPrompts {
    async fn system_prompts(&self) -> Result<SystemPrompts, ChannelError> {
        self.0.clone().ok_or(ChannelError::NoResponse)
    }
}

pub(crate) fn builtin_prompts() -> Arc<FixedPrompts> {
    Arc::new(FixedPrompts(Some(crate::handler::builtin_system_prompts())))
}

pub(crate) fn manager(model: Arc<ScriptedModel>, preferences: MemoryPreferenceStore) -> Arc<SessionManager> {
    Arc::new(SessionManager::new(model, builtin_prompts(), Arc::new(preferences)))
}
