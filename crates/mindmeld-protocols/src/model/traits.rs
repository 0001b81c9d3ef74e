//! Language-model capability traits.

use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use futures::Stream;
use tokio_util::sync::CancellationToken;

use super::{Availability, ModelParams, SessionOptions};
use crate::error::ModelError;

/// The on-device model capability: discovers parameters and creates
/// sessions.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Returns the backend ID.
    fn id(&self) -> &str;

    /// Reports whether sessions can be created.
    async fn availability(&self) -> Availability;

    /// Default sampling parameters.
    async fn params(&self) -> Result<ModelParams, ModelError>;

    /// Create a session bound to `options`.
    ///
    /// A [`Downloadable`](Availability::Downloadable) model is fetched
    /// first; the call returns once the session can answer prompts.
    async fn create(&self, options: SessionOptions) -> Result<Arc<dyn ModelSession>, ModelError>;
}

/// A live model session.
#[async_trait]
pub trait ModelSession: Send + Sync {
    /// The configuration this session was created with.
    fn options(&self) -> &SessionOptions;

    /// Start a streamed completion.
    ///
    /// The returned stream yields text fragments until exhausted. Producers
    /// should stop yielding once `cancel` fires; consumers may also simply
    /// drop the stream.
    async fn prompt_streaming(
        &self,
        prompt: &str,
        cancel: CancellationToken,
    ) -> Result<FragmentStream, ModelError>;
}

/// Stream of completion text fragments.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, ModelError>> + Send>>;
