//! Ollama model and session.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use mindmeld_config::ModelConfig;
use mindmeld_protocols::{
    Availability, FragmentStream, LanguageModel, ModelError, ModelParams, ModelSession,
    SessionOptions,
};

use crate::api::{
    ErrorBody, GenerateOptions, GenerateRequest, PullRequest, PullResponse, TagsResponse,
};
use crate::parser::{parse_line, stream_error, LineDecoder};

/// Downloads take far longer than a generation request.
const PULL_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// A model served by a local Ollama instance.
pub struct OllamaModel {
    endpoint: String,
    model: String,
    params: ModelParams,
    client: reqwest::Client,
}

impl OllamaModel {
    pub fn new(config: &ModelConfig) -> Result<Self, ModelError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ModelError::Network(e.to_string()))?;

        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            params: ModelParams {
                default_temperature: config.default_temperature,
                default_top_k: config.default_top_k,
            },
            client,
        })
    }

    pub fn model_name(&self) -> &str {
        &self.model
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path)
    }

    /// Whether the model is installed locally.
    async fn installed(&self) -> Result<bool, ModelError> {
        let response = self
            .client
            .get(self.url("api/tags"))
            .send()
            .await
            .map_err(|e| ModelError::Network(e.to_string()))?;
        let tags: TagsResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ModelError::InvalidResponse(e.to_string()))?;
        Ok(tags.contains(&self.model))
    }

    /// Download the model and wait until Ollama reports success.
    async fn pull(&self) -> Result<(), ModelError> {
        info!(model = %self.model, "Pulling model");
        let request = PullRequest {
            model: &self.model,
            stream: false,
        };
        let response = self
            .client
            .post(self.url("api/pull"))
            .timeout(PULL_TIMEOUT)
            .json(&request)
            .send()
            .await
            .map_err(|e| ModelError::Network(e.to_string()))?;
        let body: PullResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ModelError::InvalidResponse(e.to_string()))?;

        if body.status != "success" {
            return Err(ModelError::Creation(format!(
                "pull of {} ended with status '{}'",
                self.model, body.status
            )));
        }
        info!(model = %self.model, "Model pulled");
        Ok(())
    }
}

/// Turn a non-success response into [`ModelError::ApiError`], preferring
/// the message of an Ollama error body.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ModelError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.error)
        .unwrap_or(text);
    Err(ModelError::ApiError { status, message })
}

#[async_trait]
impl LanguageModel for OllamaModel {
    fn id(&self) -> &str {
        "ollama"
    }

    async fn availability(&self) -> Availability {
        match self.installed().await {
            Ok(true) => Availability::Available,
            Ok(false) => {
                info!(model = %self.model, "Model not installed, it will be pulled when a session is created");
                Availability::Downloadable
            }
            Err(e) => {
                warn!(endpoint = %self.endpoint, error = %e, "Ollama unavailable");
                Availability::Unavailable
            }
        }
    }

    async fn params(&self) -> Result<ModelParams, ModelError> {
        Ok(self.params)
    }

    async fn create(&self, options: SessionOptions) -> Result<Arc<dyn ModelSession>, ModelError> {
        if !self.installed().await? {
            self.pull().await?;
        }
        debug!(model = %self.model, "Creating Ollama session");
        Ok(Arc::new(OllamaSession {
            url: self.url("api/generate"),
            model: self.model.clone(),
            options,
            client: self.client.clone(),
        }))
    }
}

/// Generation bound to a fixed system prompt and sampling options.
///
/// Ollama's generate endpoint is stateless, so every prompt is independent.
pub struct OllamaSession {
    url: String,
    model: String,
    options: SessionOptions,
    client: reqwest::Client,
}

impl OllamaSession {
    fn build_request<'a>(&'a self, prompt: &'a str) -> GenerateRequest<'a> {
        GenerateRequest {
            model: &self.model,
            prompt,
            system: &self.options.system_prompt,
            stream: true,
            options: GenerateOptions {
                temperature: self.options.temperature,
                top_k: self.options.top_k,
            },
        }
    }

    async fn send_request(&self, request: &GenerateRequest<'_>) -> Result<reqwest::Response, ModelError> {
        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| ModelError::Network(e.to_string()))?;
        check_status(response).await
    }
}

#[async_trait]
impl ModelSession for OllamaSession {
    fn options(&self) -> &SessionOptions {
        &self.options
    }

    async fn prompt_streaming(
        &self,
        prompt: &str,
        cancel: CancellationToken,
    ) -> Result<FragmentStream, ModelError> {
        let request = self.build_request(prompt);
        let response = self.send_request(&request).await?;

        let stream = async_stream::stream! {
            let mut bytes = response.bytes_stream();
            let mut decoder = LineDecoder::default();

            'read: loop {
                let next = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => None,
                    next = bytes.next() => Some(next),
                };
                let Some(next) = next else {
                    debug!("Generation cancelled");
                    break 'read;
                };

                let (lines, eof) = match next {
                    Some(Ok(chunk)) => (decoder.push(&chunk), false),
                    Some(Err(e)) => {
                        yield Err(ModelError::Stream(e.to_string()));
                        break 'read;
                    }
                    None => (decoder.finish().into_iter().collect::<Vec<_>>(), true),
                };

                for line in lines {
                    match parse_line(&line) {
                        Ok(chunk) => {
                            if let Some(message) = chunk.error {
                                yield Err(stream_error(message));
                                break 'read;
                            }
                            if !chunk.response.is_empty() {
                                yield Ok(chunk.response);
                            }
                            if chunk.done {
                                break 'read;
                            }
                        }
                        Err(e) => {
                            yield Err(e);
                            break 'read;
                        }
                    }
                }

                if eof {
                    break;
                }
            }
        };

        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
