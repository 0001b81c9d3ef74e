//! Streaming completion with timeout, stop sequences and retry.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::time::{sleep, timeout_at, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use mindmeld_config::StreamConfig;
use mindmeld_protocols::{ModelError, ModelSession, StreamError};

use crate::session::SessionManager;

/// Per-call streaming options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamOptions {
    pub max_attempts: u32,
    /// Deadline for one attempt, covering stream start and every fragment.
    pub timeout: Duration,
    /// Matched case-insensitively against the accumulated text.
    pub stop_sequences: Vec<String>,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            timeout: Duration::from_secs(30),
            stop_sequences: Vec::new(),
        }
    }
}

impl StreamOptions {
    /// Options for rewrite chunks.
    pub fn rewrite(config: &StreamConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            timeout: config.timeout(),
            stop_sequences: config.stop_sequences.clone(),
        }
    }

    /// Options for single-shot completions.
    pub fn generate(config: &StreamConfig) -> Self {
        Self {
            max_attempts: config.generate_max_attempts,
            timeout: config.generate_timeout(),
            stop_sequences: config.stop_sequences.clone(),
        }
    }
}

/// Backoff between failed attempts.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Delay after the first failed attempt.
    pub base_delay: Duration,
    /// Exponential backoff multiplier.
    pub backoff_multiplier: f64,
    /// Upper bound (exclusive) of the random delay added to each backoff.
    pub jitter: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(300),
            backoff_multiplier: 2.0,
            jitter: Duration::from_millis(100),
        }
    }
}

impl From<&mindmeld_config::RetryConfig> for RetryConfig {
    fn from(config: &mindmeld_config::RetryConfig) -> Self {
        Self {
            base_delay: Duration::from_millis(config.base_delay_ms),
            backoff_multiplier: config.backoff_multiplier,
            jitter: Duration::from_millis(config.jitter_ms),
        }
    }
}

impl RetryConfig {
    /// Delay after failed attempt number `attempt` (1-based), without jitter.
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let delay = self.base_delay.as_millis() as f64 * self.backoff_multiplier.powi(exponent);
        Duration::from_millis(delay as u64)
    }

    /// Backoff plus jitter in `[0, jitter)`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.backoff_for_attempt(attempt) + rand_jitter(self.jitter)
    }
}

/// Simple jitter using system time.
fn rand_jitter(max: Duration) -> Duration {
    use std::time::SystemTime;
    let max_ms = max.as_millis() as u64;
    if max_ms == 0 {
        return Duration::ZERO;
    }
    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    Duration::from_millis(u64::from(nanos) % max_ms)
}

/// First stop sequence contained in `text`, ignoring case.
fn find_stop_sequence<'a>(text: &str, stops: &'a [String]) -> Option<&'a str> {
    let haystack = text.to_lowercase();
    stops
        .iter()
        .filter(|stop| !stop.is_empty())
        .find(|stop| haystack.contains(&stop.to_lowercase()))
        .map(String::as_str)
}

/// Turns a streaming session into `prompt → text`, retrying until a
/// non-empty response arrives or the attempts run out.
pub struct StreamingCompleter {
    sessions: Arc<SessionManager>,
    retry: RetryConfig,
}

impl StreamingCompleter {
    pub fn new(sessions: Arc<SessionManager>, retry: RetryConfig) -> Self {
        Self { sessions, retry }
    }

    /// Stream a completion into a string.
    ///
    /// Timeouts and stop-sequence matches end an attempt without error and
    /// keep what was accumulated. Stream errors discard the attempt's buffer.
    /// A "destroyed" session is recreated and used for the remaining
    /// attempts.
    pub async fn complete(
        &self,
        session: Arc<dyn ModelSession>,
        prompt: &str,
        options: &StreamOptions,
    ) -> Result<String, StreamError> {
        if options.max_attempts == 0 {
            return Err(StreamError::InvalidOptions(
                "max_attempts must be at least 1".to_string(),
            ));
        }

        let mut session = session;
        let mut last_error = None;

        for attempt in 1..=options.max_attempts {
            match self.attempt(session.as_ref(), prompt, options).await {
                Ok(text) if !text.is_empty() => {
                    debug!(attempt, chars = text.chars().count(), "Streaming completion finished");
                    return Ok(text);
                }
                Ok(_) => {
                    warn!(attempt, "Empty response");
                    last_error = Some("empty response".to_string());
                }
                Err(e) => {
                    warn!(attempt, error = %e, "Streaming error");
                    if e.is_session_destroyed() {
                        info!("Session appears destroyed, recreating");
                        match self.sessions.recreate().await {
                            Ok(fresh) => session = fresh,
                            Err(recreate_err) => {
                                error!(error = %recreate_err, "Failed to recreate session");
                            }
                        }
                    }
                    last_error = Some(e.to_string());
                }
            }

            if attempt < options.max_attempts {
                let delay = self.retry.delay_for_attempt(attempt);
                debug!(attempt, delay_ms = delay.as_millis() as u64, "Retrying after backoff");
                sleep(delay).await;
            }
        }

        Err(StreamError::Exhausted {
            attempts: options.max_attempts,
            last_error,
        })
    }

    /// One attempt: the trimmed text gathered before the stream ended, timed
    /// out or hit a stop sequence.
    async fn attempt(
        &self,
        session: &dyn ModelSession,
        prompt: &str,
        options: &StreamOptions,
    ) -> Result<String, ModelError> {
        let cancel = CancellationToken::new();
        let deadline = Instant::now() + options.timeout;

        let mut stream = match timeout_at(deadline, session.prompt_streaming(prompt, cancel.clone())).await {
            Ok(stream) => stream?,
            Err(_) => {
                cancel.cancel();
                warn!("Streaming aborted: timeout before first fragment");
                return Ok(String::new());
            }
        };

        let mut buffer = String::new();
        loop {
            match timeout_at(deadline, stream.next()).await {
                Err(_) => {
                    cancel.cancel();
                    warn!(chars = buffer.chars().count(), "Streaming aborted: timeout");
                    break;
                }
                Ok(None) => break,
                Ok(Some(Err(e))) => {
                    cancel.cancel();
                    return Err(e);
                }
                Ok(Some(Ok(fragment))) => {
                    buffer.push_str(&fragment);
                    if let Some(stop) = find_stop_sequence(&buffer, &options.stop_sequences) {
                        cancel.cancel();
                        debug!(stop, "Stop sequence matched, cancelling stream");
                        break;
                    }
                }
            }
        }

        Ok(buffer.trim().to_string())
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
