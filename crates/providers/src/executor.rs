//! Resilient request executor: one request, retried on rate limits.
//!
//! The executor builds a single [`CompletionRequest`] from the transcript
//! and hands it to a [`Provider`]. Rate-limit failures are retried on the
//! [`RetryPolicy`] schedule with the *same* request; every other failure
//! ends the sequence at once. Waits are async timers that a
//! [`CancellationToken`] can interrupt.

use std::sync::Arc;

use tally_config::AppConfig;
use tally_core::error::{AssistantError, Result};
use tally_core::message::Message;
use tally_core::provider::{CompletionRequest, Provider};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::retry::RetryPolicy;

/// Fixed request parameters sent with every call.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl RequestSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

impl Default for RequestSettings {
    fn default() -> Self {
        Self {
            model: "deepseek-chat".into(),
            temperature: 0.7,
            max_tokens: 1000,
        }
    }
}

/// Sends whole transcripts to a provider and retries rate-limited calls.
pub struct RequestExecutor {
    provider: Arc<dyn Provider>,
    settings: RequestSettings,
    policy: RetryPolicy,
}

impl RequestExecutor {
    pub fn new(provider: Arc<dyn Provider>, settings: RequestSettings, policy: RetryPolicy) -> Self {
        Self {
            provider,
            settings,
            policy,
        }
    }

    pub fn settings(&self) -> &RequestSettings {
        &self.settings
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Build the request body for `history`. The transcript is copied, never
    /// modified.
    pub fn build_request(&self, history: &[Message]) -> CompletionRequest {
        CompletionRequest {
            model: self.settings.model.clone(),
            messages: history.to_vec(),
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        }
    }

    /// Send `history` and return the reply, retrying on rate limits.
    pub async fn send(&self, history: &[Message]) -> Result<String> {
        self.send_with_cancel(history, &CancellationToken::new()).await
    }

    /// Like [`send`](Self::send), but stops with [`AssistantError::Interrupted`]
    /// as soon as `cancel` fires, whether during a backoff wait or while a
    /// request is in flight.
    pub async fn send_with_cancel(
        &self,
        history: &[Message],
        cancel: &CancellationToken,
    ) -> Result<String> {
        let request = self.build_request(history);
        let max_attempts = self.policy.max_attempts();

        for attempt in 0..max_attempts {
            if let Some(delay) = self.policy.delay_before(attempt) {
                info!(
                    attempt = attempt + 1,
                    total = max_attempts,
                    delay_secs = delay.as_secs_f64(),
                    "Backing off before retry"
                );
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(self.interrupted(attempt)),
                    _ = tokio::time::sleep(delay) => {}
                }
            }

            if cancel.is_cancelled() {
                return Err(self.interrupted(attempt));
            }

            debug!(
                provider = %self.provider.name(),
                attempt = attempt + 1,
                total = max_attempts,
                "Dispatching request"
            );

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(self.interrupted(attempt)),
                outcome = self.provider.complete(&request) => outcome,
            };

            match outcome {
                Ok(reply) => return Ok(reply),
                Err(e) if e.is_retryable() => {
                    warn!(
                        provider = %self.provider.name(),
                        attempt = attempt + 1,
                        total = max_attempts,
                        error = %e,
                        "Rate limited"
                    );
                }
                Err(e) => {
                    warn!(
                        provider = %self.provider.name(),
                        attempt = attempt + 1,
                        error = %e,
                        "Request failed, not retrying"
                    );
                    return Err(e);
                }
            }
        }

        warn!(attempts = max_attempts, "Giving up after repeated rate limits");
        Err(AssistantError::RetriesExhausted {
            attempts: max_attempts,
        })
    }

    fn interrupted(&self, attempt: u32) -> AssistantError {
        info!(attempt = attempt + 1, "Request cancelled by caller");
        AssistantError::Interrupted
    }
}
