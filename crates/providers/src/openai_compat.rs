//! OpenAI-compatible chat-completion provider.
//!
//! Works with DeepSeek (the default endpoint), OpenAI, and any service that
//! exposes the `/chat/completions` wire format. One call to
//! [`OpenAiCompatProvider::complete`] is one HTTP request; the response is
//! classified into a reply or an [`AssistantError`] and never retried here.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tally_config::HttpConfig;
use tally_core::error::AssistantError;
use tally_core::provider::{CompletionRequest, Provider};
use tally_core::ApiKey;
use tracing::{debug, warn};

/// Connect and read timeouts for the HTTP client.
///
/// `read` bounds each wait for data from the server and restarts after
/// every chunk received, so a slow but steady reply is not cut off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub connect: Duration,
    pub read: Duration,
}

impl HttpTimeouts {
    pub fn from_config(config: &HttpConfig) -> Self {
        Self {
            connect: Duration::from_secs(config.connect_timeout_secs),
            read: Duration::from_secs(config.read_timeout_secs),
        }
    }
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self::from_config(&HttpConfig::default())
    }
}

/// An OpenAI-compatible LLM provider.
pub struct OpenAiCompatProvider {
    name: String,
    endpoint: String,
    api_key: ApiKey,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    /// Create a provider posting to `endpoint` (the full completions URL).
    pub fn new(
        name: impl Into<String>,
        endpoint: impl Into<String>,
        api_key: ApiKey,
        timeouts: HttpTimeouts,
    ) -> Result<Self, AssistantError> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeouts.connect)
            .read_timeout(timeouts.read)
            .build()
            .map_err(|e| AssistantError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            name: name.into(),
            endpoint: endpoint.into(),
            api_key,
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Provider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, AssistantError> {
        debug!(
            provider = %self.name,
            model = %request.model,
            messages = request.messages.len(),
            key = %self.api_key.masked(),
            "Sending completion request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key.expose()))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| AssistantError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());

        let body = response
            .text()
            .await
            .map_err(|e| AssistantError::Transport(format!("failed to read response body: {e}")))?;

        interpret_response(status, retry_after, &body)
    }
}

/// Classify one HTTP response into the reply text or an error.
pub fn interpret_response(
    status: u16,
    retry_after_secs: Option<u64>,
    body: &str,
) -> Result<String, AssistantError> {
    if status == 429 {
        warn!(status, ?retry_after_secs, "Provider rate limited the request");
        return Err(AssistantError::RateLimited { retry_after_secs });
    }

    if !(200..300).contains(&status) {
        let message = extract_error_message(body);
        warn!(status, error = %message, "Provider returned error");
        return Err(AssistantError::Api { status, message });
    }

    if body.trim().is_empty() {
        return Err(AssistantError::MalformedResponse("empty response body".into()));
    }

    let parsed: ApiResponse = serde_json::from_str(body)
        .map_err(|e| AssistantError::MalformedResponse(format!("failed to parse response: {e}")))?;

    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| AssistantError::MalformedResponse("no choices in response".into()))?;

    match choice.message.content {
        Some(content) if !content.is_empty() => Ok(content),
        Some(_) => Err(AssistantError::MalformedResponse("reply content is empty".into())),
        None => Err(AssistantError::MalformedResponse("reply has no content".into())),
    }
}

/// Pull a human-readable message out of an error body.
///
/// Accepts `{"error": "..."}` and `{"error": {"message": "..."}}`; anything
/// else is returned verbatim, and an empty body becomes "Unknown error".
fn extract_error_message(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return "Unknown error".into();
    }

    let Ok(json) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.to_string();
    };

    match json.get("error") {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(obj @ serde_json::Value::Object(_)) => obj
            .get("message")
            .and_then(|m| m.as_str())
            .map(String::from)
            .unwrap_or_else(|| obj.to_string()),
        Some(other) => other.to_string(),
        None => body.to_string(),
    }
}

// --- Chat completions API types (internal) ---

#[derive(Debug, Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    content: Option<String>,
}
