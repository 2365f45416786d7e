//! Provider trait: the abstraction over chat-completion backends.
//!
//! A Provider performs exactly one attempt: it sends a request and either
//! returns the reply text or a classified [`AssistantError`]. Retrying is
//! the executor's job, so implementations never loop or sleep.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AssistantError;
use crate::message::Message;

/// One chat-completion request.
///
/// Serializes to the request body `{model, messages, temperature, max_tokens}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// The model to use (e.g., "deepseek-chat")
    pub model: String,

    /// The full transcript, system message first
    pub messages: Vec<Message>,

    /// Sampling temperature
    pub temperature: f32,

    /// Maximum tokens to generate
    pub max_tokens: u32,
}

/// The core Provider trait.
///
/// The executor calls `complete()` without knowing which backend answers.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "deepseek").
    fn name(&self) -> &str;

    /// Send a request once and return the first choice's content.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, AssistantError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_to_body_shape() {
        let req = CompletionRequest {
            model: "deepseek-chat".into(),
            messages: vec![Message::system("Be brief"), Message::user("Hello")],
            temperature: 0.7,
            max_tokens: 1000,
        };
        let body = serde_json::to_value(&req).unwrap();

        assert_eq!(body["model"], "deepseek-chat");
        assert_eq!(body["max_tokens"], 1000);
        assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert_eq!(
            body["messages"],
            serde_json::json!([
                {"role": "system", "content": "Be brief"},
                {"role": "user", "content": "Hello"}
            ])
        );
    }
}
