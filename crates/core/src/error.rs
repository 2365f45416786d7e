//! Error types for the Tally assistant.
//!
//! Uses `thiserror` for ergonomic error definitions. Every failure an
//! exchange can produce is one variant of [`AssistantError`]; the caller
//! renders it as text and the process keeps running.

use thiserror::Error;

/// Everything that can go wrong between a question and its reply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssistantError {
    /// Empty API key, empty question, or otherwise unusable input.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The provider answered HTTP 429. The only retryable failure.
    #[error("Rate limited by provider{}", retry_hint(*retry_after_secs))]
    RateLimited { retry_after_secs: Option<u64> },

    /// Connection, TLS, or timeout failure before a status was received.
    #[error("Network error: {0}")]
    Transport(String),

    /// Non-success status other than 429.
    #[error("API request failed: {message} (status: {status})")]
    Api { status: u16, message: String },

    /// A success status whose body did not have the expected shape.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Max retries exceeded after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },

    /// The caller cancelled the exchange while it was waiting or in flight.
    #[error("Request interrupted")]
    Interrupted,
}

fn retry_hint(retry_after_secs: Option<u64>) -> String {
    match retry_after_secs {
        Some(secs) => format!(", retry after {secs}s"),
        None => String::new(),
    }
}

impl AssistantError {
    /// Whether the retry policy may attempt the request again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, AssistantError>;
