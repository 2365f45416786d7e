//! The conversational assistant client.
//!
//! [`AssistantClient`] is the one entry point a front end needs: it formats
//! the question, sends the running conversation through the
//! [`RequestExecutor`], and records the exchange once the model answers.
//!
//! An exchange is committed both-or-neither. The user turn is staged on
//! top of a copy of the transcript for sending and only enters the history
//! together with the reply, so a failed call leaves no unanswered turn
//! behind. The stage/send/commit cycle runs under a mutex, which makes a
//! shared client (`Arc<AssistantClient>`) serve callers one at a time.

use std::sync::Arc;

use tally_config::AppConfig;
use tally_core::error::{AssistantError, Result};
use tally_core::{ApiKey, ConversationHistory, DashboardSnapshot, Message, Provider};
use tally_providers::{HttpTimeouts, OpenAiCompatProvider, RequestExecutor, RequestSettings, RetryPolicy};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::formatter::format_question;

/// The instruction every conversation starts with.
pub const SYSTEM_PROMPT: &str = "You are a helpful financial assistant. Analyze the expense data and provide clear, concise summaries and insights.";

/// Everything needed to build a client besides the key.
#[derive(Debug, Clone)]
pub struct AssistantSettings {
    pub endpoint: String,
    pub request: RequestSettings,
    pub retry: RetryPolicy,
    pub timeouts: HttpTimeouts,
    /// Sliding-window size; `None` keeps the whole conversation
    pub max_history_messages: Option<usize>,
    pub system_prompt: String,
}

impl AssistantSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            endpoint: config.api_url.clone(),
            request: RequestSettings::from_config(config),
            retry: RetryPolicy::from_config(&config.retry),
            timeouts: HttpTimeouts::from_config(&config.http),
            max_history_messages: config.history.window(),
            system_prompt: SYSTEM_PROMPT.into(),
        }
    }
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

/// Answers questions about the user's expenses, keeping multi-turn context.
pub struct AssistantClient {
    executor: RequestExecutor,
    history: Mutex<ConversationHistory>,
}

impl AssistantClient {
    /// Create a client talking to `settings.endpoint` over HTTP.
    ///
    /// Fails with [`AssistantError::InvalidArgument`] for an empty or blank
    /// key, before any connection is made.
    pub fn new(api_key: &str, settings: AssistantSettings) -> Result<Self> {
        let api_key = ApiKey::new(api_key)?;
        let masked = api_key.masked();
        let provider = OpenAiCompatProvider::new(
            "deepseek",
            settings.endpoint.clone(),
            api_key,
            settings.timeouts,
        )?;
        info!(key = %masked, endpoint = %provider.endpoint(), "Creating assistant client");
        Ok(Self::with_provider(Arc::new(provider), settings))
    }

    /// Create a client from a loaded configuration (env overrides applied).
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let key = config.api_key.as_deref().unwrap_or_default();
        Self::new(key, AssistantSettings::from_config(config))
    }

    /// Create a client on top of any provider.
    pub fn with_provider(provider: Arc<dyn Provider>, settings: AssistantSettings) -> Self {
        let history = ConversationHistory::new(settings.system_prompt)
            .with_max_messages(settings.max_history_messages);
        Self {
            executor: RequestExecutor::new(provider, settings.request, settings.retry),
            history: Mutex::new(history),
        }
    }

    /// Ask one question about `snapshot` and return the assistant's reply.
    pub async fn process_question(&self, question: &str, snapshot: &DashboardSnapshot) -> Result<String> {
        self.process_question_with_cancel(question, snapshot, &CancellationToken::new())
            .await
    }

    /// Like [`process_question`](Self::process_question); `cancel` aborts a
    /// pending backoff wait or in-flight request with
    /// [`AssistantError::Interrupted`].
    pub async fn process_question_with_cancel(
        &self,
        question: &str,
        snapshot: &DashboardSnapshot,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let user = Message::user(format_question(question, snapshot)?);

        let mut history = self.history.lock().await;
        let mut outgoing = Vec::with_capacity(history.len() + 1);
        outgoing.extend_from_slice(history.snapshot());
        outgoing.push(user.clone());

        debug!(
            conversation = %history.id(),
            last_activity = %history.updated_at(),
            messages = outgoing.len(),
            snapshot_entries = snapshot.len(),
            "Sending question"
        );

        let reply = self.executor.send_with_cancel(&outgoing, cancel).await?;
        history.commit_exchange(user, Message::assistant(reply.clone()))?;

        info!(
            conversation = %history.id(),
            history_len = history.len(),
            "Exchange completed"
        );
        Ok(reply)
    }

    /// Drop every exchange; the history returns to the system message alone.
    pub async fn clear_conversation(&self) {
        self.history.lock().await.reset();
    }

    /// A copy of the current transcript, system message first.
    pub async fn history(&self) -> Vec<Message> {
        self.history.lock().await.snapshot().to_vec()
    }

    pub async fn history_len(&self) -> usize {
        self.history.lock().await.len()
    }

    pub fn model(&self) -> &str {
        &self.executor.settings().model
    }

    pub fn provider_name(&self) -> &str {
        self.executor.provider_name()
    }
}

/// The text a front end shows when an exchange fails.
pub fn describe_error(err: &AssistantError) -> String {
    format!("Error: {err}")
}
