//! The conversation store.
//!
//! A [`ConversationHistory`] is the ordered transcript one assistant client
//! sends to the model on every call. It always starts with exactly one
//! system message; nothing but [`ConversationHistory::reset`] may replace
//! or remove it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{AssistantError, Result};
use crate::message::{Message, Role};

/// Smallest window that still holds the system message and one exchange.
const MIN_WINDOW: usize = 3;

/// Unique identifier for a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub String);

impl ConversationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered, append-only transcript seeded with a system instruction.
///
/// Not internally synchronized: the owner must make sure only one
/// append/send cycle runs at a time.
#[derive(Debug, Clone)]
pub struct ConversationHistory {
    id: ConversationId,
    system_prompt: String,
    messages: Vec<Message>,
    max_messages: Option<usize>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ConversationHistory {
    /// Create a history holding only the system message.
    pub fn new(system_prompt: impl Into<String>) -> Self {
        let now = Utc::now();
        let system_prompt = system_prompt.into();
        Self {
            id: ConversationId::new(),
            messages: vec![Message::system(system_prompt.clone())],
            system_prompt,
            max_messages: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Cap the transcript length. Older exchanges are dropped in
    /// user/assistant pairs; the system message always survives.
    /// Values below 3 are raised to 3.
    pub fn with_max_messages(mut self, max: Option<usize>) -> Self {
        self.max_messages = max.map(|m| m.max(MIN_WINDOW));
        self.trim();
        self
    }

    /// Replace the whole sequence with a fresh single system message.
    pub fn reset(&mut self) {
        let dropped = self.messages.len() - 1;
        let now = Utc::now();
        self.id = ConversationId::new();
        self.messages = vec![Message::system(self.system_prompt.clone())];
        self.created_at = now;
        self.updated_at = now;
        info!(conversation = %self.id, dropped, created_at = %self.created_at, "Conversation reset");
    }

    /// Append one user or assistant message to the end.
    pub fn append(&mut self, message: Message) -> Result<()> {
        if message.role() == Role::System {
            return Err(AssistantError::invalid(
                "the system message is fixed; only user and assistant turns can be appended",
            ));
        }
        self.messages.push(message);
        self.updated_at = Utc::now();
        self.trim();
        Ok(())
    }

    /// Record a completed exchange: the user turn and its reply, in order.
    pub fn commit_exchange(&mut self, user: Message, assistant: Message) -> Result<()> {
        if user.role() != Role::User || assistant.role() != Role::Assistant {
            return Err(AssistantError::invalid(
                "an exchange is one user message followed by one assistant message",
            ));
        }
        self.messages.push(user);
        self.messages.push(assistant);
        self.updated_at = Utc::now();
        self.trim();
        debug!(
            conversation = %self.id,
            len = self.messages.len(),
            created_at = %self.created_at,
            updated_at = %self.updated_at,
            "Exchange committed"
        );
        Ok(())
    }

    /// The full ordered transcript, system message first.
    pub fn snapshot(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Always false: the system message is never removed.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn id(&self) -> &ConversationId {
        &self.id
    }

    pub fn max_messages(&self) -> Option<usize> {
        self.max_messages
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn trim(&mut self) {
        let Some(max) = self.max_messages else {
            return;
        };
        if self.messages.len() <= max {
            return;
        }

        // Drop whole exchanges so the window never starts with a dangling reply.
        let excess = self.messages.len() - max;
        let drop = excess + excess % 2;
        let drop = drop.min(self.messages.len() - 1);
        self.messages.drain(1..1 + drop);
        debug!(conversation = %self.id, dropped = drop, "Trimmed conversation window");
    }
}
