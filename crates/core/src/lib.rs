//! # Tally Core
//!
//! Domain types, traits, and error definitions for the Tally expense
//! assistant. This crate has no HTTP or runtime dependencies; it defines
//! the model every other crate works against:
//!
//! - [`Message`] / [`Role`]: one turn of the transcript
//! - [`ConversationHistory`]: the transcript, seeded with a system prompt
//! - [`DashboardSnapshot`]: labelled expense data sent with each question
//! - [`ApiKey`]: the provider secret, never printed in full
//! - [`Provider`]: one attempt against a chat-completion backend

pub mod api_key;
pub mod conversation;
pub mod error;
pub mod message;
pub mod provider;
pub mod snapshot;

// Re-export key types at crate root for ergonomics
pub use api_key::ApiKey;
pub use conversation::{ConversationHistory, ConversationId};
pub use error::{AssistantError, Result};
pub use message::{Message, Role};
pub use provider::{CompletionRequest, Provider};
pub use snapshot::DashboardSnapshot;
