//! The Tally expense assistant.
//!
//! Front ends hand [`AssistantClient`] a question and the current dashboard
//! figures; the client keeps the conversation, talks to the model through
//! the retrying executor, and returns the reply text.
//!
//! ```no_run
//! # async fn demo() -> tally_core::Result<()> {
//! use tally_assistant::{AssistantClient, AssistantSettings};
//! use tally_core::DashboardSnapshot;
//!
//! let client = AssistantClient::new("sk-...", AssistantSettings::default())?;
//! let snapshot = DashboardSnapshot::new().with("totalExpenses", "120.00");
//! let reply = client.process_question("How much did I spend?", &snapshot).await?;
//! println!("{reply}");
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod formatter;

#[cfg(test)]
mod test_helpers;

pub use client::{AssistantClient, AssistantSettings, SYSTEM_PROMPT, describe_error};
pub use formatter::format_question;
