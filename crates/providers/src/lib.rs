//! Chat-completion providers and the resilient request executor for Tally.
//!
//! Providers implement the single-attempt `tally_core::Provider` trait.
//! [`RequestExecutor`] wraps one of them with the rate-limit retry policy.

pub mod executor;
pub mod openai_compat;
pub mod retry;

pub use executor::{RequestExecutor, RequestSettings};
pub use openai_compat::{HttpTimeouts, OpenAiCompatProvider};
pub use retry::RetryPolicy;
