//! Shared test providers for client tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tally_core::error::Result;
use tally_core::{CompletionRequest, Provider};
use tally_providers::openai_compat::interpret_response;

/// Replays scripted outcomes in order and records every request.
///
/// Panics if called more often than there are outcomes.
pub struct ScriptedProvider {
    outcomes: Mutex<Vec<Result<String>>>,
    requests: Mutex<Vec<CompletionRequest>>,
    delay: Duration,
}

impl ScriptedProvider {
    pub fn new(outcomes: Vec<Result<String>>) -> Arc<Self> {
        Self::with_delay(outcomes, Duration::ZERO)
    }

    /// Each call takes `delay` before answering.
    pub fn with_delay(outcomes: Vec<Result<String>>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            outcomes: Mutex::new(outcomes),
            requests: Mutex::new(Vec::new()),
            delay,
        })
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let mut outcomes = self.outcomes.lock().unwrap();
        if outcomes.is_empty() {
            panic!("ScriptedProvider: no more outcomes");
        }
        outcomes.remove(0)
    }
}

/// Feeds canned HTTP (status, body) pairs through the real response parser.
pub struct CannedHttpProvider {
    replies: Mutex<Vec<(u16, String)>>,
}

impl CannedHttpProvider {
    pub fn new(replies: Vec<(u16, &str)>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().map(|(s, b)| (s, b.to_string())).collect()),
        })
    }
}

#[async_trait::async_trait]
impl Provider for CannedHttpProvider {
    fn name(&self) -> &str {
        "canned_http"
    }

    async fn complete(&self, _request: &CompletionRequest) -> Result<String> {
        let (status, body) = self.replies.lock().unwrap().remove(0);
        interpret_response(status, None, &body)
    }
}
