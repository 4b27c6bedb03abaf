use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::cancel::CancelToken;
use crate::error::RequestError;
use crate::query::{FeasibilityResult, ScenarioQuery};

use super::FeasibilityService;

/// A scripted service for tests. Returns pre-defined outcomes in order and
/// records every query it receives.
pub struct MockService {
    outcomes: Vec<Result<FeasibilityResult, RequestError>>,
    calls: AtomicUsize,
    received: Mutex<Vec<String>>,
    delay: Option<Duration>,
}

impl MockService {
    pub fn new(outcomes: Vec<Result<FeasibilityResult, RequestError>>) -> Self {
        Self {
            outcomes,
            calls: AtomicUsize::new(0),
            received: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    /// Wait `delay` before answering. Cancellation during the wait wins.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// How many times `query` was called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Scenario texts seen so far, in call order.
    pub fn received(&self) -> Vec<String> {
        self.received
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl FeasibilityService for MockService {
    async fn query(
        &self,
        query: &ScenarioQuery,
        cancel: &CancelToken,
    ) -> Result<FeasibilityResult, RequestError> {
        let i = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut received) = self.received.lock() {
            received.push(query.text().to_string());
        }

        if let Some(delay) = self.delay {
            tokio::select! {
                _ = cancel.cancelled() => return Err(RequestError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }

        self.outcomes.get(i).cloned().unwrap_or_else(|| {
            Err(RequestError::Malformed(format!(
                "MockService: no more outcomes (called {} times)",
                i + 1
            )))
        })
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}
