pub mod http;
pub mod mock;

use std::fmt;

use async_trait::async_trait;

use crate::cancel::CancelToken;
use crate::error::RequestError;
use crate::query::{FeasibilityResult, ScenarioQuery};

/// Anything that can answer a scenario: the HTTP service, or a test script.
///
/// One call is one attempt. Implementations never retry, and must stop all
/// work for the call once `cancel` fires.
#[async_trait]
pub trait FeasibilityService: Send + Sync {
    async fn query(
        &self,
        query: &ScenarioQuery,
        cancel: &CancelToken,
    ) -> Result<FeasibilityResult, RequestError>;

    /// Short label for banners and `/config`.
    fn describe(&self) -> String;
}

/// Lifecycle of a single call. `Succeeded`, `TimedOut`, and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallPhase {
    Idle,
    Sent,
    Succeeded,
    TimedOut,
    Failed,
}

impl CallPhase {
    /// Terminal phase for a finished call.
    pub fn settle(outcome: &Result<FeasibilityResult, RequestError>) -> Self {
        match outcome {
            Ok(_) => CallPhase::Succeeded,
            Err(RequestError::Timeout(_)) => CallPhase::TimedOut,
            Err(_) => CallPhase::Failed,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            CallPhase::Succeeded | CallPhase::TimedOut | CallPhase::Failed
        )
    }
}

impl fmt::Display for CallPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CallPhase::Idle => "idle",
            CallPhase::Sent => "sent",
            CallPhase::Succeeded => "succeeded",
            CallPhase::TimedOut => "timed-out",
            CallPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn verdict() -> FeasibilityResult {
        FeasibilityResult {
            feasible: true,
            probability: 0.5,
            explanation: "x".to_string(),
            outcomes: vec![],
            target_team: None,
            target_rank: None,
            fixed_outcomes: vec![],
        }
    }

    #[test]
    fn settle_success() {
        assert_eq!(CallPhase::settle(&Ok(verdict())), CallPhase::Succeeded);
    }

    #[test]
    fn settle_timeout() {
        let outcome = Err(RequestError::Timeout(Duration::from_secs(30)));
        assert_eq!(CallPhase::settle(&outcome), CallPhase::TimedOut);
    }

    #[test]
    fn settle_other_errors_fail() {
        for err in [
            RequestError::Network("refused".to_string()),
            RequestError::Malformed("bad".to_string()),
            RequestError::Cancelled,
            RequestError::HttpStatus {
                code: 502,
                body: String::new(),
            },
        ] {
            assert_eq!(CallPhase::settle(&Err(err)), CallPhase::Failed);
        }
    }

    #[test]
    fn only_outcome_phases_are_terminal() {
        assert!(!CallPhase::Idle.is_terminal());
        assert!(!CallPhase::Sent.is_terminal());
        assert!(CallPhase::Succeeded.is_terminal());
        assert!(CallPhase::TimedOut.is_terminal());
        assert!(CallPhase::Failed.is_terminal());
    }
}
