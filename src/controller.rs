//! The interaction controller: one scenario at a time, one state at a time.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::cancel::CancelToken;
use crate::client::FeasibilityService;
use crate::error::RequestError;
use crate::events::{Event, EventBus};
use crate::query::{FeasibilityResult, ScenarioQuery};

/// Exactly one of these holds at any time.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionState {
    Idle,
    Pending(ScenarioQuery),
    Success(FeasibilityResult),
    Failed(RequestError),
}

/// Discriminant of [`InteractionState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateKind {
    Idle,
    Pending,
    Success,
    Failed,
}

impl InteractionState {
    pub fn kind(&self) -> StateKind {
        match self {
            InteractionState::Idle => StateKind::Idle,
            InteractionState::Pending(_) => StateKind::Pending,
            InteractionState::Success(_) => StateKind::Success,
            InteractionState::Failed(_) => StateKind::Failed,
        }
    }
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StateKind::Idle => "idle",
            StateKind::Pending => "pending",
            StateKind::Success => "success",
            StateKind::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Why a submission was dropped without touching state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Nothing left after trimming.
    Empty,
    /// A request is already in flight.
    Busy,
}

/// What `submit` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    Rejected(Rejection),
    /// One call was made and the state settled on this kind.
    Settled(StateKind),
}

/// The single thing to render for the current state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum View<'a> {
    Idle,
    Loading(&'a ScenarioQuery),
    Error(&'a RequestError),
    Result(&'a FeasibilityResult),
}

/// Owns the interaction state and forwards validated scenarios to a service.
pub struct Controller {
    service: Arc<dyn FeasibilityService>,
    state: InteractionState,
    last_result: Option<FeasibilityResult>,
    events: EventBus,
}

impl Controller {
    pub fn new(service: Arc<dyn FeasibilityService>) -> Self {
        Self::with_events(service, EventBus::default())
    }

    pub fn with_events(service: Arc<dyn FeasibilityService>, events: EventBus) -> Self {
        Self {
            service,
            state: InteractionState::Idle,
            last_result: None,
            events,
        }
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn service(&self) -> &dyn FeasibilityService {
        self.service.as_ref()
    }

    /// The most recent successful verdict, even after a later failure.
    pub fn last_result(&self) -> Option<&FeasibilityResult> {
        self.last_result.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, InteractionState::Pending(_))
    }

    /// Swap the service (new URL or timeout). Refused while a call is pending.
    pub fn set_service(&mut self, service: Arc<dyn FeasibilityService>) -> bool {
        if self.is_pending() {
            return false;
        }
        self.service = service;
        true
    }

    /// Validate `raw` and run it through the service.
    pub async fn submit(&mut self, raw: &str, cancel: &CancelToken) -> Submission {
        let query = match self.begin(raw) {
            Ok(query) => query,
            Err(rejection) => return Submission::Rejected(rejection),
        };
        let service = Arc::clone(&self.service);
        let outcome = service.query(&query, cancel).await;
        Submission::Settled(self.complete(outcome))
    }

    /// First half of [`submit`](Self::submit): enter `Pending` or reject.
    pub fn begin(&mut self, raw: &str) -> Result<ScenarioQuery, Rejection> {
        if self.is_pending() {
            debug!("submission rejected: request already pending");
            return Err(Rejection::Busy);
        }
        let query = ScenarioQuery::new(raw).ok_or(Rejection::Empty)?;
        self.transition(InteractionState::Pending(query.clone()));
        Ok(query)
    }

    /// Second half of [`submit`](Self::submit): settle a pending request.
    ///
    /// Outside `Pending` the outcome has no request to belong to and is dropped.
    pub fn complete(&mut self, outcome: Result<FeasibilityResult, RequestError>) -> StateKind {
        if !self.is_pending() {
            warn!(state = %self.state.kind(), "outcome without a pending request dropped");
            return self.state.kind();
        }
        let next = match outcome {
            Ok(result) => {
                self.last_result = Some(result.clone());
                InteractionState::Success(result)
            }
            Err(err) => InteractionState::Failed(err),
        };
        self.transition(next);
        self.state.kind()
    }

    /// Back to `Idle`. Refused while a call is pending.
    pub fn reset(&mut self) -> bool {
        if self.is_pending() {
            return false;
        }
        if self.state != InteractionState::Idle {
            self.transition(InteractionState::Idle);
        }
        true
    }

    pub fn view(&self) -> View<'_> {
        match &self.state {
            InteractionState::Idle => View::Idle,
            InteractionState::Pending(query) => View::Loading(query),
            InteractionState::Failed(err) => View::Error(err),
            InteractionState::Success(result) => View::Result(result),
        }
    }

    fn transition(&mut self, next: InteractionState) {
        let from = self.state.kind();
        let to = next.kind();
        self.state = next;
        debug!(%from, %to, "state transition");
        self.events.emit(Event::Transition { from, to });
    }
}
