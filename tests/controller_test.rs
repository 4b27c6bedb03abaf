use std::sync::Arc;
use std::time::Duration;

use feasibility::cancel::{self, CancelToken};
use feasibility::client::mock::MockService;
use feasibility::controller::{Controller, InteractionState, Rejection, StateKind, Submission, View};
use feasibility::error::RequestError;
use feasibility::events::Event;
use feasibility::query::{FeasibilityResult, Outcome};

fn verdict() -> FeasibilityResult {
    FeasibilityResult {
        feasible: true,
        probability: 0.8,
        explanation: "ok".to_string(),
        outcomes: vec![Outcome {
            fixture: "A vs B".to_string(),
            result: "A wins".to_string(),
        }],
        target_team: None,
        target_rank: None,
        fixed_outcomes: vec![],
    }
}

fn build(outcomes: Vec<Result<FeasibilityResult, RequestError>>) -> (Controller, Arc<MockService>) {
    let mock = Arc::new(MockService::new(outcomes));
    (Controller::new(mock.clone()), mock)
}

#[tokio::test]
async fn submit_makes_exactly_one_call() {
    let (mut controller, mock) = build(vec![Ok(verdict())]);
    let mut events = controller.events().subscribe();

    let submission = controller
        .submit("Can Arsenal make top 4?", &CancelToken::never())
        .await;

    assert_eq!(submission, Submission::Settled(StateKind::Success));
    assert_eq!(mock.calls(), 1);
    assert_eq!(mock.received(), vec!["Can Arsenal make top 4?".to_string()]);
    assert_eq!(
        events.recv().await.unwrap(),
        Event::Transition {
            from: StateKind::Idle,
            to: StateKind::Pending
        }
    );
    assert_eq!(
        events.recv().await.unwrap(),
        Event::Transition {
            from: StateKind::Pending,
            to: StateKind::Success
        }
    );
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn success_preserves_fields_and_order() {
    let (mut controller, _mock) = build(vec![Ok(verdict())]);
    controller.submit("x", &CancelToken::never()).await;
    assert_eq!(controller.state(), &InteractionState::Success(verdict()));
    assert_eq!(controller.view(), View::Result(&verdict()));
}

#[tokio::test]
async fn blank_input_is_a_no_op() {
    let (mut controller, mock) = build(vec![Ok(verdict())]);
    let mut events = controller.events().subscribe();

    for raw in ["", "   ", "\n\t "] {
        assert_eq!(
            controller.submit(raw, &CancelToken::never()).await,
            Submission::Rejected(Rejection::Empty)
        );
    }

    assert_eq!(controller.state(), &InteractionState::Idle);
    assert_eq!(mock.calls(), 0);
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn blank_input_keeps_previous_result() {
    let (mut controller, _mock) = build(vec![Ok(verdict())]);
    controller.submit("x", &CancelToken::never()).await;
    controller.submit("  ", &CancelToken::never()).await;
    assert_eq!(controller.state().kind(), StateKind::Success);
}

#[tokio::test]
async fn submit_while_pending_is_rejected() {
    let (mut controller, mock) = build(vec![Ok(verdict())]);

    controller.begin("first").unwrap();
    assert_eq!(
        controller.submit("second", &CancelToken::never()).await,
        Submission::Rejected(Rejection::Busy)
    );

    assert!(controller.is_pending());
    assert_eq!(mock.calls(), 0);
}

#[tokio::test]
async fn failure_is_reported_with_kind_and_message() {
    let err = RequestError::HttpStatus {
        code: 500,
        body: "server error".to_string(),
    };
    let (mut controller, _mock) = build(vec![Err(err.clone())]);

    let submission = controller.submit("x", &CancelToken::never()).await;

    assert_eq!(submission, Submission::Settled(StateKind::Failed));
    assert_eq!(controller.state(), &InteractionState::Failed(err.clone()));
    assert_eq!(controller.view(), View::Error(&err));
    assert_eq!(err.to_string(), "HTTP 500: server error");
}

#[tokio::test]
async fn resubmission_after_failure_goes_through_pending() {
    let (mut controller, mock) = build(vec![
        Err(RequestError::Network("connection refused".to_string())),
        Ok(verdict()),
    ]);
    controller.submit("x", &CancelToken::never()).await;
    let mut events = controller.events().subscribe();

    controller.submit("x", &CancelToken::never()).await;

    assert_eq!(mock.calls(), 2);
    assert_eq!(
        events.recv().await.unwrap(),
        Event::Transition {
            from: StateKind::Failed,
            to: StateKind::Pending
        }
    );
    assert_eq!(controller.state().kind(), StateKind::Success);
}

#[tokio::test]
async fn cancel_settles_as_failed() {
    let mock = Arc::new(MockService::new(vec![Ok(verdict())]).with_delay(Duration::from_secs(60)));
    let mut controller = Controller::new(mock.clone());
    let (handle, token) = cancel::pair();

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.cancel();
    });

    let submission = tokio::time::timeout(
        Duration::from_secs(5),
        controller.submit("slow one", &token),
    )
    .await
    .expect("cancel did not interrupt the call");
    canceller.await.unwrap();

    assert_eq!(submission, Submission::Settled(StateKind::Failed));
    assert_eq!(
        controller.state(),
        &InteractionState::Failed(RequestError::Cancelled)
    );
    assert!(!controller.is_pending());
}

#[tokio::test]
async fn last_result_survives_later_failure() {
    let (mut controller, _mock) = build(vec![Ok(verdict()), Err(RequestError::Cancelled)]);
    controller.submit("a", &CancelToken::never()).await;
    controller.submit("b", &CancelToken::never()).await;
    assert_eq!(controller.state().kind(), StateKind::Failed);
    assert_eq!(controller.last_result(), Some(&verdict()));
}
