use std::sync::Arc;

use paycore::gateway::{ErrorKind, GatewayEffect, Outcome, ScriptedGateway, ScriptedOutcome};
use paycore::orchestrator::{HistoryStep, Orchestrator, ProcessRequest};
use paycore::router::{Router, StdRngSource};
use paycore::sentinel::{Sentinel, SentinelParams};
use rust_decimal::Decimal;

fn request() -> ProcessRequest {
    ProcessRequest {
        transaction_id: None,
        amount: Decimal::new(100, 2),
        currency: "USD".to_string(),
        payment_method: "card".to_string(),
        merchant_id: "merchant-1".to_string(),
        client_metadata: Default::default(),
    }
}

/// Invariant 1 (`spec.md` §8): a transaction never exceeds `max_attempts` calls
/// to the gateway effect, across a range of configured caps.
#[tokio::test]
async fn attempt_count_never_exceeds_max_attempts() {
    for max_attempts in [1u32, 2, 3, 5] {
        let gateway = ScriptedGateway::script(
            "A",
            vec![ScriptedOutcome::Failure(ErrorKind::Timeout)],
        );
        let router = Arc::new(Router::new(
            ["A".to_string()],
            Box::new(StdRngSource::seeded(1)),
        ));
        let sentinel = Arc::new(Sentinel::new(SentinelParams::default()));
        let orchestrator = Orchestrator::new(
            vec!["A".to_string()],
            router,
            sentinel,
            Arc::new(gateway),
            max_attempts,
        );

        let response = orchestrator.process(request(), None).await;
        let execute_steps = response
            .history
            .iter()
            .filter(|s| matches!(s.step, HistoryStep::Execute { .. }))
            .count() as u32;

        assert_eq!(
            execute_steps, max_attempts,
            "max_attempts={max_attempts} should yield exactly that many calls when every attempt times out"
        );
    }
}

/// `NotFound` is a terminal failure: never retried, never handed to the
/// recovery analyzer (`spec.md` §9 decision 3).
#[tokio::test]
async fn unknown_gateway_label_is_terminal_not_retried() {
    let gateway = ScriptedGateway::new(); // no script registered for "ghost"
    let router = Arc::new(Router::new(
        ["ghost".to_string()],
        Box::new(StdRngSource::seeded(1)),
    ));
    let sentinel = Arc::new(Sentinel::new(SentinelParams::default()));
    let orchestrator = Orchestrator::new(
        vec!["ghost".to_string()],
        router,
        sentinel,
        Arc::new(gateway),
        3,
    );

    let response = orchestrator.process(request(), None).await;

    assert!(!response.success);
    let execute_steps = response
        .history
        .iter()
        .filter(|s| matches!(s.step, HistoryStep::Execute { .. }))
        .count();
    assert_eq!(execute_steps, 1);
    assert!(
        !response
            .history
            .iter()
            .any(|s| matches!(s.step, HistoryStep::Recovery { .. })),
        "a NotFound outcome must never reach the recovery analyzer"
    );
}

struct CountingEffect {
    inner: Arc<dyn GatewayEffect>,
    calls: std::sync::atomic::AtomicU32,
}

#[async_trait::async_trait]
impl GatewayEffect for CountingEffect {
    async fn execute(&self, gateway: &str, amount: Decimal, currency: &str) -> Outcome {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.inner.execute(gateway, amount, currency).await
    }
}

/// Invariant 3 (`spec.md` §8): exactly one gateway-effect call per history
/// `Execute` step — the orchestrator never calls out without recording it.
#[tokio::test]
async fn one_gateway_call_per_execute_history_step() {
    let scripted = ScriptedGateway::script(
        "A",
        vec![
            ScriptedOutcome::Failure(ErrorKind::BankDecline),
            ScriptedOutcome::Failure(ErrorKind::BankDecline),
            ScriptedOutcome::Success,
        ],
    );
    let counting = Arc::new(CountingEffect {
        inner: Arc::new(scripted),
        calls: std::sync::atomic::AtomicU32::new(0),
    });

    let router = Arc::new(Router::new(
        ["A".to_string()],
        Box::new(StdRngSource::seeded(3)),
    ));
    let sentinel = Arc::new(Sentinel::new(SentinelParams::default()));
    let orchestrator = Orchestrator::new(
        vec!["A".to_string()],
        router,
        sentinel,
        counting.clone(),
        5,
    );

    let response = orchestrator.process(request(), None).await;
    let execute_steps = response
        .history
        .iter()
        .filter(|s| matches!(s.step, HistoryStep::Execute { .. }))
        .count() as u32;

    assert_eq!(counting.calls.load(std::sync::atomic::Ordering::SeqCst), execute_steps);
}
