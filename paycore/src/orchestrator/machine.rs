use std::collections::BTreeMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::instrument;
use uuid::Uuid;

use crate::gateway::{ErrorKind, GatewayEffect, Outcome};
use crate::recovery::{self, InterventionPlan};
use crate::router::{Posterior, Router};
use crate::sentinel::{BreakerView, CircuitState, Sentinel};

use super::state::{HistoryStep, LastError, PaymentContext, ProcessRequest, ProcessResponse, TransactionState};

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("no configured gateway is eligible to receive this transaction")]
    NoEligibleGateway,
}

/// Read-only fleet-wide state, the in-process analogue of the out-of-scope
/// HTTP observability endpoint (`spec.md` §3.1, §6).
#[derive(Debug, Clone, Serialize)]
pub struct ObservabilitySnapshot {
    pub router: BTreeMap<String, Posterior>,
    pub sentinel: BTreeMap<String, BreakerView>,
}

/// Wires C2 (router) + C3 (sentinel) + C4 (analyzer) + C1 (gateway effect) into
/// the ROUTE -> EXECUTE -> RECOVER retry loop (`spec.md` §4.5).
pub struct Orchestrator {
    gateways: Vec<String>,
    router: Arc<Router>,
    sentinel: Arc<Sentinel>,
    gateway_effect: Arc<dyn GatewayEffect>,
    max_attempts: u32,
}

impl Orchestrator {
    pub fn new(
        gateways: Vec<String>,
        router: Arc<Router>,
        sentinel: Arc<Sentinel>,
        gateway_effect: Arc<dyn GatewayEffect>,
        max_attempts: u32,
    ) -> Self {
        Self {
            gateways,
            router,
            sentinel,
            gateway_effect,
            max_attempts,
        }
    }

    pub fn observe(&self) -> ObservabilitySnapshot {
        ObservabilitySnapshot {
            router: self.router.state().into_iter().collect(),
            sentinel: self.sentinel.snapshot(),
        }
    }

    /// Drives one transaction through the retry state machine to completion.
    #[instrument(skip(self, request, cancellation), fields(transaction_id))]
    pub async fn process(
        &self,
        request: ProcessRequest,
        cancellation: Option<CancellationToken>,
    ) -> ProcessResponse {
        let transaction_id = request
            .transaction_id
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        tracing::Span::current().record("transaction_id", transaction_id.as_str());

        let context = PaymentContext {
            amount: request.amount,
            currency: request.currency,
            payment_method: request.payment_method,
            merchant_id: request.merchant_id,
            client_metadata: request.client_metadata,
        };
        let mut state = TransactionState::new(transaction_id, context);

        loop {
            if Self::is_cancelled(&cancellation) {
                state.success = false;
                state.last_error = Some(LastError::Cancelled);
                state.push_history(HistoryStep::Cancelled);
                break;
            }

            let gateway = match self.route(&mut state) {
                Ok(gateway) => gateway,
                Err(_) => {
                    // Defensive: only reachable if the configured gateway set is empty,
                    // which is rejected at config-validation time.
                    state.success = false;
                    break;
                }
            };

            if Self::is_cancelled(&cancellation) {
                state.success = false;
                state.last_error = Some(LastError::Cancelled);
                state.push_history(HistoryStep::Cancelled);
                break;
            }

            let not_found = self.execute(&mut state, &gateway).await;
            if not_found {
                break;
            }

            // Cancellation is only honored after the in-flight C1 invocation
            // returns; check immediately so a signal raised during `execute()`
            // takes effect before RECOVER runs and the loop decides on a retry.
            if Self::is_cancelled(&cancellation) {
                state.success = false;
                state.last_error = Some(LastError::Cancelled);
                state.push_history(HistoryStep::Cancelled);
                break;
            }

            self.recover(&mut state);

            if state.success {
                break;
            }
            // `attempt_count` counts retries decided so far, not calls made; the
            // call just completed was call number `attempt_count + 1`, so the cap
            // is enforced against that, keeping total C1 invocations <= max_attempts.
            if state.attempt_count + 1 >= self.max_attempts {
                break;
            }
            match state.intervention_plan {
                InterventionPlan::Retry | InterventionPlan::RetryAlternate => {
                    state.attempt_count += 1;
                }
                InterventionPlan::None | InterventionPlan::Block | InterventionPlan::Escalate => {
                    break;
                }
            }
        }

        state.into()
    }

    fn is_cancelled(token: &Option<CancellationToken>) -> bool {
        token.as_ref().is_some_and(|t| t.is_cancelled())
    }

    /// ROUTE step (`spec.md` §4.5).
    fn route(&self, state: &mut TransactionState) -> Result<String, OrchestratorError> {
        let primary = self
            .router
            .select()
            .map_err(|_| OrchestratorError::NoEligibleGateway)?;

        let mut gateway = primary.clone();
        if self.sentinel.status(&gateway) == CircuitState::Open {
            if let Some(alt) = self.first_non_open(None) {
                gateway = alt;
            }
        }

        if state.intervention_plan == InterventionPlan::RetryAlternate {
            let previous = state.route_decision.clone();
            if let Some(alt) = self.first_non_open(previous.as_deref()) {
                gateway = alt;
            }
        }

        let breaker_status = self.sentinel.status(&gateway);
        state.route_decision = Some(gateway.clone());
        state.push_history(HistoryStep::Route {
            gateway: gateway.clone(),
            breaker_status,
        });
        Ok(gateway)
    }

    /// First configured gateway (in configured order) whose breaker is not OPEN,
    /// optionally excluding `exclude`. Falls back to `exclude` itself if it is
    /// the only non-OPEN candidate (`spec.md` §4.5 step 3).
    fn first_non_open(&self, exclude: Option<&str>) -> Option<String> {
        let mut fallback = None;
        for gateway in &self.gateways {
            if self.sentinel.status(gateway) != CircuitState::Open {
                if Some(gateway.as_str()) == exclude {
                    fallback = Some(gateway.clone());
                } else {
                    return Some(gateway.clone());
                }
            }
        }
        fallback
    }

    /// EXECUTE step. Returns `true` if the outcome was a terminal `NotFound`.
    async fn execute(&self, state: &mut TransactionState, gateway: &str) -> bool {
        let amount: Decimal = state.payment_context.amount;
        let currency = state.payment_context.currency.clone();
        let effect = self.gateway_effect.clone();
        let gateway_owned = gateway.to_string();

        // Run behind a task so a panicking effect implementation surfaces as a
        // JoinError here rather than taking the orchestrator down with it
        // (`spec.md` §7).
        let outcome = match tokio::spawn(async move {
            effect.execute(&gateway_owned, amount, &currency).await
        })
        .await
        {
            Ok(outcome) => outcome,
            Err(_join_error) => normalize_join_error(gateway),
        };

        match outcome {
            Outcome::Success { .. } => {
                state.success = true;
                state.last_error = None;
                self.router.update(gateway, true);
                self.sentinel.record(gateway, true);
                state.push_history(HistoryStep::Execute {
                    gateway: gateway.to_string(),
                    success: true,
                    error_kind: None,
                });
                false
            }
            Outcome::Failure { error_kind, .. } => {
                state.success = false;
                state.last_error = Some(LastError::Gateway(error_kind));
                self.router.update(gateway, false);
                self.sentinel.record(gateway, false);
                state.push_history(HistoryStep::Execute {
                    gateway: gateway.to_string(),
                    success: false,
                    error_kind: Some(error_kind),
                });
                false
            }
            Outcome::NotFound { .. } => {
                // Configuration error, not a gateway fault: never retried, never
                // counted against the router/sentinel, never handed to the
                // analyzer (`spec.md` §9 decision 3).
                state.success = false;
                state.last_error = Some(LastError::GatewayNotFound);
                state.push_history(HistoryStep::Execute {
                    gateway: gateway.to_string(),
                    success: false,
                    error_kind: None,
                });
                true
            }
        }
    }

    /// RECOVER step.
    fn recover(&self, state: &mut TransactionState) {
        let error_kind = match state.last_error {
            Some(LastError::Gateway(kind)) => Some(kind),
            _ => None,
        };
        let decision = recovery::analyze(error_kind, &state.history);
        state.intervention_plan = decision.action;
        state.push_history(HistoryStep::Recovery { decision });
    }
}

/// Normalizes a panicked/join-errored gateway-effect task into the analyzer's
/// transient-failure shape (`spec.md` §7).
pub fn normalize_join_error(gateway: &str) -> Outcome {
    Outcome::Failure {
        gateway: gateway.to_string(),
        latency_ms: 0.0,
        error_kind: ErrorKind::Timeout,
    }
}
