use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::gateway::ErrorKind;
use crate::recovery::{Decision, InterventionPlan};
use crate::sentinel::CircuitState;

/// Immutable input to a transaction, supplied by the caller (`spec.md` §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentContext {
    pub amount: Decimal,
    pub currency: String,
    pub payment_method: String,
    pub merchant_id: String,
    /// Free-form merchant-supplied correlation data, carried through untouched
    /// and never inspected by the core.
    #[serde(default)]
    pub client_metadata: HashMap<String, String>,
}

/// The terminal/retriable classification of the most recent attempt's failure.
///
/// Distinct from [`ErrorKind`]: the latter is only what the recovery analyzer
/// can reason about, while this also covers the two terminal markers that
/// never reach `analyze()` (`spec.md` §9 decision 3, §5 cancellation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LastError {
    Gateway(ErrorKind),
    GatewayNotFound,
    Cancelled,
}

/// One entry in a transaction's audit trail (`spec.md` §3.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum HistoryStep {
    Route {
        gateway: String,
        breaker_status: CircuitState,
    },
    Execute {
        gateway: String,
        success: bool,
        error_kind: Option<ErrorKind>,
    },
    Recovery {
        decision: Decision,
    },
    Cancelled,
}

/// A [`HistoryStep`] stamped with the wall-clock time it was recorded, mirroring
/// the teacher's `opened_at_rfc3339` convention for human-readable timestamps in
/// audit/observability output (`spec.md` §3.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub at: String,
    pub step: HistoryStep,
}

/// Mutable per-transaction state, owned exclusively by the orchestrator for the
/// lifetime of one `process()` call (`spec.md` §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionState {
    pub transaction_id: String,
    pub payment_context: PaymentContext,
    pub route_decision: Option<String>,
    pub attempt_count: u32,
    pub last_error: Option<LastError>,
    pub success: bool,
    pub intervention_plan: InterventionPlan,
    pub history: Vec<HistoryEntry>,
}

impl TransactionState {
    pub fn new(transaction_id: String, payment_context: PaymentContext) -> Self {
        Self {
            transaction_id,
            payment_context,
            route_decision: None,
            attempt_count: 0,
            last_error: None,
            success: false,
            intervention_plan: InterventionPlan::None,
            history: Vec::new(),
        }
    }

    /// Appends a step to the audit trail, stamping it with the current time.
    pub fn push_history(&mut self, step: HistoryStep) {
        self.history.push(HistoryEntry {
            at: chrono::Utc::now().to_rfc3339(),
            step,
        });
    }
}

/// Request accepted at the orchestrator's external boundary (`spec.md` §6).
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessRequest {
    pub transaction_id: Option<String>,
    pub amount: Decimal,
    pub currency: String,
    pub payment_method: String,
    pub merchant_id: String,
    #[serde(default)]
    pub client_metadata: HashMap<String, String>,
}

/// Response returned at the orchestrator's external boundary (`spec.md` §6).
#[derive(Debug, Clone, Serialize)]
pub struct ProcessResponse {
    pub transaction_id: String,
    pub success: bool,
    pub route_decision: Option<String>,
    pub intervention_plan: InterventionPlan,
    pub last_error: Option<LastError>,
    pub history: Vec<HistoryEntry>,
}

impl From<TransactionState> for ProcessResponse {
    fn from(state: TransactionState) -> Self {
        Self {
            transaction_id: state.transaction_id,
            success: state.success,
            route_decision: state.route_decision,
            intervention_plan: state.intervention_plan,
            last_error: state.last_error,
            history: state.history,
        }
    }
}
