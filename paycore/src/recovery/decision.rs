use serde::{Deserialize, Serialize};

use crate::gateway::ErrorKind;

/// The action the orchestrator should take in response to the most recent attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterventionPlan {
    None,
    Retry,
    RetryAlternate,
    Block,
    Escalate,
}

/// Full recovery decision, including the audit fields carried into `history`
/// (`spec.md` §4.4).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub action: InterventionPlan,
    pub confidence: f64,
    pub summary: String,
    pub reason: Reason,
}

/// Structured justification for a [`Decision`], suitable for UI display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Reason {
    pub error_kind: Option<ErrorKind>,
    pub rationale: &'static str,
}
