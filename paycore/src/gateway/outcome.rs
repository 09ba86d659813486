use serde::{Deserialize, Serialize};

/// Reasons a gateway attempt can fail.
///
/// These four are the only kinds the recovery analyzer (`crate::recovery`) knows how to
/// reason about; anything else degrades to `escalate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Timeout,
    InsufficientFunds,
    BankDecline,
    FraudBlock,
}

/// Result of invoking a [`GatewayEffect`](super::effect::GatewayEffect) once.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Success {
        gateway: String,
        latency_ms: f64,
    },
    Failure {
        gateway: String,
        latency_ms: f64,
        error_kind: ErrorKind,
    },
    /// The requested gateway label is not part of the configured fleet.
    NotFound {
        gateway: String,
    },
}

impl Outcome {
    pub fn gateway(&self) -> &str {
        match self {
            Outcome::Success { gateway, .. } => gateway,
            Outcome::Failure { gateway, .. } => gateway,
            Outcome::NotFound { gateway } => gateway,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }
}
