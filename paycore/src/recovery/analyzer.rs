use crate::gateway::ErrorKind;
use crate::orchestrator::HistoryEntry;

use super::decision::{Decision, InterventionPlan, Reason};

/// Pure, stateless mapping from the most recent error (if any) to an intervention
/// plan (`spec.md` §4.4). `history` is accepted for interface completeness and
/// future audit-aware policies but today's table never reads it: same
/// `error_kind` always yields the same `Decision`.
pub fn analyze(error_kind: Option<ErrorKind>, history: &[HistoryEntry]) -> Decision {
    let _ = history;

    match error_kind {
        None => Decision {
            action: InterventionPlan::None,
            confidence: 1.0,
            summary: "attempt succeeded".to_string(),
            reason: Reason {
                error_kind: None,
                rationale: "success path; analyzer is a no-op",
            },
        },
        Some(ErrorKind::Timeout) => Decision {
            action: InterventionPlan::Retry,
            confidence: 0.9,
            summary: "gateway timed out, retrying".to_string(),
            reason: Reason {
                error_kind,
                rationale: "transient; same routing policy",
            },
        },
        Some(ErrorKind::InsufficientFunds) => Decision {
            action: InterventionPlan::Block,
            confidence: 0.95,
            summary: "insufficient funds".to_string(),
            reason: Reason {
                error_kind,
                rationale: "user-side permanent",
            },
        },
        Some(ErrorKind::BankDecline) => Decision {
            action: InterventionPlan::RetryAlternate,
            confidence: 0.6,
            summary: "bank declined, trying a different gateway".to_string(),
            reason: Reason {
                error_kind,
                rationale: "try different gateway",
            },
        },
        Some(ErrorKind::FraudBlock) => Decision {
            action: InterventionPlan::Block,
            confidence: 0.99,
            summary: "blocked as suspected fraud".to_string(),
            reason: Reason {
                error_kind,
                rationale: "risk-side permanent",
            },
        },
    }
}
