mod machine;
mod state;

pub use machine::{normalize_join_error, ObservabilitySnapshot, Orchestrator, OrchestratorError};
pub use state::{
    HistoryEntry, HistoryStep, LastError, PaymentContext, ProcessRequest, ProcessResponse,
    TransactionState,
};
