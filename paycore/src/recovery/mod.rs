mod analyzer;
mod decision;

pub use analyzer::analyze;
pub use decision::{Decision, InterventionPlan, Reason};
