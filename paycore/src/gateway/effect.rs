use async_trait::async_trait;
use rust_decimal::Decimal;

use super::outcome::Outcome;

/// The sole I/O boundary of the core (`spec.md` §4.1).
///
/// No retry, timeout, or logging happens behind this trait — that is the orchestrator's job.
/// Implementations must be safe to call concurrently from many transaction tasks.
#[async_trait]
pub trait GatewayEffect: Send + Sync {
    async fn execute(&self, gateway: &str, amount: Decimal, currency: &str) -> Outcome;
}
