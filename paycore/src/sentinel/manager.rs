use std::collections::BTreeMap;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use super::breaker::{CircuitBreaker, CircuitState};
use super::params::SentinelParams;

/// Process-wide circuit-breaker sentinel: one [`CircuitBreaker`] per gateway,
/// held in a `DashMap` so `status`/`record`/`snapshot` are atomic per-gateway
/// without a single crate-wide lock (`spec.md` §5).
pub struct Sentinel {
    breakers: DashMap<String, CircuitBreaker>,
    params: SentinelParams,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakerView {
    pub status: CircuitState,
    pub window_len: usize,
    pub opened_at: Option<String>,
}

impl Sentinel {
    pub fn new(params: SentinelParams) -> Self {
        Self {
            breakers: DashMap::new(),
            params,
        }
    }

    /// Current status of `gateway`, lazily promoting OPEN -> HALF_OPEN if due.
    /// Unknown gateways start CLOSED on first observation.
    pub fn status(&self, gateway: &str) -> CircuitState {
        let mut entry = self.breakers.entry(gateway.to_string()).or_default();
        entry.status(gateway, &self.params)
    }

    /// Records the outcome of one attempt against `gateway`.
    pub fn record(&self, gateway: &str, success: bool) {
        let mut entry = self.breakers.entry(gateway.to_string()).or_default();
        entry.record(gateway, success, &self.params);
    }

    /// Refreshes every known gateway's lazy status, then returns a deep-copy snapshot.
    pub fn snapshot(&self) -> BTreeMap<String, BreakerView> {
        let gateways: Vec<String> = self.breakers.iter().map(|e| e.key().clone()).collect();
        for gateway in &gateways {
            self.status(gateway);
        }

        self.breakers
            .iter()
            .map(|entry| {
                (
                    entry.key().clone(),
                    BreakerView {
                        status: entry.value().raw_state(),
                        window_len: entry.value().window_len(),
                        opened_at: entry.value().opened_at_rfc3339(),
                    },
                )
            })
            .collect()
    }
}
