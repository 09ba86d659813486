use async_trait::async_trait;
use dashmap::DashMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use rust_decimal::Decimal;
use std::sync::Mutex;
use std::time::Duration;

use super::effect::GatewayEffect;
use super::outcome::{ErrorKind, Outcome};

const ALL_ERROR_KINDS: [ErrorKind; 4] = [
    ErrorKind::Timeout,
    ErrorKind::InsufficientFunds,
    ErrorKind::BankDecline,
    ErrorKind::FraudBlock,
];

/// Runtime-mutable parameters of one simulated issuer, mirroring the original
/// mock gateway fleet's `success_rate`/`latency_mean`/`latency_std` trio.
#[derive(Debug, Clone)]
pub struct SimulatedGatewayParams {
    pub success_rate: f64,
    pub latency_mean_ms: f64,
    pub latency_std_ms: f64,
}

impl Default for SimulatedGatewayParams {
    fn default() -> Self {
        Self {
            success_rate: 0.9,
            latency_mean_ms: 200.0,
            latency_std_ms: 50.0,
        }
    }
}

/// A fleet of named simulated gateways with independently configurable success rates and
/// latency distributions. Standing in for a real acquirer connection in the CLI and in tests.
///
/// Configuration is mutable at runtime through [`SimulatedGateway::update_config`] — the
/// in-process analogue of the original system's operator/test config endpoint. That mutation
/// surface is not wired to any network listener here (the HTTP front door is out of scope).
pub struct SimulatedGateway {
    gateways: DashMap<String, SimulatedGatewayParams>,
    rng: Mutex<StdRng>,
}

impl SimulatedGateway {
    pub fn new(gateways: impl IntoIterator<Item = (String, SimulatedGatewayParams)>) -> Self {
        Self {
            gateways: gateways.into_iter().collect(),
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    pub fn with_seed(
        gateways: impl IntoIterator<Item = (String, SimulatedGatewayParams)>,
        seed: u64,
    ) -> Self {
        Self {
            gateways: gateways.into_iter().collect(),
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn update_config(&self, gateway: &str, params: SimulatedGatewayParams) {
        self.gateways.insert(gateway.to_string(), params);
    }
}

#[async_trait]
impl GatewayEffect for SimulatedGateway {
    async fn execute(&self, gateway: &str, _amount: Decimal, _currency: &str) -> Outcome {
        let Some(params) = self.gateways.get(gateway) else {
            return Outcome::NotFound {
                gateway: gateway.to_string(),
            };
        };
        let params = params.clone();

        let (latency_ms, success, error_idx) = {
            let mut rng = self.rng.lock().expect("simulated gateway rng lock poisoned");
            let normal = Normal::new(params.latency_mean_ms, params.latency_std_ms.max(1e-6))
                .expect("valid normal distribution parameters");
            let latency_ms = normal.sample(&mut *rng).max(1.0);
            let success = rng.random_bool(params.success_rate.clamp(0.0, 1.0));
            let error_idx = rng.random_range(0..ALL_ERROR_KINDS.len());
            (latency_ms, success, error_idx)
        };

        tokio::time::sleep(Duration::from_micros((latency_ms * 1000.0) as u64).min(Duration::from_millis(5)))
            .await;

        if success {
            Outcome::Success {
                gateway: gateway.to_string(),
                latency_ms,
            }
        } else {
            Outcome::Failure {
                gateway: gateway.to_string(),
                latency_ms,
                error_kind: ALL_ERROR_KINDS[error_idx],
            }
        }
    }
}

/// A scripted gateway: replays a fixed sequence of outcomes per gateway label, for
/// deterministic scenario tests (`spec.md` §8 S1-S6).
///
/// Calling past the end of a gateway's script repeats its last entry.
pub struct ScriptedGateway {
    scripts: DashMap<String, Vec<Outcome>>,
    cursors: DashMap<String, usize>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self {
            scripts: DashMap::new(),
            cursors: DashMap::new(),
        }
    }

    pub fn script(gateway: &str, outcomes: Vec<ScriptedOutcome>) -> Self {
        let me = Self::new();
        me.set_script(gateway, outcomes);
        me
    }

    pub fn set_script(&self, gateway: &str, outcomes: Vec<ScriptedOutcome>) {
        let resolved = outcomes
            .into_iter()
            .map(|o| o.into_outcome(gateway))
            .collect();
        self.scripts.insert(gateway.to_string(), resolved);
        self.cursors.insert(gateway.to_string(), 0);
    }
}

impl Default for ScriptedGateway {
    fn default() -> Self {
        Self::new()
    }
}

/// A terse description of a scripted step, resolved against the gateway label it runs under.
#[derive(Debug, Clone)]
pub enum ScriptedOutcome {
    Success,
    Failure(ErrorKind),
}

impl ScriptedOutcome {
    fn into_outcome(self, gateway: &str) -> Outcome {
        match self {
            ScriptedOutcome::Success => Outcome::Success {
                gateway: gateway.to_string(),
                latency_ms: 1.0,
            },
            ScriptedOutcome::Failure(error_kind) => Outcome::Failure {
                gateway: gateway.to_string(),
                latency_ms: 1.0,
                error_kind,
            },
        }
    }
}

#[async_trait]
impl GatewayEffect for ScriptedGateway {
    async fn execute(&self, gateway: &str, _amount: Decimal, _currency: &str) -> Outcome {
        let Some(script) = self.scripts.get(gateway) else {
            return Outcome::NotFound {
                gateway: gateway.to_string(),
            };
        };
        if script.is_empty() {
            return Outcome::NotFound {
                gateway: gateway.to_string(),
            };
        }

        let mut cursor = self.cursors.entry(gateway.to_string()).or_insert(0);
        let idx = (*cursor).min(script.len() - 1);
        let outcome = script[idx].clone();
        if *cursor < script.len() - 1 {
            *cursor += 1;
        }
        outcome
    }
}
