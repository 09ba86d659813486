use std::collections::VecDeque;
use std::time::{Instant, SystemTime};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::params::SentinelParams;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

/// Per-gateway circuit breaker state machine (`spec.md` §4.3).
///
/// Lives inside a `dashmap::DashMap` entry in [`super::Sentinel`]; every method here
/// takes `&mut self` and is only ever called while holding that entry's shard lock,
/// which is how atomicity per-gateway is achieved (see `spec.md` §5).
#[derive(Debug, Clone)]
pub struct CircuitBreaker {
    state: CircuitState,
    window: VecDeque<bool>,
    last_failure_time: Option<Instant>,
    /// Wall-clock time of the most recent CLOSED/HALF_OPEN -> OPEN transition,
    /// cleared when the breaker closes again. `Instant` above drives the
    /// recovery-timeout math; this is purely for human-readable display
    /// (`spec.md` §3.1), mirroring the teacher's `opened_at_rfc3339`.
    opened_at: Option<SystemTime>,
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self {
            state: CircuitState::Closed,
            window: VecDeque::new(),
            last_failure_time: None,
            opened_at: None,
        }
    }
}

impl CircuitBreaker {
    /// Returns the current status, lazily promoting OPEN -> HALF_OPEN if the
    /// recovery timeout has elapsed. This is the only place that transition happens.
    pub fn status(&mut self, gateway: &str, params: &SentinelParams) -> CircuitState {
        if self.state == CircuitState::Open {
            let elapsed = self
                .last_failure_time
                .map(|t| t.elapsed())
                .unwrap_or_default();
            if elapsed > params.recovery_timeout {
                let from = self.state;
                self.state = CircuitState::HalfOpen;
                info!(
                    event = "circuit_transition",
                    gateway,
                    ?from,
                    to = ?self.state,
                    reason = "recovery_timeout_elapsed"
                );
            }
        }
        self.state
    }

    /// Records the outcome of one attempt against this gateway.
    pub fn record(&mut self, gateway: &str, success: bool, params: &SentinelParams) {
        match self.state {
            CircuitState::HalfOpen => {
                let from = self.state;
                if success {
                    self.state = CircuitState::Closed;
                    self.window = VecDeque::from([true]);
                    self.opened_at = None;
                } else {
                    self.state = CircuitState::Open;
                    self.last_failure_time = Some(Instant::now());
                    self.opened_at = Some(SystemTime::now());
                }
                info!(
                    event = "circuit_transition",
                    gateway,
                    ?from,
                    to = ?self.state,
                    reason = if success { "half_open_probe_succeeded" } else { "half_open_probe_failed" }
                );
            }
            CircuitState::Closed => {
                self.window.push_back(success);
                if self.window.len() > params.window_size {
                    self.window.pop_front();
                }

                if self.window.len() == params.window_size {
                    let failures = self.window.iter().filter(|s| !**s).count();
                    let ratio = failures as f64 / params.window_size as f64;
                    if ratio > params.failure_threshold {
                        self.state = CircuitState::Open;
                        self.last_failure_time = Some(Instant::now());
                        self.opened_at = Some(SystemTime::now());
                        info!(
                            event = "circuit_transition",
                            gateway,
                            from = ?CircuitState::Closed,
                            to = ?CircuitState::Open,
                            reason = "failure_ratio_exceeded",
                            failures,
                            window = params.window_size
                        );
                    }
                }
            }
            CircuitState::Open => {
                // No-op; OPEN only yields to HALF_OPEN through the lazy check in `status`.
            }
        }
    }

    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    pub fn raw_state(&self) -> CircuitState {
        self.state
    }

    /// RFC 3339 timestamp of the most recent time this breaker opened, if any.
    pub fn opened_at_rfc3339(&self) -> Option<String> {
        self.opened_at
            .map(|t| DateTime::<Utc>::from(t).to_rfc3339())
    }
}
