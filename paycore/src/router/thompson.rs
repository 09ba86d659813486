use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::rng::RngSource;

/// Beta-distribution parameters for one gateway's estimated success probability.
///
/// Invariant: `alpha >= 1.0 && beta >= 1.0`, strictly monotone non-decreasing
/// over the process lifetime (`spec.md` §3).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Posterior {
    pub alpha: f64,
    pub beta: f64,
}

impl Default for Posterior {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            beta: 1.0,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouterError {
    #[error("router has no configured gateways")]
    EmptyGatewaySet,
}

/// Thompson-sampling selector over the configured gateway set (`spec.md` §4.2).
///
/// `select`, `update`, and `state` are atomic with respect to each other: a single
/// mutex guards the posterior map, and the critical section is O(|gateways|)
/// arithmetic, so contention stays low under the concurrency model in §5.
pub struct Router {
    posteriors: Mutex<HashMap<String, Posterior>>,
    rng: Box<dyn RngSource>,
}

impl Router {
    pub fn new(gateways: impl IntoIterator<Item = impl Into<String>>, rng: Box<dyn RngSource>) -> Self {
        let posteriors = gateways
            .into_iter()
            .map(|g| (g.into(), Posterior::default()))
            .collect();
        Self {
            posteriors: Mutex::new(posteriors),
            rng,
        }
    }

    /// Draws one Thompson sample per gateway and returns the argmax, breaking ties
    /// lexicographically on the label for reproducibility under a seeded RNG.
    pub fn select(&self) -> Result<String, RouterError> {
        let posteriors = self.posteriors.lock().expect("router mutex poisoned");
        if posteriors.is_empty() {
            return Err(RouterError::EmptyGatewaySet);
        }

        let mut best: Option<(String, f64)> = None;
        // Iterate in label order so the lexicographic tiebreak below only ever
        // needs to prefer the first-seen label on an exact tie.
        let mut labels: Vec<&String> = posteriors.keys().collect();
        labels.sort();

        for label in labels {
            let p = posteriors[label];
            let sample = self.rng.sample_beta(p.alpha, p.beta);
            match &best {
                Some((_, best_sample)) if sample <= *best_sample => {}
                _ => best = Some((label.clone(), sample)),
            }
        }

        Ok(best.expect("non-empty gateway set yields a selection").0)
    }

    /// Updates the posterior of `gateway` given the outcome of one attempt.
    /// A no-op if `gateway` is not part of the configured set.
    pub fn update(&self, gateway: &str, success: bool) {
        let mut posteriors = self.posteriors.lock().expect("router mutex poisoned");
        if let Some(p) = posteriors.get_mut(gateway) {
            if success {
                p.alpha += 1.0;
            } else {
                p.beta += 1.0;
            }
        }
    }

    /// Read-only snapshot of every gateway's posterior, for observability.
    pub fn state(&self) -> HashMap<String, Posterior> {
        self.posteriors.lock().expect("router mutex poisoned").clone()
    }
}
