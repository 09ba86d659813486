use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Beta, Distribution};
use std::sync::Mutex;

/// Wraps the pseudorandom source behind a trait so Thompson sampling is
/// injectable and deterministic under a seed in tests (`spec.md` §4.2, §9).
///
/// A single source is shared by every `select()` call for the lifetime of the
/// router, so a seeded source produces a reproducible but non-constant sequence.
pub trait RngSource: Send + Sync {
    /// Draw one sample from `Beta(alpha, beta)`.
    fn sample_beta(&self, alpha: f64, beta: f64) -> f64;
}

/// Default source: a single `StdRng`, guarded by a mutex, seeded from OS entropy
/// or from a fixed seed for reproducible test runs.
pub struct StdRngSource {
    rng: Mutex<StdRng>,
}

impl StdRngSource {
    pub fn from_os_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RngSource for StdRngSource {
    fn sample_beta(&self, alpha: f64, beta: f64) -> f64 {
        let dist = Beta::new(alpha, beta).expect("router posterior parameters are always >= 1.0");
        let mut rng = self.rng.lock().expect("router rng lock poisoned");
        dist.sample(&mut *rng)
    }
}
