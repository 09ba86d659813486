mod rng;
mod thompson;

pub use rng::{RngSource, StdRngSource};
pub use thompson::{Posterior, Router, RouterError};
