mod breaker;
mod manager;
mod params;

pub use breaker::CircuitState;
pub use manager::{BreakerView, Sentinel};
pub use params::SentinelParams;
