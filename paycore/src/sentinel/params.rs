use std::time::Duration;

/// Configured thresholds shared by every gateway's breaker (`spec.md` §4.3).
#[derive(Debug, Clone, Copy)]
pub struct SentinelParams {
    /// F in (0, 1]: failure ratio strictly above which CLOSED -> OPEN.
    pub failure_threshold: f64,
    /// T > 0: how long a breaker stays OPEN before a status read promotes it to HALF_OPEN.
    pub recovery_timeout: Duration,
    /// W >= 1: size of the bounded observation window.
    pub window_size: usize,
}

impl Default for SentinelParams {
    fn default() -> Self {
        Self {
            failure_threshold: 0.5,
            recovery_timeout: Duration::from_secs(30),
            window_size: 10,
        }
    }
}
