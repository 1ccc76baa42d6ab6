//! Global fetch rate limiting
//!
//! A single GCRA limiter is shared by every worker. Permits are spaced evenly
//! (one every `1 / rate` seconds) with a burst of one, so the fetch rate stays
//! smooth instead of allowing a burst and then stalling.

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as Gcra};
use std::time::Duration;

use crate::ConfigError;

/// Blocking-acquire limiter admitting at most `rate` fetches per second
pub struct RateLimiter {
    limiter: Gcra<NotKeyed, InMemoryState, DefaultClock>,
    rate: f64,
}

impl RateLimiter {
    /// Creates a limiter for `permits_per_second` (may be fractional)
    pub fn new(permits_per_second: f64) -> Result<Self, ConfigError> {
        let period = permit_period(permits_per_second)?;
        let quota = Quota::with_period(period).ok_or_else(|| {
            ConfigError::Validation(format!(
                "rate limit {} permits/s is too high to schedule",
                permits_per_second
            ))
        })?;

        Ok(Self {
            limiter: Gcra::direct(quota),
            rate: permits_per_second,
        })
    }

    /// Waits until a permit is available
    pub async fn acquire(&self) {
        self.limiter.until_ready().await;
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }
}

/// Spacing between permits for `permits_per_second`
///
/// Rejects rates that are not positive and rates so small that the spacing
/// cannot be represented in nanoseconds.
pub fn permit_period(permits_per_second: f64) -> Result<Duration, ConfigError> {
    if !permits_per_second.is_finite() || permits_per_second <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "rate limit must be positive, got {}",
            permits_per_second
        )));
    }

    Duration::try_from_secs_f64(1.0 / permits_per_second)
        .ok()
        .filter(|period| u64::try_from(period.as_nanos()).is_ok())
        .ok_or_else(|| {
            ConfigError::Validation(format!(
                "rate limit {} permits/s is too low to schedule",
                permits_per_second
            ))
        })
}
