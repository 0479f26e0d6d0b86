//! Rate limiters that pace the dispatch loop
//!
//! The loop only needs "take one token, suspending until one is available".
//! [`Pacer`] spaces tokens evenly on the tokio clock; [`GovernorLimiter`]
//! delegates to a `governor` GCRA limiter.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Errors from building or using a rate limiter
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LimiterError {
    #[error("Rate limit out of range: {0} per second")]
    InvalidRate(u32),

    #[error("Rate limiter unavailable: {0}")]
    Unavailable(String),
}

/// Highest rate whose slot spacing is still at least one nanosecond
pub const MAX_RATE_PER_SEC: u32 = 1_000_000_000;

/// Token source consulted once per dispatched task
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Suspend until one token is available, then consume it
    async fn take(&self) -> Result<(), LimiterError>;
}

/// Evenly spaced tokens, `1/rate` apart
///
/// The first take is immediate. Idle time is not banked, so N takes always
/// span at least `(N - 1) / rate`.
pub struct Pacer {
    interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl Pacer {
    /// Create a pacer allowing `rate` takes per second
    pub fn per_second(rate: u32) -> Result<Self, LimiterError> {
        debug!(rate, "Pacer::per_second: called");
        if rate == 0 || rate > MAX_RATE_PER_SEC {
            return Err(LimiterError::InvalidRate(rate));
        }
        Ok(Self {
            interval: Duration::from_secs(1) / rate,
            next_slot: Mutex::new(None),
        })
    }

    /// Spacing between consecutive tokens
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

#[async_trait]
impl RateLimiter for Pacer {
    async fn take(&self) -> Result<(), LimiterError> {
        let slot = {
            let mut next_slot = self.next_slot.lock().await;
            let now = Instant::now();
            let slot = match *next_slot {
                Some(reserved) if reserved > now => reserved,
                _ => now,
            };
            *next_slot = Some(slot + self.interval);
            slot
        };

        tokio::time::sleep_until(slot).await;
        Ok(())
    }
}

/// `governor` direct limiter with a burst of one
pub struct GovernorLimiter {
    inner: DefaultDirectRateLimiter,
}

impl GovernorLimiter {
    pub fn per_second(rate: u32) -> Result<Self, LimiterError> {
        debug!(rate, "GovernorLimiter::per_second: called");
        if rate > MAX_RATE_PER_SEC {
            return Err(LimiterError::InvalidRate(rate));
        }
        let per_second = NonZeroU32::new(rate).ok_or(LimiterError::InvalidRate(rate))?;
        let quota = Quota::per_second(per_second).allow_burst(NonZeroU32::MIN);
        Ok(Self {
            inner: governor::RateLimiter::direct(quota),
        })
    }
}

#[async_trait]
impl RateLimiter for GovernorLimiter {
    async fn take(&self) -> Result<(), LimiterError> {
        self.inner.until_ready().await;
        Ok(())
    }
}

/// Which limiter implementation the dispatcher builds from config
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LimiterKind {
    #[default]
    Pacer,
    Governor,
}

impl LimiterKind {
    /// Build a limiter of this kind allowing `rate` takes per second
    pub fn build(self, rate: u32) -> Result<Arc<dyn RateLimiter>, LimiterError> {
        debug!(kind = ?self, rate, "LimiterKind::build: called");
        Ok(match self {
            LimiterKind::Pacer => Arc::new(Pacer::per_second(rate)?),
            LimiterKind::Governor => Arc::new(GovernorLimiter::per_second(rate)?),
        })
    }
}
