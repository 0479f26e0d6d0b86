//! Dispatcher configuration

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::queue::PriorityWeights;

use super::limiter::{LimiterKind, MAX_RATE_PER_SEC};

/// Dispatcher configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DispatcherConfig {
    /// Dispatched requests per second
    #[serde(default = "default_rate_limit_per_sec")]
    pub rate_limit_per_sec: u32,

    /// Reject submissions once this many requests are queued (unbounded when unset)
    #[serde(default)]
    pub max_queue_depth: Option<usize>,

    /// Rate limiter implementation
    #[serde(default)]
    pub limiter: LimiterKind,

    /// Per-level weight multipliers
    #[serde(default)]
    pub weights: PriorityWeights,
}

fn default_rate_limit_per_sec() -> u32 {
    10
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            rate_limit_per_sec: default_rate_limit_per_sec(),
            max_queue_depth: None,
            limiter: LimiterKind::default(),
            weights: PriorityWeights::default(),
        }
    }
}

impl DispatcherConfig {
    /// Check the values the dispatcher cannot run with
    pub fn validate(&self) -> Result<(), String> {
        debug!(?self, "DispatcherConfig::validate: called");
        if self.rate_limit_per_sec == 0 {
            return Err("rate-limit-per-sec must be at least 1".to_string());
        }
        if self.rate_limit_per_sec > MAX_RATE_PER_SEC {
            return Err(format!("rate-limit-per-sec must be at most {}", MAX_RATE_PER_SEC));
        }
        if self.max_queue_depth == Some(0) {
            return Err("max-queue-depth must be at least 1 when set".to_string());
        }
        self.weights.validate().map_err(|e| e.to_string())
    }
}
