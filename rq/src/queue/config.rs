//! Weight multipliers for the priority queue

use serde::{Deserialize, Serialize};

use crate::priority::Priority;

use super::QueueError;

/// Per-level weight multipliers
///
/// A level's weight is its backlog size times its multiplier. Immediate is
/// large enough that any immediate entry wins; the other levels descend so a
/// long enough low-priority backlog eventually outweighs a trickle of
/// higher-priority work.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorityWeights {
    pub immediate: f64,
    pub high: f64,
    pub medium: f64,
    pub low: f64,
}

pub const DEFAULT_WEIGHT_IMMEDIATE: f64 = 100.0;
pub const DEFAULT_WEIGHT_HIGH: f64 = 0.8;
pub const DEFAULT_WEIGHT_MEDIUM: f64 = 0.6;
pub const DEFAULT_WEIGHT_LOW: f64 = 0.4;

impl Default for PriorityWeights {
    fn default() -> Self {
        Self {
            immediate: DEFAULT_WEIGHT_IMMEDIATE,
            high: DEFAULT_WEIGHT_HIGH,
            medium: DEFAULT_WEIGHT_MEDIUM,
            low: DEFAULT_WEIGHT_LOW,
        }
    }
}

impl PriorityWeights {
    /// Multiplier configured for a level
    pub fn multiplier(&self, priority: Priority) -> f64 {
        match priority {
            Priority::Immediate => self.immediate,
            Priority::High => self.high,
            Priority::Medium => self.medium,
            Priority::Low => self.low,
        }
    }

    /// Every multiplier must be finite and positive, otherwise a non-empty
    /// level could end up with weight 0 and never be served
    pub fn validate(&self) -> Result<(), QueueError> {
        for priority in Priority::ALL {
            let value = self.multiplier(priority);
            if !value.is_finite() || value <= 0.0 {
                return Err(QueueError::InvalidWeight { priority, value });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights() {
        let weights = PriorityWeights::default();
        assert_eq!(weights.multiplier(Priority::Immediate), 100.0);
        assert_eq!(weights.multiplier(Priority::High), 0.8);
        assert_eq!(weights.multiplier(Priority::Medium), 0.6);
        assert_eq!(weights.multiplier(Priority::Low), 0.4);
        assert!(weights.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_and_nan() {
        let weights = PriorityWeights {
            medium: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            weights.validate(),
            Err(QueueError::InvalidWeight {
                priority: Priority::Medium,
                ..
            })
        ));

        let weights = PriorityWeights {
            low: f64::NAN,
            ..Default::default()
        };
        assert!(weights.validate().is_err());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let weights: PriorityWeights = serde_yaml::from_str("low: 0.3\n").unwrap();
        assert_eq!(weights.low, 0.3);
        assert_eq!(weights.immediate, DEFAULT_WEIGHT_IMMEDIATE);
        assert_eq!(weights.high, DEFAULT_WEIGHT_HIGH);
    }
}
