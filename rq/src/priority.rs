//! Priority levels for queued requests

use serde::{Deserialize, Serialize};

/// Priority level attached to every submitted request
///
/// Levels are ordered most-urgent first, so `Immediate < High < Medium < Low`.
/// The ordinal doubles as the index into the queue's per-level storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Immediate,
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// Number of priority levels
    pub const COUNT: usize = 4;

    /// All levels in scan order (most urgent first)
    pub const ALL: [Priority; Priority::COUNT] = [Priority::Immediate, Priority::High, Priority::Medium, Priority::Low];

    /// Position of this level in [`Priority::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Immediate => write!(f, "immediate"),
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "immediate" | "1" => Ok(Self::Immediate),
            "high" | "2" => Ok(Self::High),
            "medium" | "3" => Ok(Self::Medium),
            "low" | "4" => Ok(Self::Low),
            _ => Err(format!("Unknown priority: {}", s)),
        }
    }
}

impl TryFrom<u8> for Priority {
    type Error = String;

    /// Numeric levels run from 1 (immediate) to 4 (low)
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1..=4 => Ok(Self::ALL[usize::from(value - 1)]),
            _ => Err(format!("Priority out of range: {}", value)),
        }
    }
}
