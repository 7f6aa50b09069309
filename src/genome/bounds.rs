//! Bounds for gene values
//!
//! Gene bounds are the domain policy for a single tunable parameter. Operators
//! clamp their results into the bounds, so an unbounded parameter is free to
//! drift to zero or to very large values.

use serde::{Deserialize, Serialize};

/// Inclusive bounds for a single integer gene
///
/// Either side may be open. The default is fully unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneBounds {
    /// Lower bound (inclusive)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,
    /// Upper bound (inclusive)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
}

impl GeneBounds {
    /// Create new closed bounds
    ///
    /// # Panics
    /// Panics if min > max
    pub fn new(min: i64, max: i64) -> Self {
        assert!(
            min <= max,
            "Invalid bounds: min ({}) must be <= max ({})",
            min,
            max
        );
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    /// Bounds that accept every value
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Bounds with only a lower limit
    pub fn at_least(min: i64) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    /// Bounds with only an upper limit
    pub fn at_most(max: i64) -> Self {
        Self {
            min: None,
            max: Some(max),
        }
    }

    /// Check whether neither side is limited
    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// Check that min <= max when both are present
    pub fn is_valid(&self) -> bool {
        match (self.min, self.max) {
            (Some(min), Some(max)) => min <= max,
            _ => true,
        }
    }

    /// Check if a value is within bounds
    pub fn contains(&self, value: i64) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }

    /// Clamp a value to be within bounds
    pub fn clamp(&self, value: i64) -> i64 {
        let value = self.min.map_or(value, |min| value.max(min));
        self.max.map_or(value, |max| value.min(max))
    }
}
