//! Measurement oracles
//!
//! An oracle runs a full empirical measurement of one configuration and
//! reports a single score where higher is better. Measurements are expensive
//! and noisy; the search calls an oracle at most once per configuration.

pub mod command;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::MeasurementError;
use crate::genome::configuration::Configuration;

/// Result of a successful measurement
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Score, higher is better
    pub score: f64,
    /// Unit the score is expressed in, used only for reporting
    pub unit: String,
}

impl Measurement {
    /// Create a new measurement
    pub fn new(score: f64, unit: impl Into<String>) -> Self {
        Self {
            score,
            unit: unit.into(),
        }
    }

    /// Check the oracle contract: finite and non-negative
    pub fn is_valid(&self) -> bool {
        self.score.is_finite() && self.score >= 0.0
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {}", self.score, self.unit)
    }
}

/// Measurement oracle trait
///
/// Implementations are shared across worker threads when candidates are
/// scored in parallel, hence the `Send + Sync` bound.
pub trait MeasurementOracle: Send + Sync {
    /// Measure a configuration
    ///
    /// Blocks until the measurement cycle completes.
    fn measure(&self, configuration: &Configuration) -> Result<Measurement, MeasurementError>;
}

impl<F> MeasurementOracle for F
where
    F: Fn(&Configuration) -> Result<Measurement, MeasurementError> + Send + Sync,
{
    fn measure(&self, configuration: &Configuration) -> Result<Measurement, MeasurementError> {
        self(configuration)
    }
}

pub mod prelude {
    pub use super::command::*;
    pub use super::{Measurement, MeasurementOracle};
}
