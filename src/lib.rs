//! # evotune
//!
//! Evolutionary tuning of integer configuration parameters.
//!
//! The search treats the system being tuned as a black box: a
//! [`MeasurementOracle`](oracle::MeasurementOracle) runs a candidate
//! configuration and reports a throughput-style score, higher is better.
//! Measurements are expensive and noisy, so every configuration is measured
//! at most once and its score is cached for the rest of its life.
//!
//! ## Core Concepts
//!
//! - **Configuration**: one integer gene per named parameter plus a lazily computed fitness
//! - **Population**: configurations kept in descending score order
//! - **Generation Controller**: baseline, scoring, report, elitism, roulette breeding
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use evotune::prelude::*;
//! use rand::SeedableRng;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(42);
//! let oracle = CommandOracle::new(CommandOracleConfig {
//!     program: "./bench.sh".to_string(),
//!     args: vec![],
//!     argument_format: DEFAULT_ARGUMENT_FORMAT.to_string(),
//! });
//!
//! let outcome = GenerationController::reference(
//!     ParameterSpace::hotspot_inlining().shared(),
//!     ControllerConfig::default(),
//! )?
//! .run(&oracle, &mut rng)?;
//!
//! println!("{}", outcome.best);
//! ```

pub mod algorithms;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod genome;
pub mod operators;
pub mod oracle;
pub mod population;
pub mod termination;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::algorithms::prelude::*;
    pub use crate::config::{StagnationConfig, TunerConfig};
    pub use crate::diagnostics::prelude::*;
    pub use crate::error::*;
    pub use crate::genome::prelude::*;
    pub use crate::operators::prelude::*;
    pub use crate::oracle::prelude::*;
    pub use crate::population::prelude::*;
    pub use crate::termination::prelude::*;
}
