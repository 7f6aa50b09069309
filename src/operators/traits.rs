//! Operator traits
//!
//! This module defines the operator traits the generation controller is
//! generic over. Every operator receives its randomness explicitly.

use rand::Rng;

use crate::error::{EvoResult, OperatorError};
use crate::genome::configuration::Configuration;

/// Selection operator trait
///
/// Selects breeding parents from a scored population.
pub trait SelectionOperator: Send + Sync {
    /// Select a single member of the pool
    ///
    /// Returns the index of the selected member. Every member must already
    /// be scored.
    fn select<R: Rng>(&self, pool: &[Configuration], rng: &mut R) -> EvoResult<usize>;
}

/// Crossover operator trait
///
/// Combines the genes of two parents into one unscored child.
pub trait CrossoverOperator: Send + Sync {
    /// Produce a child from `primary` and `secondary`
    ///
    /// The argument order matters for asymmetric operators.
    fn crossover<R: Rng>(
        &self,
        primary: &Configuration,
        secondary: &Configuration,
        rng: &mut R,
    ) -> Result<Configuration, OperatorError>;

    /// Get the per-gene probability of inheriting from the primary parent
    fn crossover_probability(&self) -> f64 {
        0.5
    }
}

/// Mutation operator trait
///
/// Derives a new unscored configuration from an existing one.
pub trait MutationOperator: Send + Sync {
    /// Produce a mutated copy of `configuration`
    fn mutate<R: Rng>(&self, configuration: &Configuration, rng: &mut R) -> Configuration;

    /// Get the mutation probability per gene
    fn mutation_probability(&self) -> f64 {
        1.0
    }
}
