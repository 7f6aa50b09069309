//! Mutation operators
//!
//! Multiplicative scaling mutation for integer genes.

use rand::Rng;
use rand_distr::{Distribution, Open01, Uniform};

use crate::genome::configuration::Configuration;
use crate::operators::traits::MutationOperator;

/// Default per-gene mutation probability
pub const DEFAULT_MUTATION_PROBABILITY: f64 = 0.5;

/// Outcome of mutating a single gene
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GeneMutation {
    /// Mutation not triggered; value unchanged
    Kept(i64),
    /// Divided by a factor in (0, 2)
    Shrunk(i64),
    /// Multiplied by a factor in [0, 2)
    Grown(i64),
}

impl GeneMutation {
    /// Resulting gene value (before bounds are applied)
    pub fn value(&self) -> i64 {
        match *self {
            Self::Kept(v) | Self::Shrunk(v) | Self::Grown(v) => v,
        }
    }
}

/// Scaling mutation
///
/// Each gene mutates independently with `probability`. A mutated gene is,
/// with even odds, either divided by a uniform factor in `(0, 2)` or
/// multiplied by a uniform factor in `[0, 2)`, then truncated to an integer
/// and clamped into its parameter's bounds. Dividing by a factor close to
/// zero can make an unbounded gene very large.
#[derive(Clone, Debug)]
pub struct ScalingMutation {
    /// Per-gene mutation probability
    pub probability: f64,
}

impl ScalingMutation {
    /// Create a scaling mutation with the default probability
    pub fn new() -> Self {
        Self {
            probability: DEFAULT_MUTATION_PROBABILITY,
        }
    }

    /// Set the per-gene mutation probability
    pub fn with_probability(probability: f64) -> Self {
        assert!(
            (0.0..=1.0).contains(&probability),
            "Probability must be in [0, 1]"
        );
        Self { probability }
    }

    /// Mutate a single gene value
    pub fn mutate_gene<R: Rng>(&self, value: i64, rng: &mut R) -> GeneMutation {
        if rng.gen::<f64>() >= self.probability {
            return GeneMutation::Kept(value);
        }

        if rng.gen::<f64>() < 0.5 {
            let u: f64 = Open01.sample(rng);
            GeneMutation::Shrunk((value as f64 / (2.0 * u)) as i64)
        } else {
            let factor = Uniform::new(0.0, 2.0).sample(rng);
            GeneMutation::Grown((value as f64 * factor) as i64)
        }
    }
}

impl Default for ScalingMutation {
    fn default() -> Self {
        Self::new()
    }
}

impl MutationOperator for ScalingMutation {
    fn mutate<R: Rng>(&self, configuration: &Configuration, rng: &mut R) -> Configuration {
        let genes = configuration
            .genes()
            .iter()
            .map(|&g| self.mutate_gene(g, rng).value())
            .collect();
        configuration.derive(genes)
    }

    fn mutation_probability(&self) -> f64 {
        self.probability
    }
}
