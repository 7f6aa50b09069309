//! Crossover operators
//!
//! Discrete per-gene crossover: every child gene is copied from one parent or
//! the other, never blended.

use rand::Rng;

use crate::error::OperatorError;
use crate::genome::configuration::Configuration;
use crate::operators::traits::CrossoverOperator;

/// Default probability of inheriting a gene from the primary parent
pub const DEFAULT_CROSSOVER_PROBABILITY: f64 = 0.1;

/// Biased per-gene allele crossover
///
/// For each gene independently, the child takes the primary parent's allele
/// with `probability` and the secondary parent's allele otherwise. With the
/// default bias of 0.1 the child mostly resembles the secondary parent.
#[derive(Clone, Debug)]
pub struct AlleleCrossover {
    /// Probability of choosing from the primary parent
    pub probability: f64,
}

impl AlleleCrossover {
    /// Create a crossover with the default bias
    pub fn new() -> Self {
        Self {
            probability: DEFAULT_CROSSOVER_PROBABILITY,
        }
    }

    /// Create with a specific bias towards the primary parent
    pub fn with_probability(probability: f64) -> Self {
        assert!(
            (0.0..=1.0).contains(&probability),
            "Probability must be in [0, 1]"
        );
        Self { probability }
    }
}

impl Default for AlleleCrossover {
    fn default() -> Self {
        Self::new()
    }
}

impl CrossoverOperator for AlleleCrossover {
    fn crossover<R: Rng>(
        &self,
        primary: &Configuration,
        secondary: &Configuration,
        rng: &mut R,
    ) -> Result<Configuration, OperatorError> {
        primary.check_compatible(secondary)?;

        let genes = primary
            .genes()
            .iter()
            .zip(secondary.genes())
            .map(|(&a, &b)| if rng.gen::<f64>() < self.probability { a } else { b })
            .collect();

        Configuration::from_genes(primary.space().clone(), genes)
    }

    fn crossover_probability(&self) -> f64 {
        self.probability
    }
}
