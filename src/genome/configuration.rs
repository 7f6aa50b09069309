//! Configuration (chromosome)
//!
//! A configuration is one candidate gene vector over a shared parameter
//! space, plus its lazily computed fitness. The fitness is computed at most
//! once: the first call to [`Configuration::score`] invokes the oracle, every
//! later call returns the cached value.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use log::{debug, warn};

use crate::error::OperatorError;
use crate::genome::parameters::ParameterSpace;
use crate::oracle::{Measurement, MeasurementOracle};

/// Score assigned to configurations whose measurement failed
///
/// Smallest positive normal float: worse than any real measurement, yet it
/// keeps the roulette total strictly positive when every candidate fails.
pub const FAILED_SCORE: f64 = f64::MIN_POSITIVE;

/// Fitness state of a configuration
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Fitness {
    /// Not yet measured
    #[default]
    Unscored,
    /// Measured successfully
    Measured(Measurement),
    /// Measurement failed; scores as [`FAILED_SCORE`]
    Failed {
        /// Why the measurement failed
        reason: String,
    },
}

impl Fitness {
    /// Check if a score is available
    pub fn is_scored(&self) -> bool {
        !matches!(self, Self::Unscored)
    }

    /// Scalar score, None if unscored
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Unscored => None,
            Self::Measured(m) => Some(m.score),
            Self::Failed { .. } => Some(FAILED_SCORE),
        }
    }

    /// The successful measurement, if any
    pub fn measurement(&self) -> Option<&Measurement> {
        match self {
            Self::Measured(m) => Some(m),
            _ => None,
        }
    }
}

/// A candidate configuration
#[derive(Clone, Debug)]
pub struct Configuration {
    space: Arc<ParameterSpace>,
    genes: Vec<i64>,
    fitness: Fitness,
    birth_generation: usize,
}

impl Configuration {
    /// Create an unscored configuration with every gene at its default
    pub fn from_defaults(space: Arc<ParameterSpace>) -> Self {
        let genes = space.defaults();
        Self {
            space,
            genes,
            fitness: Fitness::Unscored,
            birth_generation: 0,
        }
    }

    /// Create an unscored configuration from explicit genes
    ///
    /// Genes are clamped into their parameters' bounds.
    pub fn from_genes(space: Arc<ParameterSpace>, genes: Vec<i64>) -> Result<Self, OperatorError> {
        if genes.len() != space.len() {
            return Err(OperatorError::DimensionMismatch {
                expected: space.len(),
                actual: genes.len(),
            });
        }
        let genes = genes
            .into_iter()
            .enumerate()
            .map(|(i, g)| space.clamp(i, g))
            .collect();
        Ok(Self {
            space,
            genes,
            fitness: Fitness::Unscored,
            birth_generation: 0,
        })
    }

    /// Unscored sibling over the same space with replacement genes
    ///
    /// Genes are clamped into bounds; the birth generation is inherited.
    pub(crate) fn derive(&self, genes: Vec<i64>) -> Self {
        debug_assert_eq!(genes.len(), self.genes.len());
        let genes = genes
            .into_iter()
            .enumerate()
            .map(|(i, g)| self.space.clamp(i, g))
            .collect();
        Self {
            space: self.space.clone(),
            genes,
            fitness: Fitness::Unscored,
            birth_generation: self.birth_generation,
        }
    }

    /// Create a configuration with a known fitness
    pub fn with_fitness(mut self, fitness: Fitness) -> Self {
        self.fitness = fitness;
        self
    }

    /// Set the generation this configuration was bred in
    pub fn with_generation(mut self, generation: usize) -> Self {
        self.birth_generation = generation;
        self
    }

    /// Score this configuration, measuring it on first access
    ///
    /// A failed or contract-violating measurement marks the configuration as
    /// [`Fitness::Failed`]; the search carries on with it deprioritised.
    pub fn score<O>(&mut self, oracle: &O) -> f64
    where
        O: MeasurementOracle + ?Sized,
    {
        if let Some(value) = self.fitness.value() {
            return value;
        }

        self.fitness = match oracle.measure(self) {
            Ok(m) if m.is_valid() => {
                debug!("Measured {} {} for {}", m.score, m.unit, self);
                Fitness::Measured(m)
            }
            Ok(m) => {
                warn!("Discarding invalid score {} for {}", m.score, self);
                Fitness::Failed {
                    reason: format!("invalid score {}", m.score),
                }
            }
            Err(e) => {
                warn!("Measurement failed for {}: {}", self, e);
                Fitness::Failed {
                    reason: e.to_string(),
                }
            }
        };

        self.fitness.value().unwrap_or(FAILED_SCORE)
    }

    /// Current fitness state
    pub fn fitness(&self) -> &Fitness {
        &self.fitness
    }

    /// Cached score, None if unscored
    pub fn cached_score(&self) -> Option<f64> {
        self.fitness.value()
    }

    /// Check if this configuration has been scored
    pub fn is_scored(&self) -> bool {
        self.fitness.is_scored()
    }

    /// Gene values, in parameter order
    pub fn genes(&self) -> &[i64] {
        &self.genes
    }

    /// Gene value by parameter name
    pub fn gene(&self, name: &str) -> Option<i64> {
        self.space.index_of(name).map(|i| self.genes[i])
    }

    /// Iterate `(name, value)` pairs in parameter order
    pub fn named_genes(&self) -> impl Iterator<Item = (&str, i64)> {
        self.space
            .iter()
            .zip(self.genes.iter())
            .map(|(p, &g)| (p.name.as_str(), g))
    }

    /// The parameter space this configuration is built over
    pub fn space(&self) -> &Arc<ParameterSpace> {
        &self.space
    }

    /// Generation this configuration was created in
    pub fn birth_generation(&self) -> usize {
        self.birth_generation
    }

    /// Check that another configuration has the same gene layout
    pub fn check_compatible(&self, other: &Self) -> Result<(), OperatorError> {
        if Arc::ptr_eq(&self.space, &other.space) || self.space == other.space {
            Ok(())
        } else if self.genes.len() != other.genes.len() {
            Err(OperatorError::DimensionMismatch {
                expected: self.genes.len(),
                actual: other.genes.len(),
            })
        } else {
            Err(OperatorError::SpaceMismatch {
                expected: self.space.names().join(","),
                actual: other.space.names().join(","),
            })
        }
    }

    /// Descending-score order between two configurations
    ///
    /// Failed configurations sort after every measured one, zero scores
    /// included; unscored configurations sort last.
    pub fn cmp_by_score(&self, other: &Self) -> Ordering {
        match (&self.fitness, &other.fitness) {
            (Fitness::Measured(a), Fitness::Measured(b)) => {
                b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal)
            }
            (a, b) => rank(a).cmp(&rank(b)),
        }
    }
}

fn rank(fitness: &Fitness) -> u8 {
    match fitness {
        Fitness::Measured(_) => 0,
        Fitness::Failed { .. } => 1,
        Fitness::Unscored => 2,
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, value) in self.named_genes() {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{}={}", name, value)?;
            first = false;
        }
        Ok(())
    }
}
