//! Run configuration file
//!
//! The JSON document read by the `evotune` binary: search settings, the
//! parameters to tune and the benchmark command that measures them.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::algorithms::generational::{
    ControllerConfig, GenerationController, GenerationControllerBuilder,
};
use crate::error::{EvoResult, EvolutionError};
use crate::genome::parameters::ParameterSpace;
use crate::operators::crossover::AlleleCrossover;
use crate::operators::mutation::ScalingMutation;
use crate::operators::selection::RouletteSelection;
use crate::oracle::command::{CommandOracleConfig, DEFAULT_ARGUMENT_FORMAT};
use crate::termination::{AnyOf, FitnessStagnation, MaxGenerations, TerminationCriterion};

/// Early stop when the best score stops moving
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StagnationConfig {
    /// Generations to look back
    pub window: usize,
    /// Minimum change of the best score over the window
    pub epsilon: f64,
}

/// Controller type assembled from a run configuration
pub type ConfiguredController =
    GenerationController<RouletteSelection, AlleleCrossover, ScalingMutation, AnyOf>;

/// Complete run configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TunerConfig {
    /// Search settings
    #[serde(default)]
    pub search: ControllerConfig,
    /// Random seed; drawn from entropy when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Optional early stop
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stagnation: Option<StagnationConfig>,
    /// Parameters to tune, in argument order
    pub parameters: ParameterSpace,
    /// Benchmark command
    pub oracle: CommandOracleConfig,
}

impl TunerConfig {
    /// Read and validate a configuration file
    pub fn load(path: &Path) -> EvoResult<Self> {
        let content = fs::read_to_string(path)?;
        let config: TunerConfig = serde_json::from_str(&content).map_err(|e| {
            EvolutionError::Configuration(format!("{}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check the settings for consistency
    ///
    /// The parameter list is already checked while deserializing.
    pub fn validate(&self) -> EvoResult<()> {
        self.search.validate()?;

        if self.oracle.program.trim().is_empty() {
            return Err(EvolutionError::Configuration(
                "Oracle program must not be empty".to_string(),
            ));
        }
        if !self.oracle.argument_format.contains("{value}") {
            return Err(EvolutionError::Configuration(format!(
                "Argument format {:?} has no {{value}} placeholder",
                self.oracle.argument_format
            )));
        }
        if let Some(stagnation) = &self.stagnation {
            if stagnation.window == 0 {
                return Err(EvolutionError::Configuration(
                    "Stagnation window must be at least 1".to_string(),
                ));
            }
            if !(stagnation.epsilon.is_finite() && stagnation.epsilon >= 0.0) {
                return Err(EvolutionError::Configuration(format!(
                    "Stagnation epsilon must be finite and non-negative, got {}",
                    stagnation.epsilon
                )));
            }
        }
        Ok(())
    }

    /// Assemble the generation controller for this configuration
    pub fn controller(&self) -> EvoResult<ConfiguredController> {
        self.validate()?;

        let mut criteria: Vec<Box<dyn TerminationCriterion>> =
            vec![Box::new(MaxGenerations::new(self.search.max_generations))];
        if let Some(s) = &self.stagnation {
            criteria.push(Box::new(FitnessStagnation::new(s.window, s.epsilon)));
        }

        GenerationControllerBuilder::new()
            .space(self.parameters.clone().shared())
            .population_size(self.search.population_size)
            .elite_count(self.search.elite_count)
            .parallel_evaluation(self.search.parallel_evaluation)
            .initial_population(self.search.initial_population)
            .selection(RouletteSelection::new())
            .crossover(AlleleCrossover::with_probability(
                self.search.crossover_probability,
            ))
            .mutation(ScalingMutation::with_probability(
                self.search.mutation_probability,
            ))
            .max_generations(self.search.max_generations)
            .termination(AnyOf::new(criteria))
            .build()
    }

    /// Example configuration tuning the HotSpot inlining flags
    pub fn example() -> Self {
        Self {
            search: ControllerConfig::default(),
            seed: Some(42),
            stagnation: None,
            parameters: ParameterSpace::hotspot_inlining(),
            oracle: CommandOracleConfig {
                program: "java".to_string(),
                args: vec![
                    "-jar".to_string(),
                    "target/benchmarks.jar".to_string(),
                    "-XX:+UnlockDiagnosticVMOptions".to_string(),
                ],
                argument_format: DEFAULT_ARGUMENT_FORMAT.to_string(),
            },
        }
    }
}
