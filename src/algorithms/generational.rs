//! Generation controller
//!
//! This module implements the generational tuning loop. Every generation
//! measures the default configuration afresh as a baseline, scores the
//! candidates, reports them against the baseline, then breeds the next
//! candidates from elites plus roulette-selected children.

use std::sync::Arc;
use std::time::Instant;

use log::{info, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::diagnostics::report::GenerationReport;
use crate::diagnostics::{GenerationStats, SearchOutcome, SearchStats, TimingStats};
use crate::error::{EvoResult, EvolutionError};
use crate::genome::configuration::Configuration;
use crate::genome::parameters::ParameterSpace;
use crate::operators::crossover::{AlleleCrossover, DEFAULT_CROSSOVER_PROBABILITY};
use crate::operators::mutation::{ScalingMutation, DEFAULT_MUTATION_PROBABILITY};
use crate::operators::selection::RouletteSelection;
use crate::operators::traits::{CrossoverOperator, MutationOperator, SelectionOperator};
use crate::oracle::{Measurement, MeasurementOracle};
use crate::population::population::Population;
use crate::termination::{MaxGenerations, SearchState, TerminationCriterion};

/// How the generation-0 candidates are built
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitialPopulation {
    /// Every candidate starts at the parameter defaults
    #[default]
    Defaults,
    /// First candidate at the defaults, the rest one mutation away from them
    Mutated,
}

/// Configuration for the generation controller
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Population size (N)
    pub population_size: usize,
    /// Number of top members carried over unchanged (E)
    pub elite_count: usize,
    /// Per-gene probability of inheriting from the primary parent
    pub crossover_probability: f64,
    /// Per-gene mutation probability
    pub mutation_probability: f64,
    /// Number of generations to run (G)
    pub max_generations: usize,
    /// Whether to score unscored candidates in parallel
    pub parallel_evaluation: bool,
    /// Generation-0 policy
    pub initial_population: InitialPopulation,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            population_size: 10,
            elite_count: 2,
            crossover_probability: DEFAULT_CROSSOVER_PROBABILITY,
            mutation_probability: DEFAULT_MUTATION_PROBABILITY,
            max_generations: 100,
            parallel_evaluation: false,
            initial_population: InitialPopulation::Defaults,
        }
    }
}

impl ControllerConfig {
    /// Check the settings for consistency
    pub fn validate(&self) -> EvoResult<()> {
        if self.population_size == 0 {
            return Err(EvolutionError::Configuration(
                "Population size must be at least 1".to_string(),
            ));
        }
        if self.elite_count > self.population_size {
            return Err(EvolutionError::Configuration(format!(
                "Elite count {} exceeds population size {}",
                self.elite_count, self.population_size
            )));
        }
        if self.max_generations == 0 {
            return Err(EvolutionError::Configuration(
                "At least one generation must run".to_string(),
            ));
        }
        for (name, p) in [
            ("Crossover", self.crossover_probability),
            ("Mutation", self.mutation_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(EvolutionError::Configuration(format!(
                    "{} probability must be in [0, 1], got {}",
                    name, p
                )));
            }
        }
        Ok(())
    }
}

/// Builder for GenerationController
pub struct GenerationControllerBuilder<S, C, M, Term> {
    config: ControllerConfig,
    space: Option<Arc<ParameterSpace>>,
    selection: Option<S>,
    crossover: Option<C>,
    mutation: Option<M>,
    termination: Option<Term>,
}

impl GenerationControllerBuilder<(), (), (), ()> {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: ControllerConfig::default(),
            space: None,
            selection: None,
            crossover: None,
            mutation: None,
            termination: None,
        }
    }
}

impl Default for GenerationControllerBuilder<(), (), (), ()> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, C, M, Term> GenerationControllerBuilder<S, C, M, Term> {
    /// Set the population size
    pub fn population_size(mut self, size: usize) -> Self {
        self.config.population_size = size;
        self
    }

    /// Set the number of elites carried over each generation
    pub fn elite_count(mut self, count: usize) -> Self {
        self.config.elite_count = count;
        self
    }

    /// Enable or disable parallel candidate scoring
    pub fn parallel_evaluation(mut self, enabled: bool) -> Self {
        self.config.parallel_evaluation = enabled;
        self
    }

    /// Set the generation-0 policy
    pub fn initial_population(mut self, policy: InitialPopulation) -> Self {
        self.config.initial_population = policy;
        self
    }

    /// Set the parameter space being tuned
    pub fn space(mut self, space: Arc<ParameterSpace>) -> Self {
        self.space = Some(space);
        self
    }

    /// Set the selection operator
    pub fn selection<NewS>(self, selection: NewS) -> GenerationControllerBuilder<NewS, C, M, Term>
    where
        NewS: SelectionOperator,
    {
        GenerationControllerBuilder {
            config: self.config,
            space: self.space,
            selection: Some(selection),
            crossover: self.crossover,
            mutation: self.mutation,
            termination: self.termination,
        }
    }

    /// Set the crossover operator
    pub fn crossover<NewC>(self, crossover: NewC) -> GenerationControllerBuilder<S, NewC, M, Term>
    where
        NewC: CrossoverOperator,
    {
        GenerationControllerBuilder {
            config: self.config,
            space: self.space,
            selection: self.selection,
            crossover: Some(crossover),
            mutation: self.mutation,
            termination: self.termination,
        }
    }

    /// Set the mutation operator
    pub fn mutation<NewM>(self, mutation: NewM) -> GenerationControllerBuilder<S, C, NewM, Term>
    where
        NewM: MutationOperator,
    {
        GenerationControllerBuilder {
            config: self.config,
            space: self.space,
            selection: self.selection,
            crossover: self.crossover,
            mutation: Some(mutation),
            termination: self.termination,
        }
    }

    /// Set the termination criterion
    pub fn termination<NewTerm>(
        self,
        termination: NewTerm,
    ) -> GenerationControllerBuilder<S, C, M, NewTerm>
    where
        NewTerm: TerminationCriterion,
    {
        GenerationControllerBuilder {
            config: self.config,
            space: self.space,
            selection: self.selection,
            crossover: self.crossover,
            mutation: self.mutation,
            termination: Some(termination),
        }
    }

    /// Set max generations (convenience method)
    pub fn max_generations(mut self, max: usize) -> GenerationControllerBuilder<S, C, M, MaxGenerations> {
        self.config.max_generations = max;
        GenerationControllerBuilder {
            config: self.config,
            space: self.space,
            selection: self.selection,
            crossover: self.crossover,
            mutation: self.mutation,
            termination: Some(MaxGenerations::new(max)),
        }
    }
}

impl<S, C, M, Term> GenerationControllerBuilder<S, C, M, Term>
where
    S: SelectionOperator,
    C: CrossoverOperator,
    M: MutationOperator,
    Term: TerminationCriterion,
{
    /// Build the GenerationController instance
    pub fn build(self) -> EvoResult<GenerationController<S, C, M, Term>> {
        let space = self.space.ok_or_else(|| {
            EvolutionError::Configuration("Parameter space must be specified".to_string())
        })?;

        let selection = self.selection.ok_or_else(|| {
            EvolutionError::Configuration("Selection operator must be specified".to_string())
        })?;

        let crossover = self.crossover.ok_or_else(|| {
            EvolutionError::Configuration("Crossover operator must be specified".to_string())
        })?;

        let mutation = self.mutation.ok_or_else(|| {
            EvolutionError::Configuration("Mutation operator must be specified".to_string())
        })?;

        let termination = self.termination.ok_or_else(|| {
            EvolutionError::Configuration("Termination criterion must be specified".to_string())
        })?;

        let mut config = self.config;
        config.crossover_probability = crossover.crossover_probability();
        config.mutation_probability = mutation.mutation_probability();
        config.validate()?;

        Ok(GenerationController {
            baseline: Configuration::from_defaults(space.clone()),
            config,
            space,
            selection,
            crossover,
            mutation,
            termination,
        })
    }
}

/// Everything one generation produced
#[derive(Clone, Debug)]
pub struct GenerationOutcome {
    /// Scored population, best first
    pub population: Population,
    /// Diagnostic table
    pub report: GenerationReport,
    /// Summary statistics
    pub stats: GenerationStats,
}

/// Generational controller with elitism and roulette breeding
///
/// Candidates are scored through their cached fitness, so an elite carried
/// into the next generation is never measured again. The baseline is
/// measured on every generation and never cached.
pub struct GenerationController<S, C, M, Term> {
    config: ControllerConfig,
    space: Arc<ParameterSpace>,
    baseline: Configuration,
    selection: S,
    crossover: C,
    mutation: M,
    termination: Term,
}

impl GenerationController<RouletteSelection, AlleleCrossover, ScalingMutation, MaxGenerations> {
    /// Controller with the reference operators and a fixed generation count
    pub fn reference(space: Arc<ParameterSpace>, config: ControllerConfig) -> EvoResult<Self> {
        config.validate()?;
        let crossover = AlleleCrossover::with_probability(config.crossover_probability);
        let mutation = ScalingMutation::with_probability(config.mutation_probability);
        let termination = MaxGenerations::new(config.max_generations);
        GenerationControllerBuilder {
            config,
            space: Some(space),
            selection: Some(RouletteSelection::new()),
            crossover: Some(crossover),
            mutation: Some(mutation),
            termination: Some(termination),
        }
        .build()
    }
}

impl<S, C, M, Term> GenerationController<S, C, M, Term>
where
    S: SelectionOperator,
    C: CrossoverOperator,
    M: MutationOperator,
    Term: TerminationCriterion,
{
    /// Create a builder for GenerationController
    pub fn builder() -> GenerationControllerBuilder<(), (), (), ()> {
        GenerationControllerBuilder::new()
    }

    /// Effective configuration
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Parameter space being tuned
    pub fn space(&self) -> &Arc<ParameterSpace> {
        &self.space
    }

    /// Build the generation-0 candidates, all unscored
    pub fn initial_candidates<R: Rng>(&self, rng: &mut R) -> Vec<Configuration> {
        let defaults = Configuration::from_defaults(self.space.clone());
        match self.config.initial_population {
            InitialPopulation::Defaults => vec![defaults; self.config.population_size],
            InitialPopulation::Mutated => {
                let mut candidates = Vec::with_capacity(self.config.population_size);
                candidates.push(defaults.clone());
                while candidates.len() < self.config.population_size {
                    candidates.push(self.mutation.mutate(&defaults, rng));
                }
                candidates
            }
        }
    }

    /// Measure the default configuration afresh
    ///
    /// A failed or invalid baseline is logged and reported as unavailable.
    pub fn measure_baseline<O>(&self, oracle: &O) -> Option<Measurement>
    where
        O: MeasurementOracle + ?Sized,
    {
        match oracle.measure(&self.baseline) {
            Ok(m) if m.is_valid() => Some(m),
            Ok(m) => {
                warn!("Baseline returned invalid score {}; deltas omitted", m.score);
                None
            }
            Err(e) => {
                warn!("Baseline measurement failed: {}; deltas omitted", e);
                None
            }
        }
    }

    /// Run one generation's measure, score and report steps
    ///
    /// `evaluations` is the oracle invocation count before this generation;
    /// the returned stats carry the updated total.
    pub fn evaluate_generation<O>(
        &self,
        generation: usize,
        candidates: Vec<Configuration>,
        oracle: &O,
        evaluations: usize,
    ) -> EvoResult<GenerationOutcome>
    where
        O: MeasurementOracle + ?Sized,
    {
        if candidates.len() != self.config.population_size {
            return Err(EvolutionError::InvariantViolation(format!(
                "generation {} has {} candidates, expected {}",
                generation,
                candidates.len(),
                self.config.population_size
            )));
        }

        let gen_start = Instant::now();

        // Baseline first, never concurrently with candidates
        let baseline_start = Instant::now();
        let baseline = self.measure_baseline(oracle);
        let baseline_time = baseline_start.elapsed();

        let eval_start = Instant::now();
        let (population, measured) =
            Population::evaluate(candidates, oracle, self.config.parallel_evaluation);
        let eval_time = eval_start.elapsed();

        let evaluations = evaluations + 1 + measured;
        let report = GenerationReport::new(generation, baseline.clone(), &population);
        let timing = TimingStats::new()
            .with_baseline(baseline_time)
            .with_evaluation(eval_time)
            .with_total(gen_start.elapsed());
        let stats = GenerationStats::from_population(
            &population,
            generation,
            evaluations,
            baseline.map(|b| b.score),
        )
        .with_timing(timing);

        Ok(GenerationOutcome {
            population,
            report,
            stats,
        })
    }

    /// Breed the next generation's candidates from a scored population
    ///
    /// The top elites are copied with their cached scores; the rest are
    /// unscored children, two per selected parent pair.
    pub fn breed<R: Rng>(
        &self,
        population: &Population,
        generation: usize,
        rng: &mut R,
    ) -> EvoResult<Vec<Configuration>> {
        let size = self.config.population_size;
        let mut next = population.elites(self.config.elite_count);

        while next.len() < size {
            let first = population.select_to_breed(&self.selection, rng)?;
            let second = population.select_to_breed(&self.selection, rng)?;

            let child = self.crossover.crossover(first, second, rng)?;
            next.push(self.mutation.mutate(&child, rng).with_generation(generation));

            if next.len() < size {
                let child = self.crossover.crossover(second, first, rng)?;
                next.push(self.mutation.mutate(&child, rng).with_generation(generation));
            }
        }

        debug_assert_eq!(next.len(), size);
        Ok(next)
    }

    /// Run the search, logging every generation's report
    pub fn run<O, R>(&self, oracle: &O, rng: &mut R) -> EvoResult<SearchOutcome>
    where
        O: MeasurementOracle + ?Sized,
        R: Rng,
    {
        self.run_with_observer(oracle, rng, |report| {
            for line in report.to_string().lines() {
                info!("{}", line);
            }
        })
    }

    /// Run the search, handing every generation's report to `observer`
    pub fn run_with_observer<O, R, F>(
        &self,
        oracle: &O,
        rng: &mut R,
        mut observer: F,
    ) -> EvoResult<SearchOutcome>
    where
        O: MeasurementOracle + ?Sized,
        R: Rng,
        F: FnMut(&GenerationReport),
    {
        let start_time = Instant::now();

        let mut stats = SearchStats::new();
        let mut evaluations = 0;
        let mut score_history: Vec<f64> = Vec::new();
        let mut candidates = self.initial_candidates(rng);
        let mut generation = 0;

        loop {
            let outcome = self.evaluate_generation(generation, candidates, oracle, evaluations)?;
            evaluations = outcome.stats.evaluations;

            info!(
                "Generation {}: best {:.2}, mean {:.2}, baseline {}, {} failed, {} oracle calls",
                generation,
                outcome.stats.best_score,
                outcome.stats.mean_score,
                outcome
                    .stats
                    .baseline_score
                    .map_or_else(|| "unavailable".to_string(), |b| format!("{:.2}", b)),
                outcome.stats.failed,
                evaluations
            );
            observer(&outcome.report);

            score_history.push(outcome.stats.best_score);
            stats.record(outcome.stats);
            let population = outcome.population;
            generation += 1;

            let state = SearchState {
                generation,
                evaluations,
                best_score: score_history[score_history.len() - 1],
                score_history: &score_history,
            };

            if self.termination.should_terminate(&state) {
                stats.set_termination_reason(self.termination.reason_for(&state));
                stats.set_runtime(start_time.elapsed());

                let best = population
                    .best()
                    .cloned()
                    .ok_or(EvolutionError::EmptyPopulation)?;

                return Ok(SearchOutcome {
                    best,
                    population,
                    generations: generation,
                    evaluations,
                    stats,
                });
            }

            let breed_start = Instant::now();
            candidates = self.breed(&population, generation, rng)?;
            if let Some(last) = stats.generations.last_mut() {
                last.timing = last.timing.clone().with_breeding(breed_start.elapsed());
                last.timing.total_ms += last.timing.breeding_ms;
            }
        }
    }
}
