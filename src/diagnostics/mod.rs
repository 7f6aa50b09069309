//! Diagnostics and statistics
//!
//! Per-generation reports and run-level statistics for a tuning search.

pub mod report;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::genome::configuration::{Configuration, Fitness};
use crate::population::population::Population;

/// Statistics for a single generation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Generation number
    pub generation: usize,
    /// Total oracle invocations so far, baselines included
    pub evaluations: usize,
    /// Best score in this generation
    pub best_score: f64,
    /// Worst score in this generation
    pub worst_score: f64,
    /// Mean score
    pub mean_score: f64,
    /// Median score
    pub median_score: f64,
    /// Members whose measurement failed
    pub failed: usize,
    /// Baseline score measured this generation
    pub baseline_score: Option<f64>,
    /// Timing information
    pub timing: TimingStats,
}

/// Timing statistics
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TimingStats {
    /// Time spent measuring the baseline (ms)
    pub baseline_ms: f64,
    /// Time spent measuring candidates (ms)
    pub evaluation_ms: f64,
    /// Time spent on selection, crossover and mutation (ms)
    pub breeding_ms: f64,
    /// Total generation time (ms)
    pub total_ms: f64,
}

impl TimingStats {
    /// Create new timing stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Set baseline time
    pub fn with_baseline(mut self, duration: Duration) -> Self {
        self.baseline_ms = duration.as_secs_f64() * 1000.0;
        self
    }

    /// Set evaluation time
    pub fn with_evaluation(mut self, duration: Duration) -> Self {
        self.evaluation_ms = duration.as_secs_f64() * 1000.0;
        self
    }

    /// Set breeding time
    pub fn with_breeding(mut self, duration: Duration) -> Self {
        self.breeding_ms = duration.as_secs_f64() * 1000.0;
        self
    }

    /// Set total time
    pub fn with_total(mut self, duration: Duration) -> Self {
        self.total_ms = duration.as_secs_f64() * 1000.0;
        self
    }
}

impl GenerationStats {
    /// Compute statistics from a scored population
    pub fn from_population(
        population: &Population,
        generation: usize,
        evaluations: usize,
        baseline_score: Option<f64>,
    ) -> Self {
        let failed = population
            .iter()
            .filter(|c| matches!(c.fitness(), Fitness::Failed { .. }))
            .count();

        let mut scores: Vec<f64> = population.iter().filter_map(|c| c.cached_score()).collect();
        if scores.is_empty() {
            return Self {
                generation,
                evaluations,
                best_score: f64::NEG_INFINITY,
                worst_score: f64::INFINITY,
                mean_score: 0.0,
                median_score: 0.0,
                failed,
                baseline_score,
                timing: TimingStats::default(),
            };
        }

        scores.sort_by(|a, b| a.total_cmp(b));

        // ranks follow the population order, where failures trail zero scores
        let best = population
            .best()
            .and_then(|c| c.cached_score())
            .unwrap_or(scores[scores.len() - 1]);
        let worst = population
            .worst()
            .and_then(|c| c.cached_score())
            .unwrap_or(scores[0]);
        let mean = scores.iter().sum::<f64>() / scores.len() as f64;
        let median = if scores.len() % 2 == 0 {
            (scores[scores.len() / 2 - 1] + scores[scores.len() / 2]) / 2.0
        } else {
            scores[scores.len() / 2]
        };

        Self {
            generation,
            evaluations,
            best_score: best,
            worst_score: worst,
            mean_score: mean,
            median_score: median,
            failed,
            baseline_score,
            timing: TimingStats::default(),
        }
    }

    /// Set timing information
    pub fn with_timing(mut self, timing: TimingStats) -> Self {
        self.timing = timing;
        self
    }
}

/// Statistics collector for an entire search
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SearchStats {
    /// Statistics per generation
    pub generations: Vec<GenerationStats>,
    /// Total runtime in milliseconds
    pub total_runtime_ms: f64,
    /// Reason for termination
    pub termination_reason: Option<String>,
}

impl SearchStats {
    /// Create a new stats collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a generation's statistics
    pub fn record(&mut self, stats: GenerationStats) {
        self.generations.push(stats);
    }

    /// Get the number of generations recorded
    pub fn num_generations(&self) -> usize {
        self.generations.len()
    }

    /// Get the best score across all generations
    pub fn best_score(&self) -> Option<f64> {
        self.generations
            .iter()
            .map(|g| g.best_score)
            .max_by(|a, b| a.total_cmp(b))
    }

    /// Get the final best score
    pub fn final_best_score(&self) -> Option<f64> {
        self.generations.last().map(|g| g.best_score)
    }

    /// Get the history of best scores
    pub fn best_score_history(&self) -> Vec<f64> {
        self.generations.iter().map(|g| g.best_score).collect()
    }

    /// Get the history of baseline scores
    pub fn baseline_history(&self) -> Vec<Option<f64>> {
        self.generations.iter().map(|g| g.baseline_score).collect()
    }

    /// Total failed measurements over the run
    pub fn total_failures(&self) -> usize {
        self.generations.iter().map(|g| g.failed).sum()
    }

    /// Set the termination reason
    pub fn set_termination_reason(&mut self, reason: &str) {
        self.termination_reason = Some(reason.to_string());
    }

    /// Set the total runtime
    pub fn set_runtime(&mut self, duration: Duration) {
        self.total_runtime_ms = duration.as_secs_f64() * 1000.0;
    }

    /// Get a summary of the search
    pub fn summary(&self) -> String {
        let best = self.best_score().unwrap_or(f64::NEG_INFINITY);
        let final_best = self.final_best_score().unwrap_or(f64::NEG_INFINITY);
        let evaluations = self.generations.last().map_or(0, |g| g.evaluations);

        format!(
            "Search Summary:\n\
             - Generations: {}\n\
             - Oracle invocations: {}\n\
             - Best score: {:.2}\n\
             - Final best: {:.2}\n\
             - Failed measurements: {}\n\
             - Runtime: {:.2}ms\n\
             - Termination: {}",
            self.num_generations(),
            evaluations,
            best,
            final_best,
            self.total_failures(),
            self.total_runtime_ms,
            self.termination_reason.as_deref().unwrap_or("unknown")
        )
    }
}

/// Result of a search run
#[derive(Clone, Debug)]
pub struct SearchOutcome {
    /// Best configuration in the final population
    pub best: Configuration,
    /// Final scored population, best first
    pub population: Population,
    /// Number of generations completed
    pub generations: usize,
    /// Total oracle invocations, baselines included
    pub evaluations: usize,
    /// Statistics for the run
    pub stats: SearchStats,
}

impl SearchOutcome {
    /// Best score found
    pub fn best_score(&self) -> f64 {
        self.best.cached_score().unwrap_or(f64::NEG_INFINITY)
    }
}

pub mod prelude {
    pub use super::report::{delta_percent, GenerationReport, ReportRow};
    pub use super::{GenerationStats, SearchOutcome, SearchStats, TimingStats};
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MeasurementError;
    use crate::genome::configuration::FAILED_SCORE;
    use crate::genome::parameters::{Parameter, ParameterSpace};
    use crate::oracle::Measurement;

    fn test_population() -> Population {
        let space = ParameterSpace::new(vec![Parameter::new("x", 0)])
            .unwrap()
            .shared();
        let oracle = |c: &Configuration| match c.genes()[0] {
            0 => Err(MeasurementError::Failed("crashed".to_string())),
            x => Ok(Measurement::new(x as f64 * 10.0, "ops")),
        };

        let mut pop = Population::new();
        for x in 1..=5 {
            pop.add(Configuration::from_genes(space.clone(), vec![x]).unwrap(), &oracle);
        }
        pop
    }

    fn stats(generation: usize, best: f64) -> GenerationStats {
        GenerationStats {
            generation,
            evaluations: (generation + 1) * 10,
            best_score: best,
            worst_score: 0.0,
            mean_score: best / 2.0,
            median_score: 0.0,
            failed: 1,
            baseline_score: Some(100.0),
            timing: TimingStats::default(),
        }
    }

    #[test]
    fn test_generation_stats_from_population() {
        let pop = test_population();
        let stats = GenerationStats::from_population(&pop, 10, 100, Some(25.0));

        assert_eq!(stats.generation, 10);
        assert_eq!(stats.evaluations, 100);
        assert_eq!(stats.best_score, 50.0);
        assert_eq!(stats.worst_score, 10.0);
        assert_eq!(stats.mean_score, 30.0);
        assert_eq!(stats.median_score, 30.0);
        assert_eq!(stats.failed, 0);
        assert_eq!(stats.baseline_score, Some(25.0));
    }

    #[test]
    fn test_generation_stats_counts_failures() {
        let mut pop = test_population();
        let space = pop[0].space().clone();
        let failing =
            |_: &Configuration| Err::<Measurement, _>(MeasurementError::Failed("crashed".into()));
        pop.add(Configuration::from_genes(space, vec![0]).unwrap(), &failing);

        let stats = GenerationStats::from_population(&pop, 0, 6, None);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.best_score, 50.0);
        assert_eq!(stats.worst_score, FAILED_SCORE);
    }

    #[test]
    fn test_generation_stats_best_is_measured_zero_over_failure() {
        let space = ParameterSpace::new(vec![Parameter::new("x", 0)])
            .unwrap()
            .shared();
        let oracle = |c: &Configuration| match c.genes()[0] {
            0 => Ok(Measurement::new(0.0, "ops")),
            _ => Err(MeasurementError::Failed("crashed".to_string())),
        };
        let mut pop = Population::new();
        pop.add(Configuration::from_genes(space.clone(), vec![1]).unwrap(), &oracle);
        pop.add(Configuration::from_genes(space, vec![0]).unwrap(), &oracle);

        let stats = GenerationStats::from_population(&pop, 0, 2, None);
        assert_eq!(stats.best_score, 0.0);
        assert_eq!(stats.worst_score, FAILED_SCORE);
    }

    #[test]
    fn test_generation_stats_empty_population() {
        let stats = GenerationStats::from_population(&Population::new(), 0, 0, None);

        assert_eq!(stats.best_score, f64::NEG_INFINITY);
        assert_eq!(stats.worst_score, f64::INFINITY);
    }

    #[test]
    fn test_search_stats_history() {
        let mut search = SearchStats::new();
        for i in 0..5 {
            search.record(stats(i, (i + 1) as f64 * 10.0));
        }

        assert_eq!(search.num_generations(), 5);
        assert_eq!(search.best_score(), Some(50.0));
        assert_eq!(search.best_score_history(), vec![10.0, 20.0, 30.0, 40.0, 50.0]);
        assert_eq!(search.baseline_history(), vec![Some(100.0); 5]);
        assert_eq!(search.total_failures(), 5);
    }

    #[test]
    fn test_search_stats_summary() {
        let mut search = SearchStats::new();
        search.record(stats(0, 50.0));
        search.set_termination_reason("Maximum generations reached");
        search.set_runtime(Duration::from_millis(1234));

        let summary = search.summary();
        assert!(summary.contains("Generations: 1"));
        assert!(summary.contains("Oracle invocations: 10"));
        assert!(summary.contains("Best score: 50.00"));
        assert!(summary.contains("Maximum generations reached"));
    }

    #[test]
    fn test_timing_stats() {
        let timing = TimingStats::new()
            .with_baseline(Duration::from_millis(40))
            .with_evaluation(Duration::from_millis(100))
            .with_breeding(Duration::from_millis(2))
            .with_total(Duration::from_millis(142));

        assert!((timing.baseline_ms - 40.0).abs() < 0.1);
        assert!((timing.evaluation_ms - 100.0).abs() < 0.1);
        assert!((timing.breeding_ms - 2.0).abs() < 0.1);
        assert!((timing.total_ms - 142.0).abs() < 0.1);
    }
}
