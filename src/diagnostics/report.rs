//! Per-generation diagnostic report
//!
//! One table per generation: the freshly measured baseline, then every
//! population member with its score, its percentage delta against the
//! baseline, and its genes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::genome::configuration::{Configuration, Fitness};
use crate::oracle::Measurement;
use crate::population::population::Population;

/// Percentage change of `candidate` relative to `baseline`
///
/// None when the baseline score is zero.
pub fn delta_percent(candidate: f64, baseline: f64) -> Option<f64> {
    if baseline == 0.0 {
        None
    } else {
        Some((candidate / baseline - 1.0) * 100.0)
    }
}

/// One population member in a report
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    /// Score (sentinel value for failed measurements)
    pub score: f64,
    /// Unit of the score
    pub unit: String,
    /// Change against the baseline in percent
    ///
    /// None for failed measurements, whose sentinel score is not compared
    /// against the baseline. Also None when the baseline is missing or zero.
    pub delta_percent: Option<f64>,
    /// Rendered gene vector
    pub genes: String,
    /// Failure reason if the measurement failed
    pub failure: Option<String>,
}

impl ReportRow {
    fn from_configuration(configuration: &Configuration, baseline: Option<&Measurement>) -> Self {
        let score = configuration.cached_score().unwrap_or(f64::NAN);
        let failure = match configuration.fitness() {
            Fitness::Failed { reason } => Some(reason.clone()),
            _ => None,
        };
        let unit = baseline
            .map(|b| b.unit.clone())
            .or_else(|| configuration.fitness().measurement().map(|m| m.unit.clone()))
            .unwrap_or_default();
        let delta_percent = match (&failure, baseline) {
            (None, Some(b)) => delta_percent(score, b.score),
            _ => None,
        };

        Self {
            score,
            unit,
            delta_percent,
            genes: configuration.to_string(),
            failure,
        }
    }
}

/// Diagnostic table for one generation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationReport {
    /// Generation number, starting at 0
    pub generation: usize,
    /// Baseline measurement, None if it failed
    pub baseline: Option<Measurement>,
    /// Members, best first
    pub rows: Vec<ReportRow>,
}

impl GenerationReport {
    /// Build a report for a scored population
    pub fn new(generation: usize, baseline: Option<Measurement>, population: &Population) -> Self {
        let rows = population
            .iter()
            .map(|c| ReportRow::from_configuration(c, baseline.as_ref()))
            .collect();
        Self {
            generation,
            baseline,
            rows,
        }
    }

    /// Delta of the best member against the baseline
    pub fn best_delta_percent(&self) -> Option<f64> {
        self.rows.first().and_then(|r| r.delta_percent)
    }
}

impl fmt::Display for GenerationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Generation {}", self.generation)?;
        writeln!(f, "---------------------------------------")?;
        match &self.baseline {
            Some(b) => writeln!(f, "Baseline score: {:10.2} {}", b.score, b.unit)?,
            None => writeln!(f, "Baseline score: {:>10}", "unavailable")?,
        }

        for row in &self.rows {
            match (&row.failure, row.delta_percent) {
                (Some(reason), _) => {
                    writeln!(f, "{:>10} {} ({:>11}) {}", "failed", row.unit, "-", row.genes)?;
                    writeln!(f, "{:>10} {}", "", reason)?;
                }
                (None, Some(delta)) => writeln!(
                    f,
                    "{:10.2} {} ({:+10.2}%) {}",
                    row.score, row.unit, delta, row.genes
                )?,
                (None, None) => writeln!(
                    f,
                    "{:10.2} {} ({:>11}) {}",
                    row.score, row.unit, "n/a", row.genes
                )?,
            }
        }
        Ok(())
    }
}
