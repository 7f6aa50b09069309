//! Selection operators
//!
//! Fitness-proportionate ("roulette wheel") selection over a scored pool.

use rand::Rng;

use crate::error::{EvoResult, EvolutionError};
use crate::genome::configuration::Configuration;
use crate::operators::traits::SelectionOperator;

/// Roulette wheel selection (fitness proportionate)
///
/// Draws a threshold uniformly in `[0, total)` and walks the pool
/// accumulating scores until the running sum exceeds it. Selection
/// probability is therefore proportional to score.
///
/// There is no offset or fallback: a non-positive or non-finite total, or a
/// negative member score, is reported as an error instead of being patched
/// into an arbitrary pick.
#[derive(Clone, Debug, Default)]
pub struct RouletteSelection;

impl RouletteSelection {
    /// Create a new roulette selection
    pub fn new() -> Self {
        Self
    }
}

impl SelectionOperator for RouletteSelection {
    fn select<R: Rng>(&self, pool: &[Configuration], rng: &mut R) -> EvoResult<usize> {
        if pool.is_empty() {
            return Err(EvolutionError::EmptyPopulation);
        }

        let mut scores = Vec::with_capacity(pool.len());
        for (index, member) in pool.iter().enumerate() {
            let score = member
                .cached_score()
                .ok_or(EvolutionError::Unscored(index))?;
            if !score.is_finite() || score < 0.0 {
                return Err(EvolutionError::InvalidScore { index, score });
            }
            scores.push(score);
        }

        let total: f64 = scores.iter().sum();
        if !total.is_finite() || total <= 0.0 {
            return Err(EvolutionError::SelectionExhausted {
                total,
                candidates: pool.len(),
            });
        }

        let threshold = rng.gen_range(0.0..total);
        let mut running = 0.0;
        for (index, score) in scores.iter().enumerate() {
            running += score;
            if running > threshold {
                return Ok(index);
            }
        }

        Err(EvolutionError::SelectionExhausted {
            total,
            candidates: pool.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::error::MeasurementError;
    use crate::genome::configuration::{Fitness, FAILED_SCORE};
    use crate::genome::parameters::ParameterSpace;
    use crate::oracle::Measurement;

    fn pool(scores: &[f64]) -> Vec<Configuration> {
        let space = ParameterSpace::hotspot_inlining().shared();
        scores
            .iter()
            .map(|&s| {
                Configuration::from_defaults(space.clone())
                    .with_fitness(Fitness::Measured(Measurement::new(s, "ops/ms")))
            })
            .collect()
    }

    #[test]
    fn test_roulette_selects_only_positive_member() {
        let mut rng = StdRng::seed_from_u64(42);
        let pool = pool(&[0.0, 0.0, 5.0, 0.0]);

        for _ in 0..100 {
            assert_eq!(RouletteSelection::new().select(&pool, &mut rng).unwrap(), 2);
        }
    }

    #[test]
    fn test_roulette_is_proportional() {
        let mut rng = StdRng::seed_from_u64(42);
        let pool = pool(&[75.0, 25.0]);
        let selection = RouletteSelection::new();

        let trials = 10_000;
        let mut first = 0;
        for _ in 0..trials {
            if selection.select(&pool, &mut rng).unwrap() == 0 {
                first += 1;
            }
        }

        let ratio = first as f64 / trials as f64;
        assert!((ratio - 0.75).abs() < 0.03, "ratio was {}", ratio);
    }

    #[test]
    fn test_roulette_reaches_every_member() {
        let mut rng = StdRng::seed_from_u64(3);
        let pool = pool(&[1.0, 1.0, 1.0, 1.0]);
        let mut seen = [false; 4];

        for _ in 0..200 {
            seen[RouletteSelection::new().select(&pool, &mut rng).unwrap()] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_roulette_zero_total_fails() {
        let mut rng = StdRng::seed_from_u64(42);
        let result = RouletteSelection::new().select(&pool(&[0.0, 0.0]), &mut rng);
        assert!(matches!(
            result,
            Err(EvolutionError::SelectionExhausted { candidates: 2, .. })
        ));
    }

    #[test]
    fn test_roulette_rejects_negative_score() {
        let mut rng = StdRng::seed_from_u64(42);
        let result = RouletteSelection::new().select(&pool(&[3.0, -1.0]), &mut rng);
        assert!(matches!(
            result,
            Err(EvolutionError::InvalidScore { index: 1, .. })
        ));
    }

    #[test]
    fn test_roulette_rejects_unscored() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut members = pool(&[3.0]);
        members.push(Configuration::from_defaults(
            ParameterSpace::hotspot_inlining().shared(),
        ));

        let result = RouletteSelection::new().select(&members, &mut rng);
        assert!(matches!(result, Err(EvolutionError::Unscored(1))));
    }

    #[test]
    fn test_roulette_all_failed_still_selects() {
        let mut rng = StdRng::seed_from_u64(42);
        let space = ParameterSpace::hotspot_inlining().shared();
        let failing = |_: &Configuration| -> Result<Measurement, MeasurementError> {
            Err(MeasurementError::Failed("unsupported flag".to_string()))
        };
        let members: Vec<Configuration> = (0..5)
            .map(|_| {
                let mut c = Configuration::from_defaults(space.clone());
                assert_eq!(c.score(&failing), FAILED_SCORE);
                c
            })
            .collect();

        for _ in 0..100 {
            let idx = RouletteSelection::new().select(&members, &mut rng).unwrap();
            assert!(idx < members.len());
        }
    }

    #[test]
    fn test_roulette_empty_pool() {
        let mut rng = StdRng::seed_from_u64(42);
        let result = RouletteSelection::new().select(&[], &mut rng);
        assert!(matches!(result, Err(EvolutionError::EmptyPopulation)));
    }
}
