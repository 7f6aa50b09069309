//! End-to-end scenarios for the generation controller
//!
//! Fake oracles count their invocations so the at-most-once measurement
//! contract can be checked across whole generations.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use evotune::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn space() -> Arc<ParameterSpace> {
    ParameterSpace::new(vec![
        Parameter::new("FreqInlineSize", 325),
        Parameter::new("MaxInlineLevel", 9),
        Parameter::new("MaxInlineSize", 35),
    ])
    .unwrap()
    .shared()
}

fn sum_of_genes(c: &Configuration) -> f64 {
    c.genes().iter().map(|&g| g as f64).sum()
}

/// Oracle returning the sum of genes and counting its invocations
struct CountingOracle {
    calls: AtomicUsize,
}

impl CountingOracle {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl MeasurementOracle for CountingOracle {
    fn measure(&self, configuration: &Configuration) -> Result<Measurement, MeasurementError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Measurement::new(sum_of_genes(configuration).max(0.0), "ops/ms"))
    }
}

#[test]
fn one_generation_with_single_elite() {
    let mut rng = StdRng::seed_from_u64(42);
    let oracle = CountingOracle::new();
    let controller = GenerationController::reference(
        space(),
        ControllerConfig {
            population_size: 4,
            elite_count: 1,
            max_generations: 1,
            ..Default::default()
        },
    )
    .unwrap();

    let candidates = controller.initial_candidates(&mut rng);
    assert_eq!(candidates.len(), 4);
    assert!(candidates.iter().all(|c| c.genes() == [325, 9, 35]));

    let outcome = controller.evaluate_generation(0, candidates, &oracle, 0).unwrap();
    // one baseline plus four identical but distinct candidates
    assert_eq!(oracle.calls(), 5);
    assert!(outcome.population.iter().all(|c| c.cached_score() == Some(369.0)));

    let next = controller.breed(&outcome.population, 1, &mut rng).unwrap();
    assert_eq!(next.len(), 4);
    assert_eq!(oracle.calls(), 5);

    let survivors: Vec<&Configuration> = next.iter().filter(|c| c.is_scored()).collect();
    assert_eq!(survivors.len(), 1);
    assert_eq!(survivors[0].genes(), &[325, 9, 35]);
    assert_eq!(survivors[0].cached_score(), Some(369.0));

    let children: Vec<&Configuration> = next.iter().filter(|c| !c.is_scored()).collect();
    assert_eq!(children.len(), 3);
    assert!(children.iter().all(|c| c.birth_generation() == 1));

    // the next generation forces the three children and re-measures only the baseline
    let outcome = controller.evaluate_generation(1, next, &oracle, 5).unwrap();
    assert_eq!(oracle.calls(), 9);
    assert_eq!(outcome.stats.evaluations, 9);
    assert_eq!(outcome.population.len(), 4);
    assert!(outcome.population.iter().all(|c| c.is_scored()));
}

#[test]
fn elites_survive_unchanged() {
    let mut rng = StdRng::seed_from_u64(7);
    let controller = GenerationController::reference(
        space(),
        ControllerConfig {
            population_size: 8,
            elite_count: 2,
            mutation_probability: 1.0,
            initial_population: InitialPopulation::Mutated,
            ..Default::default()
        },
    )
    .unwrap();
    let oracle = CountingOracle::new();

    let mut candidates = controller.initial_candidates(&mut rng);
    let mut evaluations = 0;
    for generation in 0..5 {
        let outcome = controller
            .evaluate_generation(generation, candidates, &oracle, evaluations)
            .unwrap();
        evaluations = outcome.stats.evaluations;

        let top: Vec<(Vec<i64>, Option<f64>)> = outcome
            .population
            .iter()
            .take(2)
            .map(|c| (c.genes().to_vec(), c.cached_score()))
            .collect();

        candidates = controller
            .breed(&outcome.population, generation + 1, &mut rng)
            .unwrap();

        for (genes, score) in &top {
            assert!(
                candidates
                    .iter()
                    .any(|c| c.genes() == genes.as_slice() && c.cached_score() == *score),
                "elite {:?} lost in generation {}",
                genes,
                generation + 1
            );
        }
    }
}

#[test]
fn oracle_called_once_per_new_configuration() {
    let mut rng = StdRng::seed_from_u64(11);
    let oracle = CountingOracle::new();
    let controller = GenerationController::reference(
        space(),
        ControllerConfig {
            population_size: 10,
            elite_count: 2,
            max_generations: 6,
            ..Default::default()
        },
    )
    .unwrap();

    let outcome = controller.run(&oracle, &mut rng).unwrap();

    // generation 0 measures 10 candidates, later ones only the 8 children;
    // every generation measures the baseline once
    let expected = 6 + 10 + 5 * 8;
    assert_eq!(oracle.calls(), expected);
    assert_eq!(outcome.evaluations, expected);
}

#[test]
fn always_failing_oracle_still_selects() {
    let mut rng = StdRng::seed_from_u64(3);
    let failing = |_: &Configuration| {
        Err::<Measurement, _>(MeasurementError::Failed("VM refused flags".to_string()))
    };
    let controller = GenerationController::reference(
        space(),
        ControllerConfig {
            population_size: 6,
            elite_count: 2,
            max_generations: 3,
            ..Default::default()
        },
    )
    .unwrap();

    let candidates = controller.initial_candidates(&mut rng);
    let outcome = controller.evaluate_generation(0, candidates, &failing, 0).unwrap();
    assert!(outcome
        .population
        .iter()
        .all(|c| c.cached_score() == Some(FAILED_SCORE)));
    assert!(outcome.report.baseline.is_none());
    assert!(outcome.report.rows.iter().all(|r| r.failure.is_some()));

    let next = controller.breed(&outcome.population, 1, &mut rng).unwrap();
    assert_eq!(next.len(), 6);

    let result = controller.run(&failing, &mut rng).unwrap();
    assert_eq!(result.generations, 3);
    assert_eq!(result.stats.total_failures(), 18);
}

#[test]
fn zero_scores_abort_selection() {
    let mut rng = StdRng::seed_from_u64(3);
    let zero = |_: &Configuration| Ok::<_, MeasurementError>(Measurement::new(0.0, "ops/ms"));
    let controller = GenerationController::reference(
        space(),
        ControllerConfig {
            population_size: 4,
            elite_count: 1,
            max_generations: 3,
            ..Default::default()
        },
    )
    .unwrap();

    let result = controller.run(&zero, &mut rng);
    assert!(matches!(
        result,
        Err(EvolutionError::SelectionExhausted { .. })
    ));
}

#[test]
fn parallel_and_sequential_scoring_agree() {
    let sequential = GenerationController::reference(
        space(),
        ControllerConfig {
            population_size: 12,
            max_generations: 4,
            parallel_evaluation: false,
            ..Default::default()
        },
    )
    .unwrap();
    let parallel = GenerationController::reference(
        space(),
        ControllerConfig {
            population_size: 12,
            max_generations: 4,
            parallel_evaluation: true,
            ..Default::default()
        },
    )
    .unwrap();

    let a = sequential
        .run(&CountingOracle::new(), &mut StdRng::seed_from_u64(99))
        .unwrap();
    let b = parallel
        .run(&CountingOracle::new(), &mut StdRng::seed_from_u64(99))
        .unwrap();

    let genes = |o: &SearchOutcome| -> Vec<Vec<i64>> {
        o.population.iter().map(|c| c.genes().to_vec()).collect()
    };
    assert_eq!(genes(&a), genes(&b));
    assert_eq!(a.evaluations, b.evaluations);
}

#[test]
fn report_deltas_against_fresh_baseline() {
    let mut rng = StdRng::seed_from_u64(5);
    let controller = GenerationController::reference(
        space(),
        ControllerConfig {
            population_size: 5,
            elite_count: 1,
            max_generations: 3,
            initial_population: InitialPopulation::Mutated,
            mutation_probability: 1.0,
            ..Default::default()
        },
    )
    .unwrap();
    let oracle = CountingOracle::new();

    let mut reports = Vec::new();
    controller
        .run_with_observer(&oracle, &mut rng, |r| reports.push(r.clone()))
        .unwrap();

    assert_eq!(reports.len(), 3);
    for report in &reports {
        let baseline = report.baseline.as_ref().unwrap();
        assert_eq!(baseline.score, 369.0);
        assert_eq!(baseline.unit, "ops/ms");
        for row in &report.rows {
            let expected = (row.score / 369.0 - 1.0) * 100.0;
            assert!((row.delta_percent.unwrap() - expected).abs() < 1e-9);
        }
        let text = report.to_string();
        assert!(text.contains("Baseline score:     369.00 ops/ms"));
    }
}
