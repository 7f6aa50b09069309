//! Population type
//!
//! This module provides the sorted Population container. Members are kept in
//! descending score order; every insertion forces the new member's score.

use std::cmp::Ordering;

use rand::Rng;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::{EvoResult, EvolutionError};
use crate::genome::configuration::Configuration;
use crate::operators::traits::SelectionOperator;
use crate::oracle::MeasurementOracle;

/// A population of scored configurations, best first
#[derive(Clone, Debug, Default)]
pub struct Population {
    /// Members in descending score order
    members: Vec<Configuration>,
}

impl Population {
    /// Create an empty population
    pub fn new() -> Self {
        Self {
            members: Vec::new(),
        }
    }

    /// Create a population with the given capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            members: Vec::with_capacity(capacity),
        }
    }

    /// Score every candidate and collect them into a sorted population
    ///
    /// Already-scored candidates keep their cached score. Returns the
    /// population and the number of oracle invocations made.
    pub fn evaluate<O>(
        mut candidates: Vec<Configuration>,
        oracle: &O,
        parallel: bool,
    ) -> (Self, usize)
    where
        O: MeasurementOracle + ?Sized,
    {
        let measured = candidates.iter().filter(|c| !c.is_scored()).count();
        score_all(&mut candidates, oracle, parallel);

        let mut population = Self::with_capacity(candidates.len());
        for candidate in candidates {
            population.add(candidate, oracle);
        }
        (population, measured)
    }

    /// Add a configuration, scoring it first if needed
    ///
    /// The descending-score order holds again when this returns. Equal
    /// scores keep insertion order.
    pub fn add<O>(&mut self, mut configuration: Configuration, oracle: &O)
    where
        O: MeasurementOracle + ?Sized,
    {
        configuration.score(oracle);
        self.insert_sorted(configuration);
    }

    fn insert_sorted(&mut self, configuration: Configuration) {
        let position = self
            .members
            .partition_point(|m| m.cmp_by_score(&configuration) != Ordering::Greater);
        self.members.insert(position, configuration);
        debug_assert!(self.is_sorted(), "population lost descending order");
    }

    /// Pick one breeding parent with the given selection policy
    pub fn select_to_breed<S, R>(&self, selection: &S, rng: &mut R) -> EvoResult<&Configuration>
    where
        S: SelectionOperator,
        R: Rng,
    {
        let index = selection.select(&self.members, rng)?;
        self.members.get(index).ok_or_else(|| {
            EvolutionError::InvariantViolation(format!(
                "selection returned index {} for {} members",
                index,
                self.members.len()
            ))
        })
    }

    /// Get the population size
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check if the population is empty
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// All members, best first
    pub fn all(&self) -> &[Configuration] {
        &self.members
    }

    /// Get a member by rank
    pub fn get(&self, index: usize) -> Option<&Configuration> {
        self.members.get(index)
    }

    /// Get an iterator over the members, best first
    pub fn iter(&self) -> impl Iterator<Item = &Configuration> {
        self.members.iter()
    }

    /// Take the members out of this population
    pub fn into_members(self) -> Vec<Configuration> {
        self.members
    }

    /// Best member
    pub fn best(&self) -> Option<&Configuration> {
        self.members.first()
    }

    /// Worst member
    pub fn worst(&self) -> Option<&Configuration> {
        self.members.last()
    }

    /// Copies of the top `count` members, cached scores included
    pub fn elites(&self, count: usize) -> Vec<Configuration> {
        self.members.iter().take(count).cloned().collect()
    }

    /// Check the descending-score invariant
    pub fn is_sorted(&self) -> bool {
        self.members
            .windows(2)
            .all(|w| w[0].cmp_by_score(&w[1]) != Ordering::Greater)
    }

    /// Compute mean score over scored members
    pub fn mean_score(&self) -> Option<f64> {
        let scores: Vec<f64> = self.members.iter().filter_map(|c| c.cached_score()).collect();
        if scores.is_empty() {
            None
        } else {
            Some(scores.iter().sum::<f64>() / scores.len() as f64)
        }
    }

    /// Sum of all member scores
    pub fn total_score(&self) -> f64 {
        self.members.iter().filter_map(|c| c.cached_score()).sum()
    }
}

/// Score unscored candidates (parallel when requested)
#[cfg(feature = "parallel")]
fn score_all<O>(candidates: &mut [Configuration], oracle: &O, parallel: bool)
where
    O: MeasurementOracle + ?Sized,
{
    if parallel {
        candidates
            .par_iter_mut()
            .filter(|c| !c.is_scored())
            .for_each(|c| {
                c.score(oracle);
            });
    } else {
        for c in candidates.iter_mut() {
            c.score(oracle);
        }
    }
}

/// Sequential fallback when the `parallel` feature is disabled
#[cfg(not(feature = "parallel"))]
fn score_all<O>(candidates: &mut [Configuration], oracle: &O, _parallel: bool)
where
    O: MeasurementOracle + ?Sized,
{
    for c in candidates.iter_mut() {
        c.score(oracle);
    }
}

impl std::ops::Index<usize> for Population {
    type Output = Configuration;

    fn index(&self, index: usize) -> &Self::Output {
        &self.members[index]
    }
}

impl IntoIterator for Population {
    type Item = Configuration;
    type IntoIter = std::vec::IntoIter<Configuration>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.into_iter()
    }
}
