//! Termination criteria
//!
//! The reference search runs for a fixed number of generations. Stagnation
//! detection is available as an optional early stop.

/// Search state for termination checking
#[derive(Clone, Debug)]
pub struct SearchState<'a> {
    /// Number of generations completed
    pub generation: usize,
    /// Total oracle invocations so far
    pub evaluations: usize,
    /// Best score in the current population
    pub best_score: f64,
    /// History of best scores per completed generation
    pub score_history: &'a [f64],
}

/// Termination criterion trait
pub trait TerminationCriterion: Send + Sync {
    /// Check if the search should stop
    fn should_terminate(&self, state: &SearchState) -> bool;

    /// Get a description of why termination occurred
    fn reason(&self) -> &'static str;

    /// Reason for stopping at this particular state
    fn reason_for(&self, _state: &SearchState) -> &'static str {
        self.reason()
    }
}

/// Terminate after a fixed number of generations
#[derive(Clone, Debug)]
pub struct MaxGenerations(pub usize);

impl MaxGenerations {
    /// Create a new max generations criterion
    pub fn new(max: usize) -> Self {
        Self(max)
    }
}

impl TerminationCriterion for MaxGenerations {
    fn should_terminate(&self, state: &SearchState) -> bool {
        state.generation >= self.0
    }

    fn reason(&self) -> &'static str {
        "Maximum generations reached"
    }
}

/// Terminate when the best score stops moving
///
/// Measurements are noisy, so `epsilon` should be set above the oracle's
/// run-to-run spread.
#[derive(Clone, Debug)]
pub struct FitnessStagnation {
    /// Number of generations to look back
    pub window: usize,
    /// Minimum improvement threshold
    pub epsilon: f64,
}

impl FitnessStagnation {
    /// Create a new fitness stagnation criterion
    pub fn new(window: usize, epsilon: f64) -> Self {
        Self { window, epsilon }
    }
}

impl TerminationCriterion for FitnessStagnation {
    fn should_terminate(&self, state: &SearchState) -> bool {
        if self.window == 0 || state.score_history.len() < self.window {
            return false;
        }

        let window = &state.score_history[state.score_history.len() - self.window..];
        let first = window[0];
        let last = window[window.len() - 1];

        (last - first).abs() < self.epsilon
    }

    fn reason(&self) -> &'static str {
        "Fitness stagnation detected"
    }
}

/// Combine criteria with OR logic (any one triggers termination)
pub struct AnyOf {
    criteria: Vec<Box<dyn TerminationCriterion>>,
}

impl AnyOf {
    /// Create a new AnyOf combinator
    pub fn new(criteria: Vec<Box<dyn TerminationCriterion>>) -> Self {
        Self { criteria }
    }
}

impl TerminationCriterion for AnyOf {
    fn should_terminate(&self, state: &SearchState) -> bool {
        self.criteria.iter().any(|c| c.should_terminate(state))
    }

    fn reason(&self) -> &'static str {
        "One of multiple criteria met"
    }

    fn reason_for(&self, state: &SearchState) -> &'static str {
        self.criteria
            .iter()
            .find(|c| c.should_terminate(state))
            .map_or_else(|| self.reason(), |c| c.reason_for(state))
    }
}

pub mod prelude {
    pub use super::{AnyOf, FitnessStagnation, MaxGenerations, SearchState, TerminationCriterion};
}
