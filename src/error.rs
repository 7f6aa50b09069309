//! Error types for evotune
//!
//! This module defines all error types used throughout the library.

use thiserror::Error;

/// Error raised by a measurement oracle
///
/// A measurement error never aborts a search: the configuration that
/// triggered it is marked as failed and keeps the sentinel score.
#[derive(Debug, Error)]
pub enum MeasurementError {
    /// The measurement ran but reported failure
    #[error("Measurement failed: {0}")]
    Failed(String),

    /// The oracle produced a score outside the non-negative finite range
    #[error("Invalid score reported: {0}")]
    InvalidScore(f64),

    /// The oracle output could not be interpreted
    #[error("Unparseable measurement output: {0}")]
    Parse(String),

    /// The measurement process could not be run
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error type for operator failures
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OperatorError {
    /// Parents were built over different parameter spaces
    #[error("Parameter space mismatch: expected {expected} genes, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Parents have the same gene count but different parameters
    #[error("Parameter space mismatch: expected [{expected}], got [{actual}]")]
    SpaceMismatch { expected: String, actual: String },
}

/// Top-level error type for search operations
#[derive(Debug, Error)]
pub enum EvolutionError {
    /// Operator error
    #[error("Operator error: {0}")]
    Operator(#[from] OperatorError),

    /// The fitness-proportionate walk could not pick a parent
    #[error("Selection exhausted: total score {total} over {candidates} candidates")]
    SelectionExhausted { total: f64, candidates: usize },

    /// A member carries a score unusable for proportionate selection
    #[error("Invalid score {score} at position {index}")]
    InvalidScore { index: usize, score: f64 },

    /// A configuration reached a phase that requires a score without having one
    #[error("Configuration at position {0} has not been scored")]
    Unscored(usize),

    /// Empty population
    #[error("Empty population")]
    EmptyPopulation,

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Internal invariant broken
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// IO error while loading configuration
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for search operations
pub type EvoResult<T> = Result<T, EvolutionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measurement_error_display() {
        let err = MeasurementError::Failed("exit status 1".to_string());
        assert_eq!(err.to_string(), "Measurement failed: exit status 1");

        let err = MeasurementError::InvalidScore(-3.0);
        assert_eq!(err.to_string(), "Invalid score reported: -3");
    }

    #[test]
    fn test_operator_error_display() {
        let err = OperatorError::DimensionMismatch {
            expected: 6,
            actual: 4,
        };
        assert_eq!(
            err.to_string(),
            "Parameter space mismatch: expected 6 genes, got 4"
        );
    }

    #[test]
    fn test_space_mismatch_display() {
        let err = OperatorError::SpaceMismatch {
            expected: "MaxInlineSize".to_string(),
            actual: "InlineSmallCode".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Parameter space mismatch: expected [MaxInlineSize], got [InlineSmallCode]"
        );
    }

    #[test]
    fn test_evolution_error_from_operator_error() {
        let op_err = OperatorError::DimensionMismatch {
            expected: 2,
            actual: 3,
        };
        let evo_err: EvolutionError = op_err.into();
        assert!(matches!(evo_err, EvolutionError::Operator(_)));
    }

    #[test]
    fn test_selection_exhausted_display() {
        let err = EvolutionError::SelectionExhausted {
            total: 0.0,
            candidates: 10,
        };
        assert_eq!(
            err.to_string(),
            "Selection exhausted: total score 0 over 10 candidates"
        );
    }
}
