//! Parameter space
//!
//! The ordered set of named integer parameters a search tunes. Every
//! configuration built over a space has exactly one gene per parameter, in
//! the space's order.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{EvoResult, EvolutionError};
use crate::genome::bounds::GeneBounds;

/// A single tunable parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name, used when rendering a configuration
    pub name: String,
    /// Value used by the baseline and by default-initialised configurations
    pub default: i64,
    /// Domain policy applied after crossover and mutation
    #[serde(default, skip_serializing_if = "GeneBounds::is_unbounded")]
    pub bounds: GeneBounds,
}

impl Parameter {
    /// Create an unbounded parameter
    pub fn new(name: impl Into<String>, default: i64) -> Self {
        Self {
            name: name.into(),
            default,
            bounds: GeneBounds::unbounded(),
        }
    }

    /// Attach bounds to this parameter
    pub fn with_bounds(mut self, bounds: GeneBounds) -> Self {
        self.bounds = bounds;
        self
    }
}

/// Ordered, validated list of parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Parameter>", into = "Vec<Parameter>")]
pub struct ParameterSpace {
    parameters: Vec<Parameter>,
}

impl ParameterSpace {
    /// Create a parameter space
    ///
    /// Rejects empty spaces, duplicate names, inverted bounds and defaults
    /// outside their own bounds.
    pub fn new(parameters: Vec<Parameter>) -> EvoResult<Self> {
        if parameters.is_empty() {
            return Err(EvolutionError::Configuration(
                "Parameter space must contain at least one parameter".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for p in &parameters {
            if p.name.trim().is_empty() {
                return Err(EvolutionError::Configuration(
                    "Parameter names must not be empty".to_string(),
                ));
            }
            if !seen.insert(p.name.as_str()) {
                return Err(EvolutionError::Configuration(format!(
                    "Duplicate parameter name: {}",
                    p.name
                )));
            }
            if !p.bounds.is_valid() {
                return Err(EvolutionError::Configuration(format!(
                    "Invalid bounds for {}: min must be <= max",
                    p.name
                )));
            }
            if !p.bounds.contains(p.default) {
                return Err(EvolutionError::Configuration(format!(
                    "Default {} of {} lies outside its bounds",
                    p.default, p.name
                )));
            }
        }

        Ok(Self { parameters })
    }

    /// HotSpot inlining flags with their stock JVM defaults
    pub fn hotspot_inlining() -> Self {
        Self {
            parameters: vec![
                Parameter::new("FreqInlineSize", 325),
                Parameter::new("InlineSmallCode", 1000),
                Parameter::new("MaxInlineLevel", 9),
                Parameter::new("MaxInlineSize", 35),
                Parameter::new("MaxRecursiveInlineLevel", 1),
                Parameter::new("MinInliningThreshold", 250),
            ],
        }
    }

    /// Wrap in an `Arc` for sharing between configurations
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Number of parameters (genes per configuration)
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    /// Always false for a validated space
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Get a parameter by index
    pub fn get(&self, index: usize) -> Option<&Parameter> {
        self.parameters.get(index)
    }

    /// Iterate the parameters in order
    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter()
    }

    /// Position of a parameter by name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.parameters.iter().position(|p| p.name == name)
    }

    /// Parameter names, in order
    pub fn names(&self) -> Vec<&str> {
        self.parameters.iter().map(|p| p.name.as_str()).collect()
    }

    /// Default value of every parameter, in order
    pub fn defaults(&self) -> Vec<i64> {
        self.parameters.iter().map(|p| p.default).collect()
    }

    /// Clamp the gene at `index` into its parameter's bounds
    pub fn clamp(&self, index: usize, value: i64) -> i64 {
        self.parameters
            .get(index)
            .map_or(value, |p| p.bounds.clamp(value))
    }
}

impl TryFrom<Vec<Parameter>> for ParameterSpace {
    type Error = EvolutionError;

    fn try_from(parameters: Vec<Parameter>) -> Result<Self, Self::Error> {
        Self::new(parameters)
    }
}

impl From<ParameterSpace> for Vec<Parameter> {
    fn from(space: ParameterSpace) -> Self {
        space.parameters
    }
}
