//! Command-line oracle
//!
//! Runs an external benchmark program once per measurement. The program
//! receives the fixed base arguments followed by one argument per gene,
//! rendered through a template such as `-XX:{name}={value}`. The last
//! non-empty line of its standard output must read `<score> [unit]`.

use std::process::Command;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::MeasurementError;
use crate::genome::configuration::Configuration;
use crate::oracle::{Measurement, MeasurementOracle};

/// Default rendering template for a gene
pub const DEFAULT_ARGUMENT_FORMAT: &str = "-XX:{name}={value}";

/// Unit reported when the program prints a bare number
pub const DEFAULT_UNIT: &str = "score";

/// Settings for [`CommandOracle`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CommandOracleConfig {
    /// Program to execute
    pub program: String,
    /// Base arguments passed before the gene arguments
    #[serde(default)]
    pub args: Vec<String>,
    /// Template with `{name}` and `{value}` placeholders
    #[serde(default = "default_argument_format")]
    pub argument_format: String,
}

fn default_argument_format() -> String {
    DEFAULT_ARGUMENT_FORMAT.to_string()
}

/// Oracle backed by an external process
#[derive(Clone, Debug)]
pub struct CommandOracle {
    config: CommandOracleConfig,
}

impl CommandOracle {
    /// Create a new command oracle
    pub fn new(config: CommandOracleConfig) -> Self {
        Self { config }
    }

    /// Render every gene of a configuration as a program argument
    pub fn gene_arguments(&self, configuration: &Configuration) -> Vec<String> {
        configuration
            .named_genes()
            .map(|(name, value)| {
                self.config
                    .argument_format
                    .replace("{name}", name)
                    .replace("{value}", &value.to_string())
            })
            .collect()
    }
}

impl MeasurementOracle for CommandOracle {
    fn measure(&self, configuration: &Configuration) -> Result<Measurement, MeasurementError> {
        let gene_args = self.gene_arguments(configuration);
        debug!(
            "Running {} {} {}",
            self.config.program,
            self.config.args.join(" "),
            gene_args.join(" ")
        );

        let output = Command::new(&self.config.program)
            .args(&self.config.args)
            .args(&gene_args)
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MeasurementError::Failed(format!(
                "{} exited with {}: {}",
                self.config.program,
                output.status,
                stderr.trim()
            )));
        }

        parse_measurement(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Parse the last non-empty line of program output as `<score> [unit]`
pub fn parse_measurement(output: &str) -> Result<Measurement, MeasurementError> {
    let line = output
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .last()
        .ok_or_else(|| MeasurementError::Parse("no output".to_string()))?;

    let mut tokens = line.split_whitespace();
    let score_token = tokens
        .next()
        .ok_or_else(|| MeasurementError::Parse(line.to_string()))?;
    let score: f64 = score_token
        .parse()
        .map_err(|_| MeasurementError::Parse(format!("not a number: {}", score_token)))?;
    let unit = tokens.next().unwrap_or(DEFAULT_UNIT);

    let measurement = Measurement::new(score, unit);
    if measurement.is_valid() {
        Ok(measurement)
    } else {
        Err(MeasurementError::InvalidScore(score))
    }
}
