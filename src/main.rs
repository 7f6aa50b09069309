//! evotune CLI - tune benchmark parameters from a JSON configuration.

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use evotune::config::TunerConfig;
use evotune::diagnostics::SearchOutcome;
use evotune::error::EvoResult;
use evotune::oracle::command::CommandOracle;

#[derive(Parser, Debug)]
#[command(name = "evotune")]
#[command(about = "Evolutionary search over integer configuration parameters, scored by a benchmark command")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a tuning search
    Run {
        /// Path to the JSON run configuration
        config: PathBuf,
        /// Random seed (overrides the configuration file)
        #[arg(long)]
        seed: Option<u64>,
        /// Number of generations (overrides the configuration file)
        #[arg(long)]
        generations: Option<usize>,
        /// Score candidates of a generation in parallel
        #[arg(long)]
        parallel: bool,
        /// Write per-generation statistics as JSON
        #[arg(long)]
        stats: Option<PathBuf>,
    },
    /// Print an example configuration tuning the HotSpot inlining flags
    ExampleConfig,
}

/// Apply command-line overrides on top of the configuration file
fn apply_overrides(config: &mut TunerConfig, generations: Option<usize>, parallel: bool) {
    if let Some(g) = generations {
        config.search.max_generations = g;
    }
    if parallel {
        #[cfg(not(feature = "parallel"))]
        log::warn!("Built without the `parallel` feature; candidates are scored sequentially");
        config.search.parallel_evaluation = true;
    }
}

fn run(
    config_path: &Path,
    seed: Option<u64>,
    generations: Option<usize>,
    parallel: bool,
) -> EvoResult<SearchOutcome> {
    let mut config = TunerConfig::load(config_path)?;
    apply_overrides(&mut config, generations, parallel);
    let controller = config.controller()?;

    let seed = seed
        .or(config.seed)
        .unwrap_or_else(|| rand::thread_rng().gen());
    log::info!(
        "Tuning {} parameters with population {}, {} elites, {} generations (seed {})",
        config.parameters.len(),
        config.search.population_size,
        config.search.elite_count,
        config.search.max_generations,
        seed
    );

    let mut rng = StdRng::seed_from_u64(seed);
    let oracle = CommandOracle::new(config.oracle.clone());
    controller.run_with_observer(&oracle, &mut rng, |report| println!("{}", report))
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::ExampleConfig => match serde_json::to_string_pretty(&TunerConfig::example()) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                log::error!("Failed to render example configuration: {}", e);
                process::exit(1);
            }
        },
        Commands::Run {
            config,
            seed,
            generations,
            parallel,
            stats,
        } => {
            let outcome = match run(&config, seed, generations, parallel) {
                Ok(outcome) => outcome,
                Err(e) => {
                    log::error!("Search failed: {}", e);
                    process::exit(1);
                }
            };

            println!("{}", outcome.stats.summary());
            println!("Best configuration: {}", outcome.best);
            println!("Best score: {:.2}", outcome.best_score());

            if let Some(path) = stats {
                let written = serde_json::to_string_pretty(&outcome.stats)
                    .map_err(|e| e.to_string())
                    .and_then(|json| fs::write(&path, json).map_err(|e| e.to_string()));
                match written {
                    Ok(()) => log::info!("Statistics written to {}", path.display()),
                    Err(e) => {
                        log::error!("Failed to write statistics to {}: {}", path.display(), e);
                        process::exit(1);
                    }
                }
            }
        }
    }
}
