//! Armory engine binary.
//!
//! Runs one generation batch against the starter catalog and prints the
//! result as JSON on stdout.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load generator configuration from `armory-config.yaml`
//! 3. Load the `engine` batch section from the same file
//! 4. Seed the RNG
//! 5. Generate agents, a reward pool and a sealed crate
//! 6. Print the batch as JSON

mod batch;
mod error;

use std::path::Path;

use armory_gen::GeneratorConfig;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::batch::BatchConfig;
use crate::error::EngineError;

/// Generator and batch configuration, relative to the working directory.
const CONFIG_PATH: &str = "armory-config.yaml";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Initialize structured logging. Logs go to stderr so stdout stays JSON.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!("armory-engine starting");

    // 2. Load generator configuration.
    let config = load_config()?;
    info!(
        pmc_roles = config.pmc_roles.len(),
        max_placement_failures = config.retry.max_placement_failures,
        "Configuration loaded"
    );

    // 3. Load batch settings.
    let batch = load_batch_config()?;
    info!(
        agents_per_role = batch.agents_per_role,
        seed = ?batch.seed,
        "Batch configuration loaded"
    );

    // 4. Seed the RNG.
    let mut rng = batch
        .seed
        .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);

    // 5. Generate.
    let output = batch::run_batch(&batch, &config, &mut rng)?;

    // 6. Print.
    let json = serde_json::to_string_pretty(&output).map_err(EngineError::from)?;
    println!("{json}");

    info!("armory-engine finished");
    Ok(())
}

/// Load the generator configuration from `armory-config.yaml`.
///
/// Looks for the config file relative to the current working directory.
fn load_config() -> Result<GeneratorConfig, EngineError> {
    let config_path = Path::new(CONFIG_PATH);
    if config_path.exists() {
        let config = GeneratorConfig::from_file(config_path)?;
        Ok(config)
    } else {
        info!("Config file not found, using defaults");
        Ok(GeneratorConfig::default())
    }
}

/// Load batch settings from the `engine` key of `armory-config.yaml`.
///
/// A missing file or key yields the defaults.
fn load_batch_config() -> Result<BatchConfig, EngineError> {
    let config_path = Path::new(CONFIG_PATH);
    if !config_path.exists() {
        return Ok(BatchConfig::default());
    }
    let contents = std::fs::read_to_string(config_path).map_err(|e| EngineError::Batch {
        message: format!("failed to read config file: {e}"),
    })?;

    let raw: serde_yml::Value = serde_yml::from_str(&contents).map_err(|e| EngineError::Batch {
        message: format!("failed to parse config YAML: {e}"),
    })?;

    match raw.get("engine") {
        Some(engine) => serde_yml::from_value(engine.clone()).map_err(|e| EngineError::Batch {
            message: format!("failed to parse engine config: {e}"),
        }),
        None => Ok(BatchConfig::default()),
    }
}
