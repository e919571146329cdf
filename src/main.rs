//! LotLedger - batch reconciliation of parking lot sightings
//!
//! Reads a roster and a list of plate sightings from a JSON file, pairs
//! entries with exits per lot and prints the run report as JSON.

use anyhow::Context;
use serde::Deserialize;

use lotledger::{logging, run_batch, Config, Roster};

/// Batch input: roster rows and event rows as raw string cells
#[derive(Debug, Deserialize)]
struct Input {
    roster: Vec<Vec<String>>,
    events: Vec<Vec<String>>,
}

fn main() -> anyhow::Result<()> {
    // Load configuration from environment
    let config = Config::from_env()?;

    // Validate configuration
    config.validate()?;

    // Initialize logging/tracing
    logging::init_tracing(&config.runtime.log_level, &config.runtime.environment)?;

    config.log_config();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting LotLedger");

    let path = &config.reconcile.input_path;
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read input file {}", path))?;
    let input: Input =
        serde_json::from_str(&raw).with_context(|| format!("failed to parse input file {}", path))?;

    let options = config.reconcile_options();
    let roster = Roster::load_with_min_len(input.roster, options.min_plate_len)?;
    let ledger = config.build_ledger()?;

    let report = match run_batch(roster, ledger, input.events, options) {
        Ok(report) => report,
        Err(e) => {
            lotledger::log_error!(e, "Reconciliation failed");
            return Err(e.into());
        }
    };

    println!("{}", serde_json::to_string_pretty(&report)?);

    tracing::info!(run_id = %report.run_id, "LotLedger run complete");
    Ok(())
}
