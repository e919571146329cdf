//! Configuration module for LotLedger
//!
//! This module handles loading and validating configuration from environment
//! variables, providing strongly-typed configuration for the runtime, the
//! lot layout and the reconciliation run.

use envconfig::Envconfig;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ledger::CapacityLedger;
use crate::models::LotId;
use crate::reconcile::ReconcileOptions;

/// Main configuration structure for LotLedger
#[derive(Debug, Clone, Deserialize, Serialize, Envconfig)]
pub struct Config {
    /// Runtime configuration
    #[serde(flatten)]
    #[envconfig(nested = true)]
    pub runtime: RuntimeConfig,

    /// Lot layout
    #[serde(flatten)]
    #[envconfig(nested = true)]
    pub lots: LotConfig,

    /// Reconciliation configuration
    #[serde(flatten)]
    #[envconfig(nested = true)]
    pub reconcile: ReconcileConfig,
}

/// Runtime configuration
#[derive(Debug, Clone, Deserialize, Serialize, Envconfig)]
pub struct RuntimeConfig {
    /// Log level
    #[envconfig(from = "LOG_LEVEL", default = "info")]
    pub log_level: String,

    /// Environment (development, staging, production)
    #[envconfig(from = "ENVIRONMENT", default = "development")]
    pub environment: String,
}

/// Lot layout configuration
#[derive(Debug, Clone, Deserialize, Serialize, Envconfig)]
pub struct LotConfig {
    /// Lots and capacities as `id:capacity` pairs, comma-separated
    #[envconfig(from = "PARKING_LOTS", default = "A:50,B:50,C:50,D:50,Visitor:50")]
    pub parking_lots: String,
}

impl LotConfig {
    /// Parse the lot list into `(lot, capacity)` pairs
    pub fn lots(&self) -> Result<Vec<(LotId, u32)>> {
        self.parking_lots
            .split(',')
            .map(str::trim)
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (lot, capacity) = pair.split_once(':').ok_or_else(|| {
                    Error::config(format!("Lot entry '{}' must be id:capacity", pair))
                })?;
                let lot = lot.trim();
                if lot.is_empty() {
                    return Err(Error::config(format!("Lot entry '{}' has no id", pair)));
                }
                let capacity = capacity.trim().parse::<u32>().map_err(|e| {
                    Error::config(format!("Lot '{}' has invalid capacity: {}", lot, e))
                })?;
                Ok((lot.to_string(), capacity))
            })
            .collect()
    }
}

/// Reconciliation configuration
#[derive(Debug, Clone, Deserialize, Serialize, Envconfig)]
pub struct ReconcileConfig {
    /// Minimum cleaned plate length
    #[envconfig(from = "MIN_PLATE_LENGTH", default = "5")]
    pub min_plate_length: usize,

    /// Report sessions still open at the end of a run
    #[envconfig(from = "INCLUDE_INCOMPLETE", default = "true")]
    pub include_incomplete: bool,

    /// Input file for the batch binary
    #[envconfig(from = "LOTLEDGER_INPUT", default = "./data/parking.json")]
    pub input_path: String,
}

impl ReconcileConfig {
    /// Run options derived from this configuration
    pub fn options(&self) -> ReconcileOptions {
        ReconcileOptions {
            min_plate_len: self.min_plate_length,
            emit_incomplete: self.include_incomplete,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists (for local development)
        dotenv::dotenv().ok();

        Config::init_from_env().map_err(Error::from)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let lots = self.lots.lots()?;
        if lots.is_empty() {
            return Err(Error::config("At least one parking lot must be configured"));
        }

        if let Some((lot, _)) = lots.iter().find(|(_, capacity)| *capacity == 0) {
            return Err(Error::config(format!("Lot '{}' must have a capacity of at least 1", lot)));
        }

        // Duplicate lot ids
        CapacityLedger::new(lots)?;

        if self.reconcile.min_plate_length == 0 {
            return Err(Error::config("Minimum plate length must be at least 1"));
        }

        Ok(())
    }

    /// Build a ledger with every configured lot at full availability
    pub fn build_ledger(&self) -> Result<CapacityLedger> {
        CapacityLedger::new(self.lots.lots()?)
    }

    /// Run options for the reconciler
    pub fn reconcile_options(&self) -> ReconcileOptions {
        self.reconcile.options()
    }

    /// Log configuration
    pub fn log_config(&self) {
        tracing::info!(
            environment = %self.runtime.environment,
            log_level = %self.runtime.log_level,
            "Runtime configuration"
        );

        tracing::info!(parking_lots = %self.lots.parking_lots, "Lot configuration");

        tracing::info!(
            min_plate_length = self.reconcile.min_plate_length,
            include_incomplete = self.reconcile.include_incomplete,
            input = %self.reconcile.input_path,
            "Reconciliation configuration"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(parking_lots: &str, min_plate_length: usize) -> Config {
        Config {
            runtime: RuntimeConfig {
                log_level: "info".to_string(),
                environment: "development".to_string(),
            },
            lots: LotConfig {
                parking_lots: parking_lots.to_string(),
            },
            reconcile: ReconcileConfig {
                min_plate_length,
                include_incomplete: true,
                input_path: "./data/parking.json".to_string(),
            },
        }
    }

    #[test]
    fn test_lot_list_parsing() {
        let lots = LotConfig {
            parking_lots: "A:50, B : 10 ,Visitor:5,".to_string(),
        }
        .lots()
        .unwrap();

        assert_eq!(
            lots,
            vec![
                ("A".to_string(), 50),
                ("B".to_string(), 10),
                ("Visitor".to_string(), 5)
            ]
        );
    }

    #[test]
    fn test_validate() {
        assert!(config("A:50,B:50", 5).validate().is_ok());

        for (lots, min) in [("", 5), ("A:0", 5), ("A", 5), ("A:x", 5), (":4", 5), ("A:1", 0), ("A:1,A:2", 5)] {
            assert!(
                matches!(config(lots, min).validate(), Err(Error::Config(_))),
                "accepted lots={:?} min={}",
                lots,
                min
            );
        }
    }

    #[test]
    fn test_build_ledger_and_options() {
        let config = config("A:2,B:3", 6);

        let ledger = config.build_ledger().unwrap();
        assert_eq!(ledger.available("A").unwrap(), 2);
        assert_eq!(ledger.capacity("B").unwrap(), 3);

        let options = config.reconcile_options();
        assert_eq!(options.min_plate_len, 6);
        assert!(options.emit_incomplete);
    }
}
