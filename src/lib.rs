//! LotLedger Library
//!
//! Assigns vehicles to parking lots from plate sightings: loads a roster of
//! authorised plates, tracks free slots per lot, pairs entries with exits
//! into sessions and answers occupancy and duration questions over them.

pub mod config;
pub mod error;
pub mod ledger;
pub mod logging;
pub mod models;
pub mod reconcile;
pub mod roster;
pub mod stats;

#[cfg(test)]
mod test_utils;

// Re-export commonly used types at the crate root
pub use config::Config;
pub use error::{Error, Result};
pub use ledger::CapacityLedger;
pub use roster::{Roster, RosterEntry};

// Re-export model types
pub use models::{
    EventKind, LotId, ParkingEvent, Plate, RawEvent, Session, ValidationError,
    ValidationErrorKind,
};

// Re-export reconciliation entry points
pub use reconcile::{
    run_batch, EventOutcome, ReconcileOptions, Reconciler, Rejection, RejectionKind, RunReport,
};
