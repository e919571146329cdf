//! Authorized-vehicle roster
//!
//! Maps each registered plate to the lot it is allowed to park in. The roster
//! is loaded once per run from `(plate, lot)` rows and is read-only afterwards.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::ledger::CapacityLedger;
use crate::models::validation::{validate_required, MIN_PLATE_LEN};
use crate::models::{LotId, Plate};

/// First-cell values recognised as a header row
const HEADER_CELLS: &[&str] = &["plate", "numberplate", "number plate", "plate_number"];

/// One authorized vehicle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    /// Registered plate
    pub plate: Plate,
    /// Lot the plate is assigned to
    pub lot: LotId,
}

/// Plate to lot assignments
#[derive(Debug, Clone, Default)]
pub struct Roster {
    assignments: HashMap<Plate, LotId>,
    conflicting_duplicates: usize,
}

impl Roster {
    /// Load a roster from `(plate, lot)` rows with the default plate rules
    pub fn load<I, R>(rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[String]>,
    {
        Self::load_with_min_len(rows, MIN_PLATE_LEN)
    }

    /// Load a roster from `(plate, lot)` rows
    ///
    /// Every row must have exactly two fields and a valid plate. An optional
    /// header row is skipped. When a plate is listed twice with different
    /// lots the first row wins and the conflict is logged and counted.
    pub fn load_with_min_len<I, R>(rows: I, min_plate_len: usize) -> Result<Self>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[String]>,
    {
        let mut roster = Roster::default();

        for (index, row) in rows.into_iter().enumerate() {
            let row = row.as_ref();

            if index == 0 && is_header(row) {
                debug!("Skipping roster header row");
                continue;
            }

            if row.len() != 2 {
                return Err(Error::malformed_roster(
                    index,
                    format!("expected 2 fields, got {}", row.len()),
                ));
            }

            let plate = Plate::parse_with_min_len(&row[0], min_plate_len)
                .map_err(|e| Error::malformed_roster(index, e.to_string()))?;

            validate_required(&row[1], "lot")
                .map_err(|e| Error::malformed_roster(index, e.to_string()))?;
            let lot = row[1].trim();

            roster.insert(plate, lot.to_string(), index);
        }

        debug!(
            vehicles = roster.len(),
            conflicts = roster.conflicting_duplicates,
            "Roster loaded"
        );
        Ok(roster)
    }

    /// Build a roster from already-parsed entries, first entry per plate wins
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = RosterEntry>,
    {
        let mut roster = Roster::default();
        for (index, entry) in entries.into_iter().enumerate() {
            roster.insert(entry.plate, entry.lot, index);
        }
        roster
    }

    fn insert(&mut self, plate: Plate, lot: LotId, index: usize) {
        match self.assignments.get(&plate) {
            Some(existing) if *existing == lot => {}
            Some(existing) => {
                warn!(
                    plate = %plate,
                    kept_lot = %existing,
                    ignored_lot = %lot,
                    row = index,
                    "Conflicting roster duplicate; keeping first assignment"
                );
                self.conflicting_duplicates += 1;
            }
            None => {
                self.assignments.insert(plate, lot);
            }
        }
    }

    /// Lot assigned to a plate
    pub fn lookup(&self, plate: &Plate) -> Option<&LotId> {
        self.assignments.get(plate)
    }

    /// Whether the plate is registered
    pub fn contains(&self, plate: &Plate) -> bool {
        self.assignments.contains_key(plate)
    }

    /// Number of registered plates
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// Whether no plates are registered
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Number of rows ignored because they reassigned an already-listed plate
    pub fn conflicting_duplicates(&self) -> usize {
        self.conflicting_duplicates
    }

    /// Distinct lot ids referenced by the roster
    pub fn lots(&self) -> BTreeSet<&LotId> {
        self.assignments.values().collect()
    }

    /// Check every referenced lot is configured in the ledger
    pub fn validate_lots(&self, ledger: &CapacityLedger) -> Result<()> {
        match self.lots().into_iter().find(|lot| !ledger.contains(lot)) {
            Some(lot) => Err(Error::unknown_lot(lot.as_str())),
            None => Ok(()),
        }
    }
}

fn is_header(row: &[String]) -> bool {
    row.first()
        .map(|cell| HEADER_CELLS.contains(&cell.trim().to_lowercase().as_str()))
        .unwrap_or(false)
}
