//! Test utilities for LotLedger
//!
//! Small constructors shared by the unit tests.

use chrono::NaiveDateTime;

use crate::ledger::CapacityLedger;
use crate::models::{parse_timestamp, EventKind, ParkingEvent, Plate, Session};
use crate::roster::Roster;

/// Parse a timestamp, panicking on bad test input
pub fn at(timestamp: &str) -> NaiveDateTime {
    parse_timestamp(timestamp).unwrap_or_else(|| panic!("bad test timestamp: {}", timestamp))
}

/// Parse a plate, panicking on bad test input
pub fn plate(raw: &str) -> Plate {
    Plate::parse(raw).unwrap_or_else(|e| panic!("bad test plate {}: {}", raw, e))
}

/// Turn string literals into owned rows
pub fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
    data.iter()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect()
}

/// Roster from `(plate, lot)` pairs
pub fn roster(assignments: &[(&str, &str)]) -> Roster {
    let data: Vec<Vec<String>> = assignments
        .iter()
        .map(|(plate, lot)| vec![plate.to_string(), lot.to_string()])
        .collect();
    Roster::load(data).expect("valid test roster")
}

/// Ledger from `(lot, capacity)` pairs
pub fn ledger(lots: &[(&str, u32)]) -> CapacityLedger {
    CapacityLedger::new(lots.iter().map(|(lot, capacity)| (lot.to_string(), *capacity)))
        .expect("valid test ledger")
}

/// Explicit entry event
pub fn entry(raw_plate: &str, timestamp: &str) -> ParkingEvent {
    ParkingEvent::new(plate(raw_plate), at(timestamp), EventKind::Entry)
}

/// Explicit exit event
pub fn exit(raw_plate: &str, timestamp: &str) -> ParkingEvent {
    ParkingEvent::new(plate(raw_plate), at(timestamp), EventKind::Exit)
}

/// Sighting with no explicit role
pub fn sighting(raw_plate: &str, timestamp: &str) -> ParkingEvent {
    ParkingEvent::new(plate(raw_plate), at(timestamp), EventKind::Unknown)
}

/// Closed session
pub fn closed(raw_plate: &str, lot: &str, in_time: &str, out_time: &str) -> Session {
    Session::closed(plate(raw_plate), lot, at(in_time), at(out_time))
}

/// Open session
pub fn open(raw_plate: &str, lot: &str, in_time: &str) -> Session {
    Session::open(plate(raw_plate), lot, at(in_time))
}
