//! Event data models for LotLedger
//!
//! This module defines the plate events consumed by the reconciler: raw
//! events as handed over by the ingestion layer and parsed events with a
//! normalized plate and timestamp.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::convert::TryFrom;
use validator::Validate;

use super::error::{ValidationError, ValidationErrorKind, ValidationErrors};
use super::plate::Plate;
use super::validation::{
    validate_plate, validate_plate_field, validate_timestamp, validate_timestamp_field,
    MIN_PLATE_LEN,
};

/// Role of a plate observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// Vehicle drove in
    Entry,
    /// Vehicle drove out
    Exit,
    /// Camera sighting; role is inferred from the plate's session state
    Unknown,
}

impl EventKind {
    /// Parse event kind from string
    pub fn from_str(s: &str) -> Result<Self, ValidationError> {
        match s.trim().to_lowercase().as_str() {
            "entry" | "in" => Ok(EventKind::Entry),
            "exit" | "out" => Ok(EventKind::Exit),
            "" | "unknown" => Ok(EventKind::Unknown),
            _ => Err(ValidationError::with_context(
                ValidationErrorKind::InvalidEventKind,
                "kind",
                format!("Unknown event kind: {}", s),
            )),
        }
    }

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Entry => "entry",
            EventKind::Exit => "exit",
            EventKind::Unknown => "unknown",
        }
    }

}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raw plate event as received from the ingestion layer
///
/// Fields are kept as text so that malformed input can be reported
/// instead of failing deserialization.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct RawEvent {
    /// Plate text as read by the camera or typed by an operator
    #[validate(custom(function = "validate_plate"))]
    pub plate: String,

    /// When the plate was seen
    #[validate(custom(function = "validate_timestamp"))]
    pub timestamp: String,

    /// Optional role keyword (entry, exit, unknown)
    #[serde(default)]
    pub kind: Option<String>,
}

impl RawEvent {
    /// Create a raw event with no explicit role
    pub fn new(plate: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            plate: plate.into(),
            timestamp: timestamp.into(),
            kind: None,
        }
    }

    /// Create a raw event with an explicit role
    pub fn with_kind(
        plate: impl Into<String>,
        timestamp: impl Into<String>,
        kind: EventKind,
    ) -> Self {
        Self {
            plate: plate.into(),
            timestamp: timestamp.into(),
            kind: Some(kind.as_str().to_string()),
        }
    }

    /// Validate all fields, collecting every failure
    ///
    /// The derived shape rules run first; the plate length is then checked
    /// against `min_plate_len`, which the derive cannot carry.
    pub fn validate_fields(&self, min_plate_len: usize) -> Result<(), ValidationErrors> {
        let shape = self.validate().err();
        let shape_failed = |field: &str| {
            shape
                .as_ref()
                .map_or(false, |e| e.field_errors().contains_key(field))
        };
        let mut errors = ValidationErrors::new();

        if shape_failed("plate") {
            errors.add(ValidationError::with_context(
                ValidationErrorKind::EmptyPlate,
                "plate",
                format!("No alphanumeric characters in '{}'", self.plate),
            ));
        } else if let Err(e) = validate_plate_field(&self.plate, "plate", min_plate_len) {
            errors.add(e);
        }

        if shape_failed("timestamp") {
            errors.add(ValidationError::with_context(
                ValidationErrorKind::InvalidTimestamp,
                "timestamp",
                format!("Failed to parse timestamp: '{}'", self.timestamp),
            ));
        }

        if let Some(kind) = &self.kind {
            if let Err(e) = EventKind::from_str(kind) {
                errors.add(e);
            }
        }

        errors.into_result(())
    }
}

/// Parsed plate event ready for reconciliation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParkingEvent {
    /// Normalized plate
    pub plate: Plate,

    /// When the plate was seen
    pub timestamp: NaiveDateTime,

    /// Role of the observation
    pub kind: EventKind,

    /// Arrival position in the source, used as the final tie-break
    pub seq: usize,
}

impl ParkingEvent {
    /// Create a parsed event directly
    pub fn new(plate: Plate, timestamp: NaiveDateTime, kind: EventKind) -> Self {
        Self {
            plate,
            timestamp,
            kind,
            seq: 0,
        }
    }

    /// Set the arrival position
    pub fn with_seq(mut self, seq: usize) -> Self {
        self.seq = seq;
        self
    }

    /// Parse a raw event with a caller-supplied minimum plate length
    ///
    /// A single failure is returned as is; several are folded into one
    /// error on the `event` field.
    pub fn from_raw(raw: RawEvent, min_plate_len: usize) -> Result<Self, ValidationError> {
        if let Err(errors) = raw.validate_fields(min_plate_len) {
            return Err(match errors.errors() {
                [single] => single.clone(),
                _ => ValidationError::with_context(
                    ValidationErrorKind::Custom(errors.to_string()),
                    "event",
                    "Multiple validation errors occurred",
                ),
            });
        }

        let plate = Plate::parse_with_min_len(&raw.plate, min_plate_len)?;
        let timestamp = validate_timestamp_field(&raw.timestamp, "timestamp")?;
        let kind = match raw.kind.as_deref() {
            Some(kind) => EventKind::from_str(kind)?,
            None => EventKind::Unknown,
        };

        Ok(ParkingEvent::new(plate, timestamp, kind))
    }
}

/// Sort events into processing order
///
/// Events run in timestamp order, then arrival order, except at a shared
/// instant: exits and sightings of plates with no entry at that instant go
/// first so their slots are free for the entries, and a plate that has both
/// an entry and another event at that instant is entered first.
pub fn sort_for_processing(events: &mut [ParkingEvent]) {
    let entries: HashSet<(NaiveDateTime, Plate)> = events
        .iter()
        .filter(|e| e.kind == EventKind::Entry)
        .map(|e| (e.timestamp, e.plate.clone()))
        .collect();

    events.sort_by_cached_key(|e| {
        let entered_now = entries.contains(&(e.timestamp, e.plate.clone()));
        let rank: u8 = match (e.kind, entered_now) {
            (EventKind::Exit, false) => 0,
            (EventKind::Unknown, false) => 1,
            (EventKind::Entry, _) => 2,
            (EventKind::Unknown, true) => 3,
            (EventKind::Exit, true) => 4,
        };
        (e.timestamp, rank, e.seq)
    });
}

/// Transform a raw event into a parsed event with the default plate rules
impl TryFrom<RawEvent> for ParkingEvent {
    type Error = ValidationError;

    fn try_from(raw: RawEvent) -> Result<Self, Self::Error> {
        ParkingEvent::from_raw(raw, MIN_PLATE_LEN)
    }
}
