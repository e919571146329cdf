//! Row ingestion
//!
//! Accepted row shapes:
//! - `(plate, timestamp)`: a sighting whose role follows from session state
//! - `(plate, in_time, out_time)`: a log row; blank `out_time` means the
//!   vehicle is still inside
//! - `(plate, timestamp, kind)`: a sighting with an explicit `entry`/`exit`

use tracing::debug;

use crate::models::validation::{
    validate_column_count, validate_entry_before_exit, validate_optional_timestamp_field,
    validate_timestamp_field,
};
use crate::models::{EventKind, ParkingEvent, Plate, RawEvent, ValidationError};

use super::{Rejection, RejectionKind};

/// Events and rejections produced from a batch of rows
#[derive(Debug, Clone, Default)]
pub struct ParsedRows {
    /// Parsed events in source order
    pub events: Vec<ParkingEvent>,
    /// Rows that failed validation
    pub rejections: Vec<Rejection>,
}

/// Parse one row into its events
///
/// `seq` is the arrival position given to the first event of the row.
pub fn parse_row(
    row: &[String],
    min_plate_len: usize,
    seq: usize,
) -> Result<Vec<ParkingEvent>, ValidationError> {
    validate_column_count(row, 2, 3, "2 or 3")?;

    let third = row.get(2).map(|cell| cell.trim()).filter(|cell| !cell.is_empty());

    // Sightings, with or without a role keyword, go through the raw event model
    let kind_keyword = third.filter(|cell| EventKind::from_str(cell).is_ok());
    if row.len() == 2 || kind_keyword.is_some() {
        let raw = RawEvent {
            plate: row[0].clone(),
            timestamp: row[1].clone(),
            kind: kind_keyword.map(str::to_string),
        };
        return Ok(vec![ParkingEvent::from_raw(raw, min_plate_len)?.with_seq(seq)]);
    }

    let plate = Plate::parse_with_min_len(&row[0], min_plate_len)?;
    let in_time = validate_timestamp_field(&row[1], "timestamp")?;

    let out_time = validate_optional_timestamp_field(third, "out_time")?;
    validate_entry_before_exit(in_time, out_time)?;

    let mut events = vec![ParkingEvent::new(plate.clone(), in_time, EventKind::Entry).with_seq(seq)];
    if let Some(out_time) = out_time {
        events.push(ParkingEvent::new(plate, out_time, EventKind::Exit).with_seq(seq + 1));
    }
    Ok(events)
}

/// Parse a batch of rows, collecting malformed rows as rejections
pub fn parse_rows<I, R>(rows: I, min_plate_len: usize) -> ParsedRows
where
    I: IntoIterator<Item = R>,
    R: AsRef<[String]>,
{
    let mut parsed = ParsedRows::default();

    for (index, row) in rows.into_iter().enumerate() {
        let row = row.as_ref();
        match parse_row(row, min_plate_len, parsed.events.len()) {
            Ok(events) => parsed.events.extend(events),
            Err(e) => {
                debug!(row = index, error = %e, "Rejecting malformed row");
                let plate = row.first().cloned().unwrap_or_default();
                parsed.rejections.push(Rejection::new(
                    RejectionKind::MalformedRow,
                    plate,
                    None,
                    format!("row {}: {}", index, e),
                ));
            }
        }
    }

    parsed
}
