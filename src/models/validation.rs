//! Custom validation functions for LotLedger models
//!
//! This module provides reusable validation functions for ingested fields:
//! licence plates, timestamps and row shapes.

use chrono::{DateTime, NaiveDateTime};
use regex::Regex;
use std::sync::OnceLock;
use validator::ValidationError;

use super::error::{ValidationError as ModelValidationError, ValidationErrorKind};

/// Default minimum plate length after cleaning
pub const MIN_PLATE_LEN: usize = 5;

/// Naive timestamp layouts accepted from the ingestion layer, tried in order
pub const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
    "%Y-%m-%d %H:%M",
];

static PLATE_NOISE_REGEX: OnceLock<Regex> = OnceLock::new();

/// Get or initialize the pattern matching everything that is not part of a plate
fn plate_noise_regex() -> &'static Regex {
    PLATE_NOISE_REGEX.get_or_init(|| {
        Regex::new(r"[^A-Za-z0-9]+").expect("Invalid plate noise regex pattern")
    })
}

/// Strip whitespace and punctuation from a plate and uppercase it
pub fn clean_plate(raw: &str) -> String {
    plate_noise_regex().replace_all(raw, "").to_uppercase()
}

/// Validate a plate for the validator crate
///
/// Only checks that something is left after cleaning. The minimum length is
/// configurable and is enforced by [`validate_plate_field`].
pub fn validate_plate(plate: &str) -> Result<(), ValidationError> {
    if clean_plate(plate).is_empty() {
        Err(ValidationError::new("Plate has no alphanumeric characters"))
    } else {
        Ok(())
    }
}

/// Clean a plate and check its length, returning the normalized form
pub fn validate_plate_field(
    raw: &str,
    field_name: &str,
    min_len: usize,
) -> Result<String, ModelValidationError> {
    let cleaned = clean_plate(raw);

    if cleaned.is_empty() {
        return Err(ModelValidationError::with_context(
            ValidationErrorKind::EmptyPlate,
            field_name,
            format!("No alphanumeric characters in '{}'", raw),
        ));
    }

    if cleaned.len() < min_len {
        return Err(ModelValidationError::with_context(
            ValidationErrorKind::PlateTooShort { min: min_len },
            field_name,
            format!("'{}' has {} characters", cleaned, cleaned.len()),
        ));
    }

    Ok(cleaned)
}

/// Parse a timestamp in any accepted layout
///
/// RFC 3339 input carries an offset and is converted to naive UTC; every
/// other layout is taken as wall-clock time.
pub fn parse_timestamp(timestamp: &str) -> Option<NaiveDateTime> {
    let trimmed = timestamp.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }

    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
}

/// Validate a timestamp for the validator crate
pub fn validate_timestamp(timestamp: &str) -> Result<(), ValidationError> {
    match parse_timestamp(timestamp) {
        Some(_) => Ok(()),
        None => Err(ValidationError::new("Unrecognised timestamp format")),
    }
}

/// Validate a timestamp returning the parsed value
pub fn validate_timestamp_field(
    timestamp: &str,
    field_name: &str,
) -> Result<NaiveDateTime, ModelValidationError> {
    parse_timestamp(timestamp).ok_or_else(|| {
        ModelValidationError::with_context(
            ValidationErrorKind::InvalidTimestamp,
            field_name,
            format!("Failed to parse timestamp: '{}'", timestamp),
        )
    })
}

/// Validate an optional timestamp; blank strings count as absent
pub fn validate_optional_timestamp_field(
    timestamp: Option<&str>,
    field_name: &str,
) -> Result<Option<NaiveDateTime>, ModelValidationError> {
    match timestamp.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => validate_timestamp_field(value, field_name).map(Some),
    }
}

/// Validate that a row has a column count within `[min, max]`
pub fn validate_column_count(
    row: &[String],
    min: usize,
    max: usize,
    expected: &'static str,
) -> Result<(), ModelValidationError> {
    if row.len() < min || row.len() > max {
        return Err(ModelValidationError::with_context(
            ValidationErrorKind::ColumnCount {
                expected,
                found: row.len(),
            },
            "row",
            format!("expected {} columns, found {}", expected, row.len()),
        ));
    }
    Ok(())
}

/// Validate that entry does not come after exit on the same row
pub fn validate_entry_before_exit(
    in_time: NaiveDateTime,
    out_time: Option<NaiveDateTime>,
) -> Result<(), ModelValidationError> {
    match out_time {
        Some(out) if in_time > out => Err(ModelValidationError::with_context(
            ValidationErrorKind::EntryAfterExit,
            "out_time",
            format!("in {} is after out {}", in_time, out),
        )),
        _ => Ok(()),
    }
}

/// Validate a required field is not empty
pub fn validate_required(value: &str, field_name: &str) -> Result<(), ModelValidationError> {
    if value.trim().is_empty() {
        Err(ModelValidationError::new(
            ValidationErrorKind::RequiredField,
            field_name,
        ))
    } else {
        Ok(())
    }
}
