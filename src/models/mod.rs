//! Data models for LotLedger
//!
//! This module contains the domain models used throughout the crate:
//! plates, plate events, parking sessions and field validation.

pub mod error;
pub mod event;
pub mod plate;
pub mod session;
pub mod validation;

// Re-export commonly used types
pub use error::{ValidationError, ValidationErrorKind, ValidationErrors};
pub use event::{sort_for_processing, EventKind, ParkingEvent, RawEvent};
pub use plate::Plate;
pub use session::{LotId, Session};
pub use validation::{clean_plate, parse_timestamp, MIN_PLATE_LEN};
