//! Error handling module for LotLedger
//!
//! This module defines the fatal error types used throughout the crate.
//! Per-event problems found during reconciliation are *not* errors: they are
//! recorded as rejections in the run report (see [`crate::reconcile`]).

use chrono::NaiveDateTime;
use thiserror::Error;

/// Result type alias for LotLedger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for LotLedger
#[derive(Error, Debug)]
pub enum Error {
    /// A roster row could not be loaded
    #[error("Malformed roster: row {row}: {reason}")]
    MalformedRoster {
        /// Zero-based row index in the roster source
        row: usize,
        /// What was wrong with the row
        reason: String,
    },

    /// A lot id that the capacity configuration does not know about
    #[error("Unknown parking lot: '{0}'")]
    UnknownLot(String),

    /// A release on a lot that is already at full capacity (double release)
    #[error("Capacity overflow on lot '{lot}': release would exceed capacity {capacity}")]
    CapacityOverflow {
        /// Lot that was released
        lot: String,
        /// Configured capacity of that lot
        capacity: u32,
    },

    /// A session whose exit precedes its entry
    #[error("Negative duration for plate '{plate}': in {in_time}, out {out_time}")]
    NegativeDuration {
        /// Plate of the offending session
        plate: String,
        /// Session entry time
        in_time: NaiveDateTime,
        /// Session exit time
        out_time: NaiveDateTime,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation errors for incoming data
    #[error("Validation error: {0}")]
    Validation(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a malformed roster error
    pub fn malformed_roster<S: Into<String>>(row: usize, reason: S) -> Self {
        Error::MalformedRoster {
            row,
            reason: reason.into(),
        }
    }

    /// Create an unknown lot error
    pub fn unknown_lot<S: Into<String>>(lot: S) -> Self {
        Error::UnknownLot(lot.into())
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Error::Validation(msg.into())
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Error::Internal(msg.into())
    }

    /// Check if this error indicates a defect in reconciliation or
    /// configuration rather than bad input
    pub fn is_logic_error(&self) -> bool {
        matches!(
            self,
            Error::UnknownLot(_) | Error::CapacityOverflow { .. } | Error::NegativeDuration { .. }
        )
    }

    /// Get a string representation of the error type
    pub fn error_type(&self) -> &'static str {
        match self {
            Error::MalformedRoster { .. } => "malformed_roster",
            Error::UnknownLot(_) => "unknown_lot",
            Error::CapacityOverflow { .. } => "capacity_overflow",
            Error::NegativeDuration { .. } => "negative_duration",
            Error::Config(_) => "configuration_error",
            Error::Validation(_) => "validation_error",
            Error::Internal(_) => "internal_error",
        }
    }
}

/// Convert from envconfig::Error to our Error type
impl From<envconfig::Error> for Error {
    fn from(err: envconfig::Error) -> Self {
        Error::Config(err.to_string())
    }
}
