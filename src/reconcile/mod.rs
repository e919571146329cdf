//! Session reconciliation
//!
//! This module provides:
//! - Row ingestion that turns raw `(plate, timestamp[, out|kind])` rows into
//!   parsed events, rejecting malformed rows
//! - The [`Reconciler`], which pairs entries with exits per plate in
//!   timestamp order while taking and returning lot slots
//! - The [`RunReport`] summarising a run for auditing
//!
//! Problems with individual events never abort a run. They are recorded as
//! [`Rejection`]s and counted by [`RejectionKind`].
//!
//! A reconciler is single-writer: the open-session table and the ledger are
//! mutated without synchronisation. Feeding it from several threads requires
//! a single owning task or a lock per lot around `try_acquire`/`release`.

mod ingest;
mod reconciler;
mod report;

pub use ingest::{parse_row, parse_rows, ParsedRows};
pub use reconciler::{run_batch, EventOutcome, ReconcileOptions, Reconciler};
pub use report::RunReport;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Why an event (or ingestion row) was not applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RejectionKind {
    /// Plate is not on the roster
    UnauthorizedPlate,
    /// Assigned lot had no free slot
    CapacityExceeded,
    /// Exit at or before the open session's entry
    InvalidOrdering,
    /// Entry for a plate that already has an open session
    DuplicateEntryConflict,
    /// Session still open at the end of the run
    IncompleteSession,
    /// Explicit exit for a plate with no open session
    OrphanExit,
    /// Row failed column, plate or timestamp validation
    MalformedRow,
}

impl RejectionKind {
    /// Every category, in report order
    pub const ALL: [RejectionKind; 7] = [
        RejectionKind::UnauthorizedPlate,
        RejectionKind::CapacityExceeded,
        RejectionKind::InvalidOrdering,
        RejectionKind::DuplicateEntryConflict,
        RejectionKind::IncompleteSession,
        RejectionKind::OrphanExit,
        RejectionKind::MalformedRow,
    ];

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionKind::UnauthorizedPlate => "unauthorized-plate",
            RejectionKind::CapacityExceeded => "capacity-exceeded",
            RejectionKind::InvalidOrdering => "invalid-ordering",
            RejectionKind::DuplicateEntryConflict => "duplicate-entry-conflict",
            RejectionKind::IncompleteSession => "incomplete-session",
            RejectionKind::OrphanExit => "orphan-exit",
            RejectionKind::MalformedRow => "malformed-row",
        }
    }
}

impl std::fmt::Display for RejectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One non-fatal processing outcome kept for audit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    /// Rejection category
    pub kind: RejectionKind,

    /// Plate as seen (raw text for malformed rows)
    pub plate: String,

    /// Event time, when it could be parsed
    pub timestamp: Option<NaiveDateTime>,

    /// Human-readable explanation
    pub detail: String,
}

impl Rejection {
    /// Create a rejection record
    pub fn new(
        kind: RejectionKind,
        plate: impl Into<String>,
        timestamp: Option<NaiveDateTime>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            plate: plate.into(),
            timestamp,
            detail: detail.into(),
        }
    }
}
