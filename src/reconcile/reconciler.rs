//! Entry/exit pairing with slot accounting

use std::collections::HashMap;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::ledger::CapacityLedger;
use crate::logging::Timer;
use crate::models::{sort_for_processing, EventKind, ParkingEvent, Plate, Session, MIN_PLATE_LEN};
use crate::roster::Roster;

use super::ingest::parse_rows;
use super::report::RunReport;
use super::{Rejection, RejectionKind};

/// Per-run policy knobs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Minimum plate length accepted at ingestion
    pub min_plate_len: usize,
    /// Whether sessions still open at the end appear in the report
    pub emit_incomplete: bool,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            min_plate_len: MIN_PLATE_LEN,
            emit_incomplete: true,
        }
    }
}

/// What happened to a single event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    /// A new session was opened and a slot taken
    Opened,
    /// The plate's open session was closed and its slot returned
    Closed(Session),
    /// The event was not applied
    Rejected(RejectionKind),
}

/// Pairs plate events into sessions for one run
///
/// Owns the roster, the ledger and the open-session table for the duration
/// of the run. Every mutation goes through [`Reconciler::process_event`].
#[derive(Debug)]
pub struct Reconciler {
    run_id: Uuid,
    roster: Roster,
    ledger: CapacityLedger,
    options: ReconcileOptions,
    open: HashMap<Plate, Session>,
    closed: Vec<Session>,
    incomplete: Vec<Session>,
    rejections: Vec<Rejection>,
    finished: bool,
}

impl Reconciler {
    /// Create a reconciler with default options
    pub fn new(roster: Roster, ledger: CapacityLedger) -> Result<Self> {
        Self::with_options(roster, ledger, ReconcileOptions::default())
    }

    /// Create a reconciler
    ///
    /// Fails with [`Error::UnknownLot`] when the roster assigns a plate to a
    /// lot the ledger does not configure.
    pub fn with_options(
        roster: Roster,
        ledger: CapacityLedger,
        options: ReconcileOptions,
    ) -> Result<Self> {
        roster.validate_lots(&ledger)?;

        Ok(Self {
            run_id: Uuid::new_v4(),
            roster,
            ledger,
            options,
            open: HashMap::new(),
            closed: Vec::new(),
            incomplete: Vec::new(),
            rejections: Vec::new(),
            finished: false,
        })
    }

    /// Identifier of this run
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Current slot counters
    pub fn ledger(&self) -> &CapacityLedger {
        &self.ledger
    }

    /// Roster used for lot resolution
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Open session for a plate, if any
    pub fn open_session(&self, plate: &Plate) -> Option<&Session> {
        self.open.get(plate)
    }

    /// Number of currently open sessions
    pub fn open_count(&self) -> usize {
        self.open.len()
    }

    /// Sessions closed so far
    pub fn closed_sessions(&self) -> &[Session] {
        &self.closed
    }

    /// Rejections recorded so far
    pub fn rejections(&self) -> &[Rejection] {
        &self.rejections
    }

    /// Whether [`Reconciler::finish`] has run
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Parse raw rows, recording malformed ones, and return the events
    ///
    /// Fails when the run is already finished.
    pub fn ingest_rows<I, R>(&mut self, rows: I) -> Result<Vec<ParkingEvent>>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[String]>,
    {
        self.ensure_running()?;

        let parsed = parse_rows(rows, self.options.min_plate_len);
        if !parsed.rejections.is_empty() {
            warn!(
                run_id = %self.run_id,
                malformed = parsed.rejections.len(),
                "Malformed rows rejected"
            );
        }
        self.rejections.extend(parsed.rejections);
        Ok(parsed.events)
    }

    /// Process a whole batch in timestamp order, then finish the run
    ///
    /// See [`sort_for_processing`] for how events sharing a timestamp are
    /// ordered.
    pub fn reconcile(&mut self, mut events: Vec<ParkingEvent>) -> Result<()> {
        let span = crate::reconcile_span!(self.run_id);
        let _guard = span.enter();
        let timer = Timer::start("reconcile");

        sort_for_processing(&mut events);
        for event in &events {
            self.process_event(event)?;
        }
        self.finish()?;

        span.record("events", events.len());
        span.record("closed", self.closed.len());
        span.record("rejected", self.rejections.len());
        info!(
            events = events.len(),
            closed = self.closed.len(),
            incomplete = self.incomplete.len(),
            rejected = self.rejections.len(),
            "Reconciliation complete"
        );
        timer.stop();
        Ok(())
    }

    /// Apply one event
    ///
    /// Callers feeding events one by one are responsible for timestamp
    /// order. Fails only on ledger defects (unknown lot, double release) or
    /// when the run is already finished.
    pub fn process_event(&mut self, event: &ParkingEvent) -> Result<EventOutcome> {
        self.ensure_running()?;

        let lot = match self.roster.lookup(&event.plate) {
            Some(lot) => lot.clone(),
            None => {
                return Ok(self.reject(
                    RejectionKind::UnauthorizedPlate,
                    event,
                    "plate is not on the roster",
                ))
            }
        };

        let open_in_time = self.open.get(&event.plate).map(|session| session.in_time);

        match (open_in_time, event.kind) {
            (None, EventKind::Exit) => Ok(self.reject(
                RejectionKind::OrphanExit,
                event,
                "exit without an open session",
            )),
            (None, _) => {
                if !self.ledger.try_acquire(&lot)? {
                    return Ok(self.reject(
                        RejectionKind::CapacityExceeded,
                        event,
                        format!("lot {} is full", lot),
                    ));
                }
                debug!(plate = %event.plate, lot = %lot, at = %event.timestamp, "Session opened");
                self.open.insert(
                    event.plate.clone(),
                    Session::open(event.plate.clone(), lot, event.timestamp),
                );
                Ok(EventOutcome::Opened)
            }
            (Some(in_time), EventKind::Entry) => Ok(self.reject(
                RejectionKind::DuplicateEntryConflict,
                event,
                format!("session already open since {}", in_time),
            )),
            (Some(in_time), _) if event.timestamp <= in_time => Ok(self.reject(
                RejectionKind::InvalidOrdering,
                event,
                format!("exit at or before entry {}", in_time),
            )),
            (Some(_), _) => {
                let session = match self.open.remove(&event.plate) {
                    Some(session) => session.close(event.timestamp),
                    None => return Err(Error::internal("open session vanished")),
                };
                self.ledger.release(&session.lot)?;
                debug!(plate = %session.plate, lot = %session.lot, at = %event.timestamp, "Session closed");
                self.closed.push(session.clone());
                Ok(EventOutcome::Closed(session))
            }
        }
    }

    /// Flag every still-open session as incomplete
    ///
    /// Incomplete sessions keep their slots: the vehicles are still parked.
    pub fn finish(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;

        let mut remaining: Vec<Session> = self.open.drain().map(|(_, session)| session).collect();
        remaining.sort_by(|a, b| a.in_time.cmp(&b.in_time).then_with(|| a.plate.cmp(&b.plate)));

        for session in &remaining {
            self.rejections.push(Rejection::new(
                RejectionKind::IncompleteSession,
                session.plate.as_str(),
                Some(session.in_time),
                format!("no exit after entry into lot {}", session.lot),
            ));
        }
        if !remaining.is_empty() {
            warn!(
                run_id = %self.run_id,
                incomplete = remaining.len(),
                "Sessions left open at end of run"
            );
        }

        self.incomplete = remaining;
        Ok(())
    }

    /// Summarise the run
    pub fn report_run(&self) -> RunReport {
        let incomplete_sessions = if self.options.emit_incomplete {
            self.incomplete.clone()
        } else {
            Vec::new()
        };

        RunReport {
            run_id: self.run_id,
            closed_sessions: self.closed.clone(),
            incomplete_sessions,
            rejections: RunReport::count_rejections(&self.rejections),
            rejection_log: self.rejections.clone(),
            ledger_snapshot: self.ledger.snapshot(),
        }
    }

    fn ensure_running(&self) -> Result<()> {
        if self.finished {
            return Err(Error::internal(format!(
                "run {} is finished; no further events accepted",
                self.run_id
            )));
        }
        Ok(())
    }

    fn reject(
        &mut self,
        kind: RejectionKind,
        event: &ParkingEvent,
        detail: impl Into<String>,
    ) -> EventOutcome {
        let rejection = Rejection::new(
            kind,
            event.plate.as_str(),
            Some(event.timestamp),
            detail,
        );
        debug!(
            kind = %kind,
            plate = %event.plate,
            at = %event.timestamp,
            detail = %rejection.detail,
            "Event rejected"
        );
        self.rejections.push(rejection);
        EventOutcome::Rejected(kind)
    }
}

/// Run a full batch: load rows, reconcile, report
pub fn run_batch<I, R>(
    roster: Roster,
    ledger: CapacityLedger,
    rows: I,
    options: ReconcileOptions,
) -> Result<RunReport>
where
    I: IntoIterator<Item = R>,
    R: AsRef<[String]>,
{
    let mut reconciler = Reconciler::with_options(roster, ledger, options)?;
    let events = reconciler.ingest_rows(rows)?;
    reconciler.reconcile(events)?;
    Ok(reconciler.report_run())
}
