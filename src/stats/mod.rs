//! Occupancy and duration statistics
//!
//! Pure, read-only queries over a slice of sessions. Nothing here mutates
//! state, so the functions can run concurrently against one snapshot.
//!
//! Open sessions are never part of a duration statistic. Histogram and
//! occupancy queries take whatever sessions the caller passes, with an
//! explicit policy for open ones where it matters.

mod histogram;
mod occupancy;

pub use histogram::{hourly_histogram, peak_hour, HourlyHistogram};
pub use occupancy::{occupancy_at, LotOccupancy, OpenSessionPolicy};

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::models::{LotId, Plate, Session};

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Time a closed session lasted
///
/// Fails with [`Error::NegativeDuration`] when the exit precedes the entry
/// and with a validation error when the session is still open.
pub fn duration(session: &Session) -> Result<Duration> {
    let out_time = session.out_time.ok_or_else(|| {
        Error::validation(format!("session for {} is still open", session.plate))
    })?;

    if out_time < session.in_time {
        return Err(Error::NegativeDuration {
            plate: session.plate.to_string(),
            in_time: session.in_time,
            out_time,
        });
    }

    Ok(out_time - session.in_time)
}

/// Session duration in fractional hours
pub fn duration_hours(session: &Session) -> Result<f64> {
    duration(session).map(to_hours)
}

fn to_hours(duration: Duration) -> f64 {
    duration.num_seconds() as f64 / SECONDS_PER_HOUR
}

/// Mean duration in hours per lot over the closed sessions
///
/// Every lot in `lots` appears in the result; lots without closed sessions
/// map to `None`. Lots that only appear in `sessions` are included too.
pub fn average_duration_by_lot<'a, L>(
    sessions: &[Session],
    lots: L,
) -> Result<BTreeMap<LotId, Option<f64>>>
where
    L: IntoIterator<Item = &'a LotId>,
{
    let mut totals: BTreeMap<LotId, (f64, usize)> = BTreeMap::new();

    for session in sessions.iter().filter(|s| s.is_closed()) {
        let hours = duration_hours(session)?;
        let entry = totals.entry(session.lot.clone()).or_insert((0.0, 0));
        entry.0 += hours;
        entry.1 += 1;
    }

    let mut averages: BTreeMap<LotId, Option<f64>> =
        lots.into_iter().map(|lot| (lot.clone(), None)).collect();
    for (lot, (total, count)) in totals {
        averages.insert(lot, Some(total / count as f64));
    }

    Ok(averages)
}

/// Count, mean, min and max duration over the closed sessions
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DurationSummary {
    /// Number of closed sessions
    pub count: usize,
    /// Mean duration in hours
    pub mean_hours: Option<f64>,
    /// Shortest duration in hours
    pub min_hours: Option<f64>,
    /// Longest duration in hours
    pub max_hours: Option<f64>,
}

impl DurationSummary {
    /// Summarise the closed sessions in `sessions`
    pub fn from_sessions(sessions: &[Session]) -> Result<Self> {
        let hours = sessions
            .iter()
            .filter(|s| s.is_closed())
            .map(duration_hours)
            .collect::<Result<Vec<f64>>>()?;

        if hours.is_empty() {
            return Ok(Self::default());
        }

        let total: f64 = hours.iter().sum();
        Ok(Self {
            count: hours.len(),
            mean_hours: Some(total / hours.len() as f64),
            min_hours: hours.iter().copied().reduce(f64::min),
            max_hours: hours.iter().copied().reduce(f64::max),
        })
    }
}

/// A vehicle's sessions ordered by entry time, optionally limited to
/// sessions entered on `date`
pub fn sessions_for_plate<'a>(
    sessions: &'a [Session],
    plate: &Plate,
    date: Option<NaiveDate>,
) -> Vec<&'a Session> {
    let mut found: Vec<&Session> = sessions
        .iter()
        .filter(|s| &s.plate == plate)
        .filter(|s| date.map_or(true, |d| s.in_time.date() == d))
        .collect();
    found.sort_by_key(|s| s.in_time);
    found
}

/// Render a duration as `"{d} days {h} hours {m} minutes"`
pub fn format_duration(duration: Duration) -> String {
    let days = duration.num_days();
    let hours = duration.num_hours() - days * 24;
    let minutes = duration.num_minutes() - duration.num_hours() * 60;
    format!("{} days {} hours {} minutes", days, hours, minutes)
}
