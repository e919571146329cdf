//! Entries per hour of day

use chrono::{NaiveDate, Timelike};
use serde::{Deserialize, Serialize};

use crate::models::Session;

const HOURS: usize = 24;

/// Session entries bucketed by hour for one day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HourlyHistogram {
    /// Day the histogram covers
    pub date: Option<NaiveDate>,
    /// Entry count per hour, index 0 is 00:00-00:59
    pub counts: [usize; HOURS],
}

impl HourlyHistogram {
    /// Entries during `hour`; zero for hours outside 0..24
    pub fn count(&self, hour: u32) -> usize {
        self.counts.get(hour as usize).copied().unwrap_or(0)
    }

    /// Entries across the whole day
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Busiest hour, lowest hour on ties; `None` for an empty day
    pub fn peak_hour(&self) -> Option<u32> {
        let max = self.counts.iter().copied().max().filter(|max| *max > 0)?;
        self.counts
            .iter()
            .position(|count| *count == max)
            .map(|hour| hour as u32)
    }

    /// `(hour, count)` pairs in hour order
    pub fn iter(&self) -> impl Iterator<Item = (u32, usize)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .map(|(hour, count)| (hour as u32, *count))
    }
}

/// Count the sessions entered on `date` by entry hour
pub fn hourly_histogram(sessions: &[Session], date: NaiveDate) -> HourlyHistogram {
    let mut histogram = HourlyHistogram {
        date: Some(date),
        ..HourlyHistogram::default()
    };

    for session in sessions.iter().filter(|s| s.in_time.date() == date) {
        histogram.counts[session.in_time.hour() as usize] += 1;
    }

    histogram
}

/// Hour with the most entries on `date`
pub fn peak_hour(sessions: &[Session], date: NaiveDate) -> Option<u32> {
    hourly_histogram(sessions, date).peak_hour()
}
