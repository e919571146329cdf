//! Parking session model

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::plate::Plate;

/// Identifier of a parking lot
pub type LotId = String;

/// One vehicle's continuous occupancy of a lot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Vehicle plate
    pub plate: Plate,

    /// Lot the vehicle is assigned to
    pub lot: LotId,

    /// When the vehicle entered
    pub in_time: NaiveDateTime,

    /// When the vehicle left; `None` while the session is open
    pub out_time: Option<NaiveDateTime>,
}

impl Session {
    /// Open a new session
    pub fn open(plate: Plate, lot: impl Into<LotId>, in_time: NaiveDateTime) -> Self {
        Self {
            plate,
            lot: lot.into(),
            in_time,
            out_time: None,
        }
    }

    /// Build a closed session directly
    pub fn closed(
        plate: Plate,
        lot: impl Into<LotId>,
        in_time: NaiveDateTime,
        out_time: NaiveDateTime,
    ) -> Self {
        Self {
            plate,
            lot: lot.into(),
            in_time,
            out_time: Some(out_time),
        }
    }

    /// Consume the session, setting its exit time
    pub fn close(mut self, out_time: NaiveDateTime) -> Self {
        self.out_time = Some(out_time);
        self
    }

    /// Whether the vehicle is still parked
    pub fn is_open(&self) -> bool {
        self.out_time.is_none()
    }

    /// Whether the session has an exit time
    pub fn is_closed(&self) -> bool {
        self.out_time.is_some()
    }

    /// Time between entry and exit, unchecked
    pub fn elapsed(&self) -> Option<Duration> {
        self.out_time.map(|out| out - self.in_time)
    }

    /// Whether the vehicle was parked at `instant`, treating an open session
    /// as lasting until `horizon` (or excluded when `horizon` is `None`)
    pub fn covers(&self, instant: NaiveDateTime, horizon: Option<NaiveDateTime>) -> bool {
        match self.out_time.or(horizon) {
            Some(end) => self.in_time <= instant && instant <= end,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{at, plate};

    #[test]
    fn test_lifecycle() {
        let session = Session::open(plate("ABC001"), "A", at("2024-01-15 10:00:00"));
        assert!(session.is_open());
        assert_eq!(session.elapsed(), None);

        let session = session.close(at("2024-01-15 11:30:00"));
        assert!(session.is_closed());
        assert_eq!(session.elapsed(), Some(Duration::minutes(90)));
    }

    #[test]
    fn test_covers_closed_session() {
        let session = Session::closed(
            plate("ABC001"),
            "A",
            at("2024-01-15 10:00:00"),
            at("2024-01-15 12:00:00"),
        );

        assert!(session.covers(at("2024-01-15 10:00:00"), None));
        assert!(session.covers(at("2024-01-15 12:00:00"), None));
        assert!(!session.covers(at("2024-01-15 12:00:01"), None));
        assert!(!session.covers(at("2024-01-15 09:59:59"), None));
    }

    #[test]
    fn test_covers_open_session() {
        let session = Session::open(plate("ABC001"), "A", at("2024-01-15 10:00:00"));

        assert!(!session.covers(at("2024-01-15 11:00:00"), None));
        assert!(session.covers(at("2024-01-15 11:00:00"), Some(at("2024-01-15 18:00:00"))));
        assert!(!session.covers(at("2024-01-15 19:00:00"), Some(at("2024-01-15 18:00:00"))));
    }
}
