//! Point-in-time lot occupancy

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{LotId, Session};

/// How sessions without an exit are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenSessionPolicy {
    /// Ignore open sessions
    Exclude,
    /// Treat open sessions as lasting until the given instant
    Until(NaiveDateTime),
}

impl OpenSessionPolicy {
    /// Treat open sessions as lasting until the current local time
    pub fn now() -> Self {
        OpenSessionPolicy::Until(chrono::Local::now().naive_local())
    }

    fn horizon(&self) -> Option<NaiveDateTime> {
        match self {
            OpenSessionPolicy::Exclude => None,
            OpenSessionPolicy::Until(until) => Some(*until),
        }
    }
}

/// Occupancy of one lot at an instant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotOccupancy {
    /// The single representative occupant: latest entry, then greatest plate
    pub occupant: Session,
    /// Every session covering the instant, ordered by entry time then plate
    pub present: Vec<Session>,
}

/// Which sessions cover `instant`, per lot
///
/// Bounds are inclusive: a vehicle is present at its entry and exit
/// instants. Lots with nobody present are absent from the result.
pub fn occupancy_at(
    sessions: &[Session],
    instant: NaiveDateTime,
    policy: OpenSessionPolicy,
) -> BTreeMap<LotId, LotOccupancy> {
    let horizon = policy.horizon();
    let mut by_lot: BTreeMap<LotId, Vec<Session>> = BTreeMap::new();

    for session in sessions.iter().filter(|s| s.covers(instant, horizon)) {
        by_lot
            .entry(session.lot.clone())
            .or_default()
            .push(session.clone());
    }

    by_lot
        .into_iter()
        .filter_map(|(lot, mut present)| {
            present.sort_by(|a, b| {
                a.in_time
                    .cmp(&b.in_time)
                    .then_with(|| a.plate.cmp(&b.plate))
            });
            let occupant = present.last()?.clone();
            Some((lot, LotOccupancy { occupant, present }))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{at, closed, open, plate};

    #[test]
    fn test_occupancy_inclusive_bounds() {
        let sessions = vec![closed("ABC001", "A", "2024-01-15 10:00:00", "2024-01-15 12:00:00")];

        for instant in ["2024-01-15 10:00:00", "2024-01-15 11:00:00", "2024-01-15 12:00:00"] {
            let occupancy = occupancy_at(&sessions, at(instant), OpenSessionPolicy::Exclude);
            assert_eq!(occupancy["A"].occupant.plate, plate("ABC001"));
        }

        let after = occupancy_at(&sessions, at("2024-01-15 12:00:01"), OpenSessionPolicy::Exclude);
        assert!(after.is_empty());
    }

    #[test]
    fn test_occupant_is_latest_entry_then_greatest_plate() {
        let sessions = vec![
            closed("ABC001", "A", "2024-01-15 09:00:00", "2024-01-15 12:00:00"),
            closed("ABC003", "A", "2024-01-15 10:00:00", "2024-01-15 12:00:00"),
            closed("ABC002", "A", "2024-01-15 10:00:00", "2024-01-15 12:00:00"),
            closed("XYZ999", "B", "2024-01-15 08:00:00", "2024-01-15 09:00:00"),
        ];

        let occupancy = occupancy_at(&sessions, at("2024-01-15 11:00:00"), OpenSessionPolicy::Exclude);

        let lot_a = &occupancy["A"];
        assert_eq!(lot_a.occupant.plate, plate("ABC003"));
        assert_eq!(lot_a.present.len(), 3);
        assert_eq!(lot_a.present[0].plate, plate("ABC001"));
        assert!(!occupancy.contains_key("B"));
    }

    #[test]
    fn test_open_session_policy() {
        let sessions = vec![open("ABC001", "A", "2024-01-15 10:00:00")];
        let instant = at("2024-01-15 11:00:00");

        assert!(occupancy_at(&sessions, instant, OpenSessionPolicy::Exclude).is_empty());

        let until = OpenSessionPolicy::Until(at("2024-01-15 18:00:00"));
        assert_eq!(occupancy_at(&sessions, instant, until).len(), 1);

        let past = OpenSessionPolicy::Until(at("2024-01-15 10:30:00"));
        assert!(occupancy_at(&sessions, instant, past).is_empty());
    }
}
