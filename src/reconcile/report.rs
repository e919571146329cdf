//! Run report handed to the presentation layer

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::models::{LotId, Session};

use super::{Rejection, RejectionKind};

/// Outcome of one reconciliation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Identifier of the run, also attached to its log span
    pub run_id: Uuid,

    /// Sessions with both entry and exit, in closing order
    pub closed_sessions: Vec<Session>,

    /// Sessions still open when the run finished (empty when the run was
    /// configured not to emit them)
    pub incomplete_sessions: Vec<Session>,

    /// Rejection counts for every category, including zeroes
    pub rejections: BTreeMap<RejectionKind, usize>,

    /// Every rejection in processing order
    pub rejection_log: Vec<Rejection>,

    /// Available slots per lot at the end of the run
    pub ledger_snapshot: BTreeMap<LotId, u32>,
}

impl RunReport {
    /// Count rejections per category over a log
    pub fn count_rejections(log: &[Rejection]) -> BTreeMap<RejectionKind, usize> {
        let mut counts: BTreeMap<RejectionKind, usize> =
            RejectionKind::ALL.iter().map(|kind| (*kind, 0)).collect();
        for rejection in log {
            *counts.entry(rejection.kind).or_insert(0) += 1;
        }
        counts
    }

    /// Number of rejections in one category
    pub fn rejection_count(&self, kind: RejectionKind) -> usize {
        self.rejections.get(&kind).copied().unwrap_or(0)
    }

    /// Number of rejections across all categories
    pub fn total_rejections(&self) -> usize {
        self.rejections.values().sum()
    }

    /// Available slots for a lot at the end of the run
    pub fn available(&self, lot: &str) -> Option<u32> {
        self.ledger_snapshot.get(lot).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(log: Vec<Rejection>) -> RunReport {
        RunReport {
            run_id: Uuid::new_v4(),
            closed_sessions: Vec::new(),
            incomplete_sessions: Vec::new(),
            rejections: RunReport::count_rejections(&log),
            rejection_log: log,
            ledger_snapshot: BTreeMap::from([("A".to_string(), 3)]),
        }
    }

    #[test]
    fn test_counts_include_every_category() {
        let report = report(vec![
            Rejection::new(RejectionKind::UnauthorizedPlate, "ZZ999", None, "not on roster"),
            Rejection::new(RejectionKind::UnauthorizedPlate, "ZZ998", None, "not on roster"),
            Rejection::new(RejectionKind::OrphanExit, "AB123", None, "no open session"),
        ]);

        assert_eq!(report.rejections.len(), RejectionKind::ALL.len());
        assert_eq!(report.rejection_count(RejectionKind::UnauthorizedPlate), 2);
        assert_eq!(report.rejection_count(RejectionKind::OrphanExit), 1);
        assert_eq!(report.rejection_count(RejectionKind::CapacityExceeded), 0);
        assert_eq!(report.total_rejections(), 3);
    }

    #[test]
    fn test_json_shape() {
        let report = report(Vec::new());
        let json = serde_json::to_value(&report).unwrap();

        assert!(json["run_id"].is_string());
        assert_eq!(json["rejections"]["capacity-exceeded"], 0);
        assert_eq!(json["ledger_snapshot"]["A"], 3);
        assert_eq!(report.available("A"), Some(3));
        assert_eq!(report.available("B"), None);
    }
}
