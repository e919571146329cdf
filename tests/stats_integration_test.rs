//! Integration tests for LotLedger statistics
//!
//! These tests run a batch and query the resulting sessions the way a
//! reporting layer would.

use chrono::{Duration, NaiveDate};
use lotledger::models::parse_timestamp;
use lotledger::stats::{
    average_duration_by_lot, format_duration, hourly_histogram, occupancy_at, peak_hour,
    sessions_for_plate, DurationSummary, OpenSessionPolicy,
};
use lotledger::{run_batch, CapacityLedger, Plate, ReconcileOptions, Roster, RunReport, Session};

fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
    data.iter()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect()
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
}

fn sample_report() -> RunReport {
    let roster = Roster::load(rows(&[
        &["KA01AB1234", "A"],
        &["MH12DE4321", "A"],
        &["DL3CAB1111", "B"],
        &["TN09XY0001", "C"],
    ]))
    .unwrap();
    let ledger = CapacityLedger::new([("A", 5), ("B", 5), ("C", 5), ("D", 5)]).unwrap();

    let events = rows(&[
        &["KA01AB1234", "2024-01-15 08:00:00", "2024-01-15 10:00:00"],
        &["MH12DE4321", "2024-01-15 08:30:00", "2024-01-15 12:30:00"],
        &["DL3CAB1111", "2024-01-15 09:00:00", "2024-01-15 10:30:00"],
        &["KA01AB1234", "2024-01-15 14:00:00", "2024-01-15 15:00:00"],
        &["TN09XY0001", "2024-01-15 16:00:00"],
    ]);

    run_batch(roster, ledger, events, ReconcileOptions::default()).unwrap()
}

fn all_sessions(report: &RunReport) -> Vec<Session> {
    report
        .closed_sessions
        .iter()
        .chain(report.incomplete_sessions.iter())
        .cloned()
        .collect()
}

#[test]
fn test_average_duration_over_run() {
    let report = sample_report();
    let lots: Vec<String> = report.ledger_snapshot.keys().cloned().collect();

    let averages = average_duration_by_lot(&all_sessions(&report), &lots).unwrap();

    assert_eq!(averages["A"], Some((2.0 + 4.0 + 1.0) / 3.0));
    assert_eq!(averages["B"], Some(1.5));
    assert_eq!(averages["C"], None);
    assert_eq!(averages["D"], None);
}

#[test]
fn test_duration_summary_over_run() {
    let report = sample_report();
    let summary = DurationSummary::from_sessions(&report.closed_sessions).unwrap();

    assert_eq!(summary.count, 4);
    assert_eq!(summary.min_hours, Some(1.0));
    assert_eq!(summary.max_hours, Some(4.0));
}

#[test]
fn test_histogram_and_peak_hour() {
    let report = sample_report();
    let sessions = all_sessions(&report);

    let histogram = hourly_histogram(&sessions, day());
    assert_eq!(histogram.count(8), 2);
    assert_eq!(histogram.count(16), 1);
    assert_eq!(histogram.total(), 5);
    assert_eq!(peak_hour(&sessions, day()), Some(8));

    let other_day = NaiveDate::from_ymd_opt(2024, 1, 16).unwrap();
    assert_eq!(hourly_histogram(&sessions, other_day).total(), 0);
    assert_eq!(peak_hour(&sessions, other_day), None);
}

#[test]
fn test_occupancy_during_run() {
    let report = sample_report();
    let sessions = all_sessions(&report);
    let instant = parse_timestamp("2024-01-15 09:45:00").unwrap();

    let occupancy = occupancy_at(&sessions, instant, OpenSessionPolicy::Exclude);
    assert_eq!(occupancy["A"].present.len(), 2);
    assert_eq!(occupancy["A"].occupant.plate.as_str(), "MH12DE4321");
    assert_eq!(occupancy["B"].occupant.plate.as_str(), "DL3CAB1111");
    assert!(!occupancy.contains_key("C"));

    let evening = parse_timestamp("2024-01-15 18:00:00").unwrap();
    let until = OpenSessionPolicy::Until(parse_timestamp("2024-01-15 23:59:59").unwrap());
    let occupancy = occupancy_at(&sessions, evening, until);
    assert_eq!(occupancy.len(), 1);
    assert_eq!(occupancy["C"].occupant.plate.as_str(), "TN09XY0001");
}

#[test]
fn test_plate_history() {
    let report = sample_report();
    let plate = Plate::parse("KA01AB1234").unwrap();

    let history = sessions_for_plate(&report.closed_sessions, &plate, Some(day()));
    assert_eq!(history.len(), 2);
    assert!(history[0].in_time < history[1].in_time);

    let total = history
        .iter()
        .filter_map(|session| session.elapsed())
        .fold(Duration::zero(), |acc, d| acc + d);
    assert_eq!(format_duration(total), "0 days 3 hours 0 minutes");
}
