//! Full pipeline: CSV transactions + event log text -> parse -> consistency
//! check -> report -> binary dump, mirroring what the `analyze` subcommand
//! does end to end (spec §6, §8 scenarios S5/S6).

use contend_analyzer::{check_consistency, write_dump, MetricsParams, Report, TimeUnit};
use contend_core::set::ExactSet;
use contend_core::transaction::Transaction;
use contend_parser::csv::parse_csv;
use contend_parser::event_log::parse_event_log;

fn default_params() -> MetricsParams {
    MetricsParams {
        num_buckets: 8,
        unit: TimeUnit::Us,
        window_seconds: 1.0,
        slide_seconds: 1.0,
        outlier_quantile: 1.0,
    }
}

#[test]
fn two_disjoint_transactions_pass_consistency_and_produce_a_dumpable_report() {
    let csv_text = "0, 1, 1\n0, 2, 1\n";
    let log_text = "\
[+0.0] submit txn id=0
[+0.0] submit txn id=1
[+1.0] scheduled txn id=0 assigned to puppet 0
[+1.0] scheduled txn id=1 assigned to puppet 1
[+2.0] done puppet 0 finished txn id=0
[+3.0] done puppet 1 finished txn id=1
";

    let raw = parse_csv("txns.csv", csv_text).unwrap();
    let events = parse_event_log("log.txt", log_text).unwrap();

    let txn_map: hashbrown::HashMap<u64, Transaction<ExactSet>> =
        raw.iter().map(|r| (r.id, r.into_transaction())).collect();

    let result = check_consistency(&txn_map, &events, 2).unwrap();
    assert_eq!(result.lane_busy_time, vec![1.0, 2.0]);

    let report = Report::build(raw.len(), &result, 2, default_params());
    assert_eq!(report.complete_txns, 2);
    assert!(report.human_summary().contains("consistency checks passed"));

    let dump = write_dump(&report, 3.0e9);
    assert!(!dump.is_empty());
    assert_eq!(i32::from_le_bytes(dump[0..4].try_into().unwrap()), 2); // total_txns
}

#[test]
fn concurrent_writers_to_the_same_object_surface_as_a_conflict_error() {
    let csv_text = "0, 9, 1\n0, 9, 1\n";
    let log_text = "\
[+0.0] submit txn id=0
[+0.0] submit txn id=1
[+1.0] scheduled txn id=0 assigned to puppet 0
[+1.0] scheduled txn id=1 assigned to puppet 1
";

    let raw = parse_csv("txns.csv", csv_text).unwrap();
    let events = parse_event_log("log.txt", log_text).unwrap();
    let txn_map: hashbrown::HashMap<u64, Transaction<ExactSet>> =
        raw.iter().map(|r| (r.id, r.into_transaction())).collect();

    let err = check_consistency(&txn_map, &events, 2).unwrap_err();
    assert_eq!(err.to_string(), "Conflict detected when scheduling txn 1");
}

#[test]
fn simulator_noise_lines_are_tolerated_in_a_real_looking_log() {
    let csv_text = "0, 1, 1\n";
    let log_text = "\
xsim vXXXX startup banner
[+0.0] submit txn id=0
some veril license notice
[+1.0] scheduled txn id=0 assigned to puppet 0
[+2.0] done puppet 0 finished txn id=0
";

    let raw = parse_csv("txns.csv", csv_text).unwrap();
    let events = parse_event_log("log.txt", log_text).unwrap();
    assert_eq!(events.len(), 3);

    let txn_map: hashbrown::HashMap<u64, Transaction<ExactSet>> =
        raw.iter().map(|r| (r.id, r.into_transaction())).collect();
    let result = check_consistency(&txn_map, &events, 1).unwrap();
    assert_eq!(result.done_times.len(), 1);
}
