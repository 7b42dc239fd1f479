use std::{fs, process};

use clap::Parser;

use contend_cli::{AlgorithmArg, AnalyzeArgs, App, Command, GenerateArgs, ScheduleArgs};
use contend_core::scheduler::compressed::CompressedScheduler;
use contend_core::scheduler::greedy::GreedyScheduler;
use contend_core::scheduler::tournament::TournamentScheduler;
use contend_core::scheduler::Scheduler;
use contend_core::set::ExactSet;
use contend_core::signature::parallel::ParallelFamily;
use contend_core::Transaction;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let app = App::parse();
    let code = match &app.command {
        Command::Analyze(args) => analyze(args),
        Command::Schedule(args) => schedule(args),
        Command::Generate(args) => generate(args),
    };
    process::exit(code);
}

/// `contend analyze <transactions.csv> <log.txt> <num_lanes>` (spec §6).
fn analyze(args: &AnalyzeArgs) -> i32 {
    let transactions_path = args.transactions.display().to_string();
    let log_path = args.log.display().to_string();

    let csv_text = match fs::read_to_string(&args.transactions) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("failed to read {transactions_path}: {e}");
            return 1;
        }
    };
    let log_text = match fs::read_to_string(&args.log) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("failed to read {log_path}: {e}");
            return 1;
        }
    };

    let raw_txns = match contend_parser::csv::parse_csv(&transactions_path, &csv_text) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("{e}");
            return 1;
        }
    };
    let events = match contend_parser::event_log::parse_event_log(&log_path, &log_text) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("{e}");
            return 1;
        }
    };

    let txn_map: hashbrown::HashMap<u64, Transaction<ExactSet>> =
        raw_txns.iter().map(|r| (r.id, r.into_transaction())).collect();

    tracing::info!(
        total_txns = raw_txns.len(),
        num_events = events.len(),
        "checking consistency"
    );

    let result = match contend_analyzer::check_consistency(&txn_map, &events, args.num_lanes) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("{e}");
            return 1;
        }
    };

    let unit: contend_analyzer::TimeUnit = args.unit.into();
    let params = contend_analyzer::MetricsParams {
        num_buckets: args.num_buckets,
        unit,
        window_seconds: args.window_seconds,
        slide_seconds: args.slide_seconds.unwrap_or(args.window_seconds),
        outlier_quantile: args.outlier_quantile,
    };

    let report = contend_analyzer::Report::build(raw_txns.len(), &result, args.num_lanes as usize, params);

    if args.json {
        let value = serde_json::json!({
            "total_txns": report.total_txns,
            "complete_txns": report.complete_txns,
            "num_lanes": report.num_lanes,
            "average_throughput": report.average_throughput,
            "lane_utilization_pct": report.lane_util_pct,
            "filtered": report.filtered_count(),
        });
        println!("{}", serde_json::to_string_pretty(&value).expect("fixed-shape value always serializes"));
    } else {
        print!("{}", report.human_summary());
    }

    if args.csv_blocks {
        print!("{}", report.csv_blocks());
    }

    if let Some(dump_path) = &args.dump {
        let bytes = contend_analyzer::write_dump(&report, args.cpu_freq);
        if let Err(e) = fs::write(dump_path, bytes) {
            eprintln!("failed to write dump to {}: {e}", dump_path.display());
            return 1;
        }
    }

    0
}

/// `contend schedule <transactions.csv> [--algorithm ...] [--compress ...]`.
/// Not part of spec.md's external interfaces, but the front door to the
/// scheduler core (SPEC_FULL §6).
fn schedule(args: &ScheduleArgs) -> i32 {
    let path_str = args.transactions.display().to_string();
    let csv_text = match fs::read_to_string(&args.transactions) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("failed to read {path_str}: {e}");
            return 1;
        }
    };
    let raw_txns = match contend_parser::csv::parse_csv(&path_str, &csv_text) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("{e}");
            return 1;
        }
    };
    let total = raw_txns.len();
    let txns: Vec<Transaction<ExactSet>> = raw_txns.iter().map(|r| r.into_transaction()).collect();

    tracing::info!(total, algorithm = ?args.algorithm, compressed = args.compress, "scheduling batch");

    let chosen = if args.compress {
        let family = ParallelFamily::new(args.signature_bits, args.hashes, args.seed);
        match args.algorithm {
            AlgorithmArg::Greedy => CompressedScheduler::new(GreedyScheduler, family).schedule(txns),
            AlgorithmArg::Tournament => CompressedScheduler::new(TournamentScheduler, family).schedule(txns),
        }
    } else {
        match args.algorithm {
            AlgorithmArg::Greedy => GreedyScheduler.schedule(txns),
            AlgorithmArg::Tournament => TournamentScheduler.schedule(txns),
        }
    };

    let chosen = match chosen {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}");
            return 1;
        }
    };

    for txn in &chosen {
        for &id in &txn.ids {
            println!("{id}");
        }
    }
    eprintln!("{}/{total} transactions chosen", chosen.len());

    0
}

/// `contend generate --n-txn ... --output ...` (the Zipf-weighted workload
/// generator, spec.md §6's "test collaborator").
fn generate(args: &GenerateArgs) -> i32 {
    let params = contend_testgen::WorkloadParams::builder()
        .n_txn(args.n_txn)
        .n_objs(args.n_objs)
        .elems_per_txn(args.elems_per_txn)
        .zipf_alpha(args.zipf_alpha)
        .write_probability(args.write_probability)
        .seed(args.seed)
        .build();

    tracing::info!(n_txn = args.n_txn, n_objs = args.n_objs, seed = args.seed, "generating workload");

    let csv = contend_testgen::generate_csv(&params);
    if let Err(e) = fs::write(&args.output, csv) {
        eprintln!("failed to write {}: {e}", args.output.display());
        return 1;
    }

    println!("generated {} transactions to {}", args.n_txn, args.output.display());
    0
}
