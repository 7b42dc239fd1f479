//! Event-log consistency checker and telemetry pipeline (spec §4.9, §4.10,
//! §4.11): replay a transaction set against an event log, enforce the
//! submit/scheduled/done lifecycle and the no-overlap-conflict invariant,
//! then compute latency/throughput/utilization metrics over the verified
//! trace.

pub mod checker;
pub mod dump;
pub mod metrics;
pub mod report;

pub use checker::{check_consistency, CheckResult, Error};
pub use dump::write_dump;
pub use metrics::{MetricsParams, TimeUnit};
pub use report::Report;
