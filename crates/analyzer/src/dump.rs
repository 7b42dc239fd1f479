//! Binary dump writer (spec §6 "Binary dump format"): the exact
//! little-endian record layout visualization consumers expect. Hand-rolled
//! `to_le_bytes` writes, since the layout is fixed and non-evolving (no
//! external binary-serialization crate earns its keep here).

use crate::metrics::TimeUnit;
use crate::report::{Report, LATENCY_KINDS};

/// Serialize `report` into the spec §6 binary layout.
///
/// `cpu_freq` is carried through as opaque metadata for downstream
/// visualization consumers; the analyzer itself never converts wall-clock to
/// cycles, since every timestamp it handles is already real seconds.
#[must_use]
pub fn write_dump(report: &Report, cpu_freq: f64) -> Vec<u8> {
    let mut buf = Vec::new();

    buf.extend_from_slice(&(report.total_txns as i32).to_le_bytes());
    buf.extend_from_slice(&(report.complete_txns as i32).to_le_bytes());
    buf.extend_from_slice(&(report.filtered_count() as i32).to_le_bytes());
    buf.extend_from_slice(&(report.params.num_buckets as i32).to_le_bytes());
    buf.extend_from_slice(&cpu_freq.to_le_bytes());
    buf.extend_from_slice(&(report.num_lanes as i32).to_le_bytes());
    buf.extend_from_slice(&report.average_throughput.to_le_bytes());
    buf.extend_from_slice(&(report.window_starts.len() as i32).to_le_bytes());
    buf.extend_from_slice(&report.params.window_seconds.to_le_bytes());

    for series in &report.stage_throughput {
        for &(time, throughput) in series {
            buf.extend_from_slice(&time.to_le_bytes());
            buf.extend_from_slice(&throughput.to_le_bytes());
        }
    }

    for _ in LATENCY_KINDS {
        buf.extend_from_slice(&TimeUnit::unit_id(report.params.unit).to_le_bytes());
    }

    for (buckets, _) in &report.latency_histograms {
        for bucket in buckets {
            buf.extend_from_slice(&bucket.center.to_le_bytes());
            buf.extend_from_slice(&(bucket.count as i32).to_le_bytes());
            buf.extend_from_slice(&bucket.cdf.to_le_bytes());
        }
        // Histograms over fewer samples than `num_buckets` pad with zeroed
        // triples so every latency kind's section has the declared width.
        for _ in buckets.len()..report.params.num_buckets {
            buf.extend_from_slice(&0.0f64.to_le_bytes());
            buf.extend_from_slice(&0i32.to_le_bytes());
            buf.extend_from_slice(&0.0f64.to_le_bytes());
        }
    }

    buf
}
