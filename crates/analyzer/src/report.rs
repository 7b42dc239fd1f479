//! Human-readable summary and CSV sub-block rendering (spec §6), written to
//! stdout by the `analyze` CLI. Column names grounded in
//! `original_source/runner/scripts/plot_analysis.py`.

use std::fmt::Write as _;

use crate::checker::CheckResult;
use crate::metrics::{self, HistogramBucket, MetricsParams, TimeUnit};

pub const STAGES: [&str; 5] = ["submit", "sched", "recv", "done", "cleanup"];
pub const LATENCY_KINDS: [&str; 5] = ["e2e", "submit_sched", "sched_recv", "recv_done", "done_cleanup"];

/// Everything the report needs, computed once by `analyze` and shared
/// between the human-readable summary, the CSV sub-blocks, and the binary
/// dump.
pub struct Report {
    pub total_txns: usize,
    pub complete_txns: usize,
    pub num_lanes: usize,
    pub params: MetricsParams,
    pub window_starts: Vec<f64>,
    pub stage_throughput: [Vec<(f64, f64)>; 5],
    pub lane_util_pct: Vec<f64>,
    pub average_throughput: f64,
    /// `(buckets, filtered)` per latency kind, in [`LATENCY_KINDS`] order.
    pub latency_histograms: [(Vec<HistogramBucket>, usize); 5],
}

impl Report {
    #[must_use]
    pub fn build(total_txns: usize, result: &CheckResult, num_lanes: usize, params: MetricsParams) -> Self {
        let wall_time = match (result.first_submit_time, result.last_done_time) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        };

        let stage_times = [
            result.submit_times.values().copied().collect::<Vec<_>>(),
            result.schedule_times.values().copied().collect::<Vec<_>>(),
            result.recv_times.values().copied().collect::<Vec<_>>(),
            result.done_times.values().copied().collect::<Vec<_>>(),
            result.cleanup_times.values().copied().collect::<Vec<_>>(),
        ];
        let all_times: Vec<f64> = stage_times.iter().flatten().copied().collect();
        let start = all_times.iter().copied().fold(f64::INFINITY, f64::min);
        let end = all_times.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let (start, end) = if all_times.is_empty() { (0.0, 0.0) } else { (start, end) };

        let window_starts = metrics::window_starts(start, end, params.slide_seconds);
        let stage_throughput = stage_times
            .map(|times| metrics::windowed_throughput(&times, &window_starts, params.window_seconds));

        let latencies = metrics::latency_samples(result);
        let latency_series: [&[f64]; 5] = [
            &latencies.e2e,
            &latencies.submit_sched,
            &latencies.sched_recv,
            &latencies.recv_done,
            &latencies.done_cleanup,
        ];
        let latency_histograms = latency_series.map(|series| metrics::histogram(series, &params));

        Self {
            total_txns,
            complete_txns: result.done_times.len(),
            num_lanes,
            params,
            window_starts,
            stage_throughput,
            lane_util_pct: metrics::lane_utilization(&result.lane_busy_time, wall_time),
            average_throughput: metrics::average_throughput(result.done_times.len(), wall_time),
            latency_histograms,
        }
    }

    /// The `filtered` count reported to the binary dump header: outliers
    /// dropped from the end-to-end latency histogram, spec §6's single
    /// `filtered` field.
    #[must_use]
    pub fn filtered_count(&self) -> usize {
        self.latency_histograms[0].1
    }

    #[must_use]
    pub fn human_summary(&self) -> String {
        let mut out = String::new();
        writeln!(out, "consistency checks passed").unwrap();
        writeln!(out, "total transactions: {}", self.total_txns).unwrap();
        writeln!(out, "complete transactions: {}", self.complete_txns).unwrap();
        writeln!(out, "average throughput: {:.2} txn/s", self.average_throughput).unwrap();
        writeln!(out, "lane utilization:").unwrap();
        for (lane, util) in self.lane_util_pct.iter().enumerate() {
            writeln!(out, "  lane {lane}: {util:.2}%").unwrap();
        }
        out
    }

    /// Render the optional `# LATENCY_CDF`, `# THROUGHPUT_TS <stage>`,
    /// `# PUPPET_UTIL`, and `# LATENCY_HIST <kind>` CSV sub-blocks (spec §6).
    #[must_use]
    pub fn csv_blocks(&self) -> String {
        let mut out = String::new();

        writeln!(out, "# LATENCY_CDF").unwrap();
        writeln!(out, "lat_us,cdf_pct").unwrap();
        let (e2e_buckets, _) = &self.latency_histograms[0];
        let us_factor = TimeUnit::Us.factor() / self.params.unit.factor();
        for bucket in e2e_buckets {
            writeln!(out, "{},{}", bucket.center * us_factor, bucket.cdf * 100.0).unwrap();
        }

        for (stage, series) in STAGES.iter().zip(&self.stage_throughput) {
            writeln!(out, "# THROUGHPUT_TS {stage} slide_ms={}", self.params.slide_seconds * 1000.0).unwrap();
            writeln!(out, "time_ms,thr_txn_per_s").unwrap();
            for &(time, rate) in series {
                writeln!(out, "{},{}", time * 1000.0, rate).unwrap();
            }
        }

        writeln!(out, "# PUPPET_UTIL").unwrap();
        writeln!(out, "lane_id,util_pct").unwrap();
        for (lane, util) in self.lane_util_pct.iter().enumerate() {
            writeln!(out, "{lane},{util}").unwrap();
        }

        for (kind, (buckets, _)) in LATENCY_KINDS.iter().zip(&self.latency_histograms) {
            writeln!(out, "# LATENCY_HIST {kind}").unwrap();
            writeln!(out, "# unit={}", self.params.unit.label()).unwrap();
            writeln!(out, "center,count,cdf").unwrap();
            for bucket in buckets {
                writeln!(out, "{},{},{}", bucket.center, bucket.count, bucket.cdf).unwrap();
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_blocks_contain_all_required_headers() {
        let result = CheckResult {
            lane_busy_time: vec![1.0],
            first_submit_time: Some(0.0),
            last_done_time: Some(2.0),
            ..CheckResult::default()
        };
        let params = MetricsParams {
            num_buckets: 4,
            unit: TimeUnit::Us,
            window_seconds: 1.0,
            slide_seconds: 1.0,
            outlier_quantile: 1.0,
        };
        let report = Report::build(0, &result, 1, params);
        let blocks = report.csv_blocks();
        assert!(blocks.contains("# LATENCY_CDF"));
        assert!(blocks.contains("lat_us,cdf_pct"));
        assert!(blocks.contains("# THROUGHPUT_TS submit"));
        assert!(blocks.contains("# PUPPET_UTIL"));
        assert!(blocks.contains("lane_id,util_pct"));
        assert!(blocks.contains("# LATENCY_HIST e2e"));
        assert!(blocks.contains("# unit=us"));
    }

    #[test]
    fn empty_recv_and_cleanup_report_as_empty_histograms_not_errors() {
        let result = CheckResult { first_submit_time: Some(0.0), last_done_time: Some(1.0), ..CheckResult::default() };
        let params = MetricsParams {
            num_buckets: 4,
            unit: TimeUnit::Us,
            window_seconds: 1.0,
            slide_seconds: 1.0,
            outlier_quantile: 1.0,
        };
        let report = Report::build(0, &result, 1, params);
        assert!(report.latency_histograms[2].0.is_empty()); // sched_recv
        assert!(report.latency_histograms[4].0.is_empty()); // done_cleanup
    }
}
