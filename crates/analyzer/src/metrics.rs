//! Latency histograms, sliding-window throughput, and per-lane utilization
//! (spec §4.10), computed over a consistency-verified
//! [`CheckResult`](crate::checker::CheckResult).

use crate::checker::CheckResult;

/// Display unit for latency histograms and the binary dump (spec §6).
/// Conversion factors and `unit_id` numbering grounded in
/// `original_source/runner/scripts/visualize.py`'s `TIME_UNITS` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Ns,
    Us,
    Ms,
    S,
}

impl TimeUnit {
    #[must_use]
    pub const fn factor(self) -> f64 {
        match self {
            Self::Ns => 1e9,
            Self::Us => 1e6,
            Self::Ms => 1e3,
            Self::S => 1.0,
        }
    }

    #[must_use]
    pub const fn unit_id(self) -> i32 {
        match self {
            Self::Ns => 0,
            Self::Us => 1,
            Self::Ms => 2,
            Self::S => 3,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ns => "ns",
            Self::Us => "us",
            Self::Ms => "ms",
            Self::S => "s",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ns" => Some(Self::Ns),
            "us" => Some(Self::Us),
            "ms" => Some(Self::Ms),
            "s" => Some(Self::S),
            _ => None,
        }
    }
}

/// One histogram bucket: its center (in the histogram's display unit), the
/// sample count it holds, and the cumulative fraction of samples at or below
/// it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBucket {
    pub center: f64,
    pub count: u32,
    pub cdf: f64,
}

/// Knobs shared by every latency histogram and throughput series the
/// aggregator produces (spec §6 CLI options).
#[derive(Debug, Clone, Copy)]
pub struct MetricsParams {
    pub num_buckets: usize,
    pub unit: TimeUnit,
    pub window_seconds: f64,
    pub slide_seconds: f64,
    /// Quantile in `(0, 1]`; `1.0` disables outlier filtering.
    pub outlier_quantile: f64,
}

/// Drop samples above `quantile` (by value), returning the retained samples
/// and the number dropped.
fn filter_outliers(mut samples: Vec<f64>, quantile: f64) -> (Vec<f64>, usize) {
    if samples.is_empty() || quantile >= 1.0 {
        return (samples, 0);
    }
    samples.sort_by(f64::total_cmp);
    let keep = ((samples.len() as f64) * quantile).ceil() as usize;
    let keep = keep.clamp(1, samples.len());
    let filtered = samples.len() - keep;
    samples.truncate(keep);
    (samples, filtered)
}

/// Build the `(center, count, cdf)` histogram for one latency series,
/// converting seconds to `params.unit` first. Returns the buckets and the
/// number of samples dropped as outliers.
#[must_use]
pub fn histogram(samples_seconds: &[f64], params: &MetricsParams) -> (Vec<HistogramBucket>, usize) {
    let converted: Vec<f64> = samples_seconds.iter().map(|&s| s * params.unit.factor()).collect();
    let (kept, filtered) = filter_outliers(converted, params.outlier_quantile);

    if kept.is_empty() || params.num_buckets == 0 {
        return (Vec::new(), filtered);
    }

    let min = kept.iter().copied().fold(f64::INFINITY, f64::min);
    let max = kept.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = (max - min).max(f64::EPSILON);
    let bucket_width = span / params.num_buckets as f64;

    let counts = bucket_counts(&kept, min, bucket_width, params.num_buckets);

    let total = kept.len() as f64;
    let mut cumulative = 0u32;
    let buckets = counts
        .iter()
        .enumerate()
        .map(|(i, &count)| {
            cumulative += count;
            HistogramBucket {
                center: min + bucket_width * (i as f64 + 0.5),
                count,
                cdf: f64::from(cumulative) / total,
            }
        })
        .collect();

    (buckets, filtered)
}

/// Count each (already unit-converted) sample into its bucket. The
/// per-bucket reduction is embarrassingly parallel -- no bucket depends on
/// another -- so the `parallel` feature fans it out over chunks of `kept`
/// and sums the partial histograms (spec §5: "metrics computation over the
/// post-validated table may be parallelized freely").
#[cfg(feature = "parallel")]
fn bucket_counts(kept: &[f64], min: f64, bucket_width: f64, num_buckets: usize) -> Vec<u32> {
    use rayon::prelude::*;
    kept.par_iter()
        .fold(
            || vec![0u32; num_buckets],
            |mut acc, &v| {
                let idx = (((v - min) / bucket_width) as usize).min(num_buckets - 1);
                acc[idx] += 1;
                acc
            },
        )
        .reduce(
            || vec![0u32; num_buckets],
            |mut a, b| {
                for (x, y) in a.iter_mut().zip(&b) {
                    *x += y;
                }
                a
            },
        )
}

#[cfg(not(feature = "parallel"))]
fn bucket_counts(kept: &[f64], min: f64, bucket_width: f64, num_buckets: usize) -> Vec<u32> {
    let mut counts = vec![0u32; num_buckets];
    for &v in kept {
        let idx = (((v - min) / bucket_width) as usize).min(num_buckets - 1);
        counts[idx] += 1;
    }
    counts
}

/// Sliding-window throughput: window start times spanning `[start, end]`,
/// stepped by `slide_seconds`. Shared across all five stages so the binary
/// dump's single `num_windows` header field applies to every series.
#[must_use]
pub fn window_starts(start: f64, end: f64, slide_seconds: f64) -> Vec<f64> {
    if slide_seconds <= 0.0 || end < start {
        return vec![start];
    }
    let mut starts = vec![start];
    let mut t = start + slide_seconds;
    while t <= end {
        starts.push(t);
        t += slide_seconds;
    }
    starts
}

/// Count of `times` falling into each `[start, start + window_seconds)`
/// window, expressed as a txn/s rate. Each window's count is independent of
/// every other window, so this is parallelized across `starts` under the
/// `parallel` feature.
#[cfg(feature = "parallel")]
#[must_use]
pub fn windowed_throughput(times: &[f64], starts: &[f64], window_seconds: f64) -> Vec<(f64, f64)> {
    use rayon::prelude::*;
    starts
        .par_iter()
        .map(|&start| {
            let count = times.iter().filter(|&&t| t >= start && t < start + window_seconds).count();
            (start, count as f64 / window_seconds)
        })
        .collect()
}

#[cfg(not(feature = "parallel"))]
#[must_use]
pub fn windowed_throughput(times: &[f64], starts: &[f64], window_seconds: f64) -> Vec<(f64, f64)> {
    starts
        .iter()
        .map(|&start| {
            let count = times.iter().filter(|&&t| t >= start && t < start + window_seconds).count();
            (start, count as f64 / window_seconds)
        })
        .collect()
}

/// `busy_time[lane] / wall_time`, as a percentage. `0.0` wall-time yields
/// `0.0` utilization rather than a division-by-zero `NaN`.
#[must_use]
pub fn lane_utilization(lane_busy_time: &[f64], wall_time: f64) -> Vec<f64> {
    lane_busy_time
        .iter()
        .map(|&busy| if wall_time > 0.0 { 100.0 * busy / wall_time } else { 0.0 })
        .collect()
}

/// `complete_txns / wall_time`; `0.0` if there is no elapsed time.
#[must_use]
pub fn average_throughput(complete_txns: usize, wall_time: f64) -> f64 {
    if wall_time > 0.0 {
        complete_txns as f64 / wall_time
    } else {
        0.0
    }
}

/// Every per-transaction latency the binary dump format names (spec §6):
/// end-to-end plus the four inter-stage gaps. A stage gap is only sampled
/// for transactions carrying both endpoint timestamps -- `recv`/`cleanup`
/// are optional, so `sched_recv`/`recv_done`/`done_cleanup` report empty
/// series when the trace never emits them (spec §9).
#[derive(Debug, Default, Clone)]
pub struct LatencySamples {
    pub e2e: Vec<f64>,
    pub submit_sched: Vec<f64>,
    pub sched_recv: Vec<f64>,
    pub recv_done: Vec<f64>,
    pub done_cleanup: Vec<f64>,
}

#[must_use]
pub fn latency_samples(result: &CheckResult) -> LatencySamples {
    let mut samples = LatencySamples::default();
    for (&id, &submit) in &result.submit_times {
        let Some(&done) = result.done_times.get(&id) else { continue };
        samples.e2e.push(done - submit);

        if let Some(&scheduled) = result.schedule_times.get(&id) {
            samples.submit_sched.push(scheduled - submit);

            if let Some(&recv) = result.recv_times.get(&id) {
                samples.sched_recv.push(recv - scheduled);
                samples.recv_done.push(done - recv);

                if let Some(&cleanup) = result.cleanup_times.get(&id) {
                    samples.done_cleanup.push(cleanup - done);
                }
            }
        }
    }
    samples
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(num_buckets: usize) -> MetricsParams {
        MetricsParams {
            num_buckets,
            unit: TimeUnit::Us,
            window_seconds: 1.0,
            slide_seconds: 1.0,
            outlier_quantile: 1.0,
        }
    }

    #[test]
    fn histogram_cdf_reaches_one_at_last_bucket() {
        let samples = vec![0.000_001, 0.000_002, 0.000_003, 0.000_004];
        let (buckets, filtered) = histogram(&samples, &params(4));
        assert_eq!(filtered, 0);
        assert!((buckets.last().unwrap().cdf - 1.0).abs() < 1e-9);
        assert_eq!(buckets.iter().map(|b| b.count).sum::<u32>(), 4);
    }

    #[test]
    fn outlier_filtering_drops_the_configured_quantile() {
        let samples: Vec<f64> = (1..=100).map(f64::from).collect();
        let mut p = params(10);
        p.outlier_quantile = 0.9;
        let (_, filtered) = histogram(&samples, &p);
        assert_eq!(filtered, 10);
    }

    #[test]
    fn empty_samples_yield_empty_histogram() {
        let (buckets, filtered) = histogram(&[], &params(10));
        assert!(buckets.is_empty());
        assert_eq!(filtered, 0);
    }

    #[test]
    fn windowed_throughput_counts_events_per_window() {
        let starts = window_starts(0.0, 2.0, 1.0);
        assert_eq!(starts, vec![0.0, 1.0, 2.0]);
        let times = vec![0.1, 0.5, 1.2, 1.9];
        let series = windowed_throughput(&times, &starts, 1.0);
        assert_eq!(series, vec![(0.0, 2.0), (1.0, 2.0), (2.0, 0.0)]);
    }

    #[test]
    fn lane_utilization_is_zero_when_wall_time_is_zero() {
        assert_eq!(lane_utilization(&[5.0, 3.0], 0.0), vec![0.0, 0.0]);
    }

    #[test]
    fn lane_utilization_is_a_percentage() {
        assert_eq!(lane_utilization(&[5.0], 10.0), vec![50.0]);
    }

    #[test]
    fn latency_samples_handles_missing_recv_and_cleanup() {
        let mut result = CheckResult::default();
        result.submit_times.insert(0, 0.0);
        result.schedule_times.insert(0, 1.0);
        result.done_times.insert(0, 3.0);
        let samples = latency_samples(&result);
        assert_eq!(samples.e2e, vec![3.0]);
        assert_eq!(samples.submit_sched, vec![1.0]);
        assert!(samples.sched_recv.is_empty());
        assert!(samples.recv_done.is_empty());
        assert!(samples.done_cleanup.is_empty());
    }
}
