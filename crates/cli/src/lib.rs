//! contend CLI -- schedule transaction batches, generate synthetic
//! workloads, and analyze an executor's event log against its ground-truth
//! transaction file.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "contend", about = "Conflict-aware transaction scheduler and telemetry analyzer")]
pub struct App {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Replay an event log against a transactions file, check every
    /// lifecycle/conflict invariant, and report latency/throughput/
    /// utilization metrics.
    Analyze(AnalyzeArgs),
    /// Run the greedy or tournament scheduler over a transactions file and
    /// print the chosen subset.
    Schedule(ScheduleArgs),
    /// Generate a Zipf-weighted synthetic transactions file.
    Generate(GenerateArgs),
}

#[derive(Debug, Parser)]
pub struct AnalyzeArgs {
    /// Ground-truth transactions CSV file.
    pub transactions: PathBuf,
    /// Timestamped event-log trace from the downstream executor.
    pub log: PathBuf,
    /// Number of execution lanes ("puppets") the log schedules onto.
    pub num_lanes: u64,

    /// Number of histogram buckets for each latency series.
    #[arg(long, default_value_t = 64)]
    pub num_buckets: usize,
    /// Display unit for latency histograms and the binary dump.
    #[arg(long, value_enum, default_value_t = UnitArg::Us)]
    pub unit: UnitArg,
    /// Sliding-window width, in seconds, for throughput series.
    #[arg(long, default_value_t = 1.0)]
    pub window_seconds: f64,
    /// Sliding-window slide, in seconds; defaults to the window width
    /// (non-overlapping windows).
    #[arg(long)]
    pub slide_seconds: Option<f64>,
    /// Drop latency samples above this quantile before histogramming.
    /// `1.0` (the default) disables outlier filtering.
    #[arg(long, default_value_t = 1.0)]
    pub outlier_quantile: f64,
    /// Write the binary dump format (spec §6) to this path.
    #[arg(long)]
    pub dump: Option<PathBuf>,
    /// Opaque CPU-frequency metadata carried through to the binary dump for
    /// downstream visualization consumers.
    #[arg(long, default_value_t = 1.0)]
    pub cpu_freq: f64,
    /// Emit the summary as a JSON object instead of the human-readable block.
    #[arg(long)]
    pub json: bool,
    /// Also print the `# LATENCY_CDF` / `# THROUGHPUT_TS` / `# PUPPET_UTIL` /
    /// `# LATENCY_HIST` CSV sub-blocks to stdout.
    #[arg(long)]
    pub csv_blocks: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum UnitArg {
    Ns,
    Us,
    Ms,
    S,
}

impl std::fmt::Display for UnitArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Ns => "ns",
            Self::Us => "us",
            Self::Ms => "ms",
            Self::S => "s",
        };
        write!(f, "{label}")
    }
}

impl From<UnitArg> for contend_analyzer::TimeUnit {
    fn from(unit: UnitArg) -> Self {
        match unit {
            UnitArg::Ns => Self::Ns,
            UnitArg::Us => Self::Us,
            UnitArg::Ms => Self::Ms,
            UnitArg::S => Self::S,
        }
    }
}

#[derive(Debug, Parser)]
pub struct ScheduleArgs {
    /// Transactions CSV file to schedule.
    pub transactions: PathBuf,

    /// Which scheduling algorithm to run.
    #[arg(long, value_enum, default_value_t = AlgorithmArg::Greedy)]
    pub algorithm: AlgorithmArg,
    /// Run the chosen algorithm over signature-compressed sets instead of
    /// exact sets.
    #[arg(long)]
    pub compress: bool,
    /// Signature length in bits, when `--compress` is set.
    #[arg(long, default_value_t = 1024)]
    pub signature_bits: usize,
    /// Number of hash-function partitions, when `--compress` is set.
    #[arg(long, default_value_t = 4)]
    pub hashes: usize,
    /// Deterministic seed for the signature hash family.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum AlgorithmArg {
    Greedy,
    Tournament,
}

impl std::fmt::Display for AlgorithmArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Greedy => "greedy",
            Self::Tournament => "tournament",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, Parser)]
pub struct GenerateArgs {
    /// Number of transactions to generate.
    #[arg(long)]
    pub n_txn: u64,
    /// Size of the object id space.
    #[arg(long)]
    pub n_objs: u64,
    /// Distinct objects touched by each transaction.
    #[arg(long)]
    pub elems_per_txn: u64,
    /// Zipf skew exponent (`0.0` is uniform).
    #[arg(long)]
    pub zipf_alpha: f64,
    /// Probability that a touched object is a write rather than a read.
    #[arg(long)]
    pub write_probability: f64,
    /// Deterministic PRNG seed.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
    /// Output path for the generated transactions CSV.
    #[arg(long)]
    pub output: PathBuf,
}
