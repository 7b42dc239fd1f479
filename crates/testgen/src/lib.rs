//! Synthetic workload generation for exercising the scheduler core and the
//! analyzer's event-log pipeline end to end.

pub mod generator;

pub use generator::{generate_csv, generate_workload, WorkloadParams};
