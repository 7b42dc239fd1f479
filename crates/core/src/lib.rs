//! Conflict-aware batch scheduling over transactions with read/write sets.
//!
//! `contend_core` decides, for a batch of transactions each carrying a
//! read-set and write-set over object identifiers, which transactions can run
//! concurrently without read-write or write-write conflicts.
//!
//! # Layers
//!
//! - [`set`] -- the [`Set`](set::Set) capability: a single interface shared by
//!   exact sets and approximate (Bloom-style) signatures.
//! - [`signature`] -- fixed-width bit-vector sets with a configurable false
//!   positive rate, and their partitioned ("parallel") variant.
//! - [`transaction`] -- the [`Transaction`](transaction::Transaction) type and
//!   its `compatible`/`merge` operations, generic over any [`Set`](set::Set).
//! - [`scheduler`] -- the greedy and tournament batch schedulers, and the
//!   compressed-scheduler wrapper that runs either one over signatures instead
//!   of exact sets.
//!
//! # Determinism
//!
//! Every hash family is constructed from an explicit `u64` seed. Two runs
//! with equal seeds and equal inputs produce bit-identical schedules.
//!
//! ```
//! use contend_core::scheduler::{greedy::GreedyScheduler, Scheduler};
//! use contend_core::set::ExactSet;
//! use contend_core::transaction::Transaction;
//!
//! let t0 = Transaction::singleton(0, ExactSet::from_iter([1]), ExactSet::from_iter([2]));
//! let t1 = Transaction::singleton(1, ExactSet::from_iter([3]), ExactSet::from_iter([4]));
//!
//! let chosen = GreedyScheduler.schedule(vec![t0, t1]).unwrap();
//! assert_eq!(chosen.len(), 2);
//! ```

pub mod error;
pub mod scheduler;
pub mod set;
pub mod signature;
pub mod transaction;

pub use error::Error;
pub use set::Set;
pub use transaction::Transaction;
