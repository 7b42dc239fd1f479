//! Batch schedulers: greedy (§4.4), tournament (§4.5), and the
//! compressed-scheduler wrapper (§4.6).

pub mod compressed;
pub mod greedy;
pub mod tournament;

use crate::error::Error;
use crate::set::Set;
use crate::transaction::Transaction;

/// A batch scheduler: given a list of transactions, selects the largest
/// conflict-free subset it can find and returns it, order- and
/// algorithm-dependent (spec §4.4, §4.5).
pub trait Scheduler<S: Set> {
    /// Select a conflict-free subset of `txns`.
    ///
    /// # Errors
    ///
    /// Returns an error if any internal `compatible`/`merge` call fails
    /// (e.g. [`Error::FamilyMismatch`] when the batch mixes signatures from
    /// different families).
    fn schedule(&self, txns: Vec<Transaction<S>>) -> Result<Vec<Transaction<S>>, Error>;
}
