//! Compressed-scheduler wrapper (spec §4.6): runs an underlying scheduler
//! over signature-backed transactions instead of exact sets, then maps the
//! result back onto the original (exact) transactions.

use super::Scheduler;
use crate::error::Error;
use crate::set::{ExactSet, Set};
use crate::signature::parallel::{ParallelFamily, ParallelSignature};
use crate::transaction::Transaction;

/// Wraps an `underlying` scheduler that operates on [`ParallelSignature`]s.
/// `schedule` maps each input (exact) transaction to a signature-backed
/// transaction using a *fresh* signature per read-set/write-set, all drawn
/// from the same [`ParallelFamily`], delegates to `underlying`, and returns
/// the chosen **original** transactions -- the signature transactions are
/// ephemeral; only their ids are used to look the originals back up.
pub struct CompressedScheduler<U> {
    underlying: U,
    family: ParallelFamily,
}

impl<U> CompressedScheduler<U> {
    #[must_use]
    pub const fn new(underlying: U, family: ParallelFamily) -> Self {
        Self { underlying, family }
    }

    fn compress(&self, txn: &Transaction<ExactSet>) -> Transaction<ParallelSignature> {
        let mut read_set = self.family.make();
        for obj in txn.read_set.iter() {
            read_set.add(obj);
        }
        let mut write_set = self.family.make();
        for obj in txn.write_set.iter() {
            write_set.add(obj);
        }
        Transaction {
            ids: txn.ids.clone(),
            read_set,
            write_set,
        }
    }
}

impl<U: Scheduler<ParallelSignature>> Scheduler<ExactSet> for CompressedScheduler<U> {
    fn schedule(&self, txns: Vec<Transaction<ExactSet>>) -> Result<Vec<Transaction<ExactSet>>, Error> {
        let compressed: Vec<Transaction<ParallelSignature>> = txns.iter().map(|t| self.compress(t)).collect();
        let chosen_compressed = self.underlying.schedule(compressed)?;

        let chosen_ids: hashbrown::HashSet<u64> = chosen_compressed
            .iter()
            .flat_map(|t| t.ids.iter().copied())
            .collect();

        Ok(txns
            .into_iter()
            .filter(|t| t.ids.iter().any(|id| chosen_ids.contains(id)))
            .collect())
    }
}
