//! Tournament scheduler (spec §4.5): a depth-`ceil(log2 n)` pairwise
//! reduction tree with a deliberate left-wins tie-break.

use super::Scheduler;
use crate::error::Error;
use crate::set::Set;
use crate::transaction::{compatible, merge, Transaction};

/// Reduction-tree scheduler. Pads the input to a power of two with a
/// sentinel empty transaction (always compatible, contributes no ids) rather
/// than branching on odd levels. Each level pairs adjacent survivors; on a
/// conflict the left sibling wins and the right sibling's ids are dropped.
///
/// The tie-break is stable and order-dependent: reordering the input changes
/// which transactions survive (spec §8 S3), but re-evaluating pairs in a
/// different order within a level (e.g. in parallel) does not, since each
/// pair's outcome depends only on that pair.
#[derive(Debug, Default, Clone, Copy)]
pub struct TournamentScheduler;

impl<S: Set + Send + Sync> Scheduler<S> for TournamentScheduler {
    fn schedule(&self, all_txns: Vec<Transaction<S>>) -> Result<Vec<Transaction<S>>, Error> {
        if all_txns.is_empty() {
            return Ok(Vec::new());
        }

        let padded_len = all_txns.len().next_power_of_two();

        let mut level: Vec<Transaction<S>> = all_txns.clone();
        level.resize_with(padded_len, || {
            Transaction::sentinel(all_txns[0].read_set.empty_like(), all_txns[0].write_set.empty_like())
        });

        let mut depth = 0u32;
        while level.len() > 1 {
            tracing::trace!(level_len = level.len(), depth, "reducing tournament level");
            level = reduce_level(level)?;
            depth += 1;
        }

        let survivor = level.into_iter().next().expect("level never empties");

        let owner: hashbrown::HashMap<u64, usize> = all_txns
            .iter()
            .enumerate()
            .flat_map(|(idx, t)| t.ids.iter().map(move |&id| (id, idx)))
            .collect();

        let chosen = survivor
            .ids
            .iter()
            .filter_map(|id| owner.get(id).map(|&idx| all_txns[idx].clone()))
            .collect();
        Ok(chosen)
    }
}

/// Reduce one pair: merge on compatibility, left-wins otherwise (spec §4.5).
fn reduce_pair<S: Set>(left: &Transaction<S>, right: &Transaction<S>) -> Result<Transaction<S>, Error> {
    if compatible(left, right)? {
        merge(left, right)
    } else {
        Ok(left.clone())
    }
}

/// A level is only worth handing to the thread pool once it has enough pairs
/// to amortize the scheduling overhead.
const PARALLEL_LEVEL_THRESHOLD: usize = 64;

/// Reduce one tournament level, always pairing adjacent slots (the level is
/// always even-length: padding guarantees a power of two). Parallelized
/// across pair-slots once the level is large enough, per spec §5 -- each
/// pair's outcome is independent of evaluation order, so this never changes
/// the result.
#[cfg(feature = "parallel")]
fn reduce_level<S: Set + Send + Sync>(level: Vec<Transaction<S>>) -> Result<Vec<Transaction<S>>, Error> {
    use rayon::prelude::*;

    if level.len() < PARALLEL_LEVEL_THRESHOLD {
        return level.chunks(2).map(|pair| reduce_pair(&pair[0], &pair[1])).collect();
    }
    level.par_chunks(2).map(|pair| reduce_pair(&pair[0], &pair[1])).collect()
}

#[cfg(not(feature = "parallel"))]
fn reduce_level<S: Set>(level: Vec<Transaction<S>>) -> Result<Vec<Transaction<S>>, Error> {
    level.chunks(2).map(|pair| reduce_pair(&pair[0], &pair[1])).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::set::ExactSet;

    fn txn(id: u64, reads: &[u64], writes: &[u64]) -> Transaction<ExactSet> {
        Transaction::singleton(
            id,
            ExactSet::from_iter(reads.iter().copied()),
            ExactSet::from_iter(writes.iter().copied()),
        )
    }

    fn ids_of(chosen: &[Transaction<ExactSet>]) -> Vec<u64> {
        let mut ids: Vec<u64> = chosen.iter().flat_map(|t| t.ids.iter().copied()).collect();
        ids.sort_unstable();
        ids
    }

    #[test]
    fn s3_left_wins_tie_break() {
        // A conflicts with B; C conflicts with D; A compatible with C.
        let a = txn(0, &[], &[1]); // A
        let b = txn(1, &[], &[1]); // B, conflicts with A
        let c = txn(2, &[], &[2]); // C
        let d = txn(3, &[], &[2]); // D, conflicts with C

        let chosen = TournamentScheduler.schedule(vec![a.clone(), b.clone(), c.clone(), d.clone()]).unwrap();
        assert_eq!(ids_of(&chosen), vec![0, 2]); // A, C

        let chosen2 = TournamentScheduler.schedule(vec![b, a, d, c]).unwrap();
        assert_eq!(ids_of(&chosen2), vec![1, 3]); // B, D
    }

    #[test]
    fn pads_non_power_of_two_batches() {
        let txns = vec![txn(0, &[1], &[]), txn(1, &[2], &[]), txn(2, &[3], &[])];
        let chosen = TournamentScheduler.schedule(txns).unwrap();
        assert_eq!(ids_of(&chosen), vec![0, 1, 2]);
    }

    #[test]
    fn single_transaction_batch() {
        let chosen = TournamentScheduler.schedule(vec![txn(0, &[1], &[])]).unwrap();
        assert_eq!(ids_of(&chosen), vec![0]);
    }

    #[test]
    fn empty_batch_yields_empty_schedule() {
        let chosen: Vec<Transaction<ExactSet>> = TournamentScheduler.schedule(vec![]).unwrap();
        assert!(chosen.is_empty());
    }
}
