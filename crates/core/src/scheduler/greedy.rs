//! Greedy scheduler (spec §4.4): a linear-scan fold over a running merged
//! accumulator. Order-dependent -- the earliest-seen transaction wins
//! against later conflicting peers.

use super::Scheduler;
use crate::error::Error;
use crate::set::Set;
use crate::transaction::{compatible, merge, Transaction};

/// Linear-scan scheduler. O(n) compatibility tests; each test is O(m) bits
/// when `S` is a signature.
#[derive(Debug, Default, Clone, Copy)]
pub struct GreedyScheduler;

impl<S: Set> Scheduler<S> for GreedyScheduler {
    fn schedule(&self, mut txns: Vec<Transaction<S>>) -> Result<Vec<Transaction<S>>, Error> {
        if txns.is_empty() {
            return Ok(Vec::new());
        }
        tracing::debug!(batch_len = txns.len(), "greedy scheduling batch");

        let rest = txns.split_off(1);
        let mut acc = txns.pop().expect("checked non-empty above");
        let mut chosen = vec![acc.clone()];

        for txn in rest {
            if compatible(&acc, &txn)? {
                acc = merge(&acc, &txn)?;
                chosen.push(txn);
            } else {
                tracing::trace!("rejected transaction conflicting with accumulator");
            }
        }

        tracing::debug!(chosen_len = chosen.len(), "greedy batch complete");
        Ok(chosen)
    }
}
