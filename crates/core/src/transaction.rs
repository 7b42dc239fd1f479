//! Transactions and their compatibility/merge algebra (spec §3, §4.3).

use hashbrown::HashSet;

use crate::error::Error;
use crate::set::Set;

/// An immutable transaction: a set of original transaction identifiers (a
/// singleton at construction, growing on merge) plus a read-set and
/// write-set over object identifiers.
///
/// Generic over any [`Set`] implementation, so the same type and the same
/// `compatible`/`merge` logic serve both exact scheduling and
/// signature-compressed scheduling.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct Transaction<S> {
    pub ids: HashSet<u64>,
    pub read_set: S,
    pub write_set: S,
}

impl<S: Set> Transaction<S> {
    /// Construct a freshly-observed transaction with a single identifier.
    #[must_use]
    pub fn singleton(id: u64, read_set: S, write_set: S) -> Self {
        Self {
            ids: HashSet::from_iter([id]),
            read_set,
            write_set,
        }
    }

    /// A transaction with no ids and empty read/write sets. Compatible with
    /// anything and contributes no ids when merged -- used by the tournament
    /// scheduler to pad a batch to a power of two (spec §4.5, §9).
    #[must_use]
    pub fn sentinel(empty_read: S, empty_write: S) -> Self {
        Self {
            ids: HashSet::new(),
            read_set: empty_read,
            write_set: empty_write,
        }
    }
}

/// `compatible(A, B)` -- true iff `(A.r ∩ B.w) ∪ (A.w ∩ B.r) ∪ (A.w ∩ B.w)`
/// is empty.
///
/// With an approximate [`Set`](crate::signature::Signature), this may report
/// `false` ("incompatible") for a pair that is truly compatible, but never
/// the reverse: a `true` result from signatures is only ever a true
/// compatibility (spec §4.3 soundness).
///
/// # Errors
///
/// Returns [`Error::FamilyMismatch`] if `a` and `b` use signatures from
/// different hash families.
pub fn compatible<S: Set>(a: &Transaction<S>, b: &Transaction<S>) -> Result<bool, Error> {
    let rw = a.read_set.intersection(&b.write_set)?;
    if !rw.is_empty() {
        return Ok(false);
    }
    let wr = a.write_set.intersection(&b.read_set)?;
    if !wr.is_empty() {
        return Ok(false);
    }
    let ww = a.write_set.intersection(&b.write_set)?;
    Ok(ww.is_empty())
}

/// `merge(A, B)` -- the pairwise union of ids, read-sets, and write-sets.
///
/// # Errors
///
/// Returns [`Error::PreconditionViolation`] if `a` and `b` are not
/// [`compatible`] (this also surfaces any [`Error::FamilyMismatch`] the
/// compatibility check itself hits).
pub fn merge<S: Set>(a: &Transaction<S>, b: &Transaction<S>) -> Result<Transaction<S>, Error> {
    if !compatible(a, b)? {
        return Err(Error::PreconditionViolation(
            "merge requires compatible transactions",
        ));
    }
    Ok(Transaction {
        ids: a.ids.union(&b.ids).copied().collect(),
        read_set: a.read_set.union(&b.read_set)?,
        write_set: a.write_set.union(&b.write_set)?,
    })
}
