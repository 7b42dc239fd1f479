//! The `Set` capability (spec §3, §9): a single interface shared by exact
//! sets and approximate signatures, so schedulers can be written once and
//! run over either representation.
//!
//! Only `add`, `contains`, `union`, `intersection`, `is_empty`, and `clone`
//! are required. `remove` and `cardinality` are optional: implementations
//! that cannot support them cleanly (signatures) fail with
//! [`Error::UnsupportedOperation`] rather than silently no-opping.

use hashbrown::HashSet;

use crate::error::Error;

/// Object-identifier set capability, implemented by both exact sets and
/// approximate signatures.
pub trait Set: Clone {
    /// Insert `elem`.
    fn add(&mut self, elem: u64);

    /// Test membership. May return false positives for approximate
    /// implementations, but never false negatives.
    fn contains(&self, elem: u64) -> bool;

    /// Element-wise union. Fails with [`Error::FamilyMismatch`] when
    /// combining signatures from different hash families.
    fn union(&self, other: &Self) -> Result<Self, Error>
    where
        Self: Sized;

    /// Element-wise intersection. Same family requirement as [`Set::union`].
    fn intersection(&self, other: &Self) -> Result<Self, Error>
    where
        Self: Sized;

    /// True iff no element has ever been observed as present.
    fn is_empty(&self) -> bool;

    /// Remove `elem`. Not supported by signatures.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedOperation`] for representations that
    /// cannot remove elements.
    fn remove(&mut self, elem: u64) -> Result<(), Error> {
        let _ = elem;
        Err(Error::UnsupportedOperation("remove"))
    }

    /// Exact element count. Not supported by signatures.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedOperation`] for representations that
    /// cannot report an exact cardinality.
    fn cardinality(&self) -> Result<usize, Error> {
        Err(Error::UnsupportedOperation("cardinality"))
    }

    /// Every member of `universe` that this set (approximately) contains.
    fn estimate_contents(&self, universe: &[u64]) -> Vec<u64> {
        universe.iter().copied().filter(|&x| self.contains(x)).collect()
    }

    /// A fresh empty set of the same representation/family as `self`. Used
    /// to build the sentinel padding transaction for the tournament
    /// scheduler (spec §4.5, §9), which must share a signature family with
    /// the rest of the batch when `S` is a signature.
    fn empty_like(&self) -> Self;
}

/// An exact, insertion-order-irrelevant set of object identifiers.
///
/// Unlike [`Signature`](crate::signature::Signature), every operation here
/// is precise: `union`/`intersection` never fail, and `remove`/`cardinality`
/// are fully supported.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExactSet(HashSet<u64>);

impl ExactSet {
    #[must_use]
    pub fn new() -> Self {
        Self(HashSet::new())
    }

    #[must_use]
    pub fn from_iter(elems: impl IntoIterator<Item = u64>) -> Self {
        Self(elems.into_iter().collect())
    }

    /// Iterate over the contained elements in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<u64> for ExactSet {
    fn from_iter<T: IntoIterator<Item = u64>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Set for ExactSet {
    fn add(&mut self, elem: u64) {
        self.0.insert(elem);
    }

    fn contains(&self, elem: u64) -> bool {
        self.0.contains(&elem)
    }

    fn union(&self, other: &Self) -> Result<Self, Error> {
        Ok(Self(self.0.union(&other.0).copied().collect()))
    }

    fn intersection(&self, other: &Self) -> Result<Self, Error> {
        Ok(Self(self.0.intersection(&other.0).copied().collect()))
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn remove(&mut self, elem: u64) -> Result<(), Error> {
        self.0.remove(&elem);
        Ok(())
    }

    fn cardinality(&self) -> Result<usize, Error> {
        Ok(self.0.len())
    }

    fn empty_like(&self) -> Self {
        Self::new()
    }
}
