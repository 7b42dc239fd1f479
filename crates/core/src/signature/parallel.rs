//! Parallel (partitioned) signatures (spec §4.2).
//!
//! A `ParallelSignature` is `k` **independent** length-`m/k` single-hash
//! [`Signature`]s, each its own family. `add` broadcasts to every part;
//! `contains` is the conjunction across parts; `union`/`intersection` pair
//! parts by index.

use std::sync::Arc;

use super::{Family, Signature};
use crate::error::Error;
use crate::set::Set;

/// Factory for fresh, independent [`ParallelSignature`]s sharing the same `k`
/// single-hash families.
///
/// Two `ParallelSignature`s are compatible only if every part traces back to
/// the same per-part `Family` -- i.e. they were both produced by the same
/// `ParallelFamily`, or by cloning one.
#[derive(Debug, Clone)]
pub struct ParallelFamily {
    parts: Vec<Arc<Family>>,
}

impl ParallelFamily {
    /// Build a `k`-part family over a length-`m` signature. `m` must be
    /// divisible by `k`.
    ///
    /// # Panics
    ///
    /// Panics if `m` is not a positive multiple of `k`, or `k` is zero.
    #[must_use]
    pub fn new(m: usize, k: usize, seed: u64) -> Self {
        assert!(k > 0, "a parallel signature needs at least one partition");
        assert_eq!(m % k, 0, "signature length must be divisible by partition count");
        let len_per_part = m / k;
        let parts = (0..k)
            .map(|i| Family::new(len_per_part, 1, seed.wrapping_add(i as u64)))
            .collect();
        Self { parts }
    }

    /// Construct a fresh, all-zero `ParallelSignature` from this family.
    #[must_use]
    pub fn make(&self) -> ParallelSignature {
        ParallelSignature {
            parts: self.parts.iter().map(Signature::new).collect(),
        }
    }

    #[must_use]
    pub fn num_partitions(&self) -> usize {
        self.parts.len()
    }
}

/// An approximate set built from `k` independent single-hash signature
/// partitions (spec §4.2). Its false-positive rate for `n` inserted elements
/// per part is approximately `(1 - e^(-nk/m))^k`.
#[derive(Debug, Clone)]
pub struct ParallelSignature {
    parts: Vec<Signature>,
}

impl ParallelSignature {
    #[must_use]
    pub fn num_partitions(&self) -> usize {
        self.parts.len()
    }

    fn same_family(&self, other: &Self) -> bool {
        self.parts.len() == other.parts.len()
            && self
                .parts
                .iter()
                .zip(&other.parts)
                .all(|(a, b)| Arc::ptr_eq(a.family(), b.family()))
    }
}

impl Set for ParallelSignature {
    fn add(&mut self, elem: u64) {
        for part in &mut self.parts {
            part.add(elem);
        }
    }

    fn contains(&self, elem: u64) -> bool {
        self.parts.iter().all(|part| part.contains(elem))
    }

    fn union(&self, other: &Self) -> Result<Self, Error> {
        if !self.same_family(other) {
            return Err(Error::FamilyMismatch);
        }
        let parts = self
            .parts
            .iter()
            .zip(&other.parts)
            .map(|(a, b)| a.union(b))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { parts })
    }

    fn intersection(&self, other: &Self) -> Result<Self, Error> {
        if !self.same_family(other) {
            return Err(Error::FamilyMismatch);
        }
        let parts = self
            .parts
            .iter()
            .zip(&other.parts)
            .map(|(a, b)| a.intersection(b))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { parts })
    }

    fn is_empty(&self) -> bool {
        self.parts.iter().all(Signature::is_empty)
    }

    fn empty_like(&self) -> Self {
        Self {
            parts: self.parts.iter().map(Signature::empty_like).collect(),
        }
    }
}
