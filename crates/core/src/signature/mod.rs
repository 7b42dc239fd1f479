//! Bloom-style bit-vector sets (spec §4.1).
//!
//! A [`Signature`] of length `m` with `k` hash functions `h_1..h_k: u64 ->
//! [0, m)`. `add`/`contains` are approximate: `contains` may report false
//! positives but never false negatives. Two signatures are only
//! interchangeable (`union`/`intersection`/compatibility) if they share the
//! exact same [`Family`] -- compatibility is by family *identity*, not by
//! equal `(m, k)`.

pub mod parallel;

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::Error;
use crate::set::Set;

/// Right-shift applied to the 128-bit product before the final modulo,
/// matching the original reference implementation's multiplicative hash.
const HASH_SHIFT: u32 = 35;

/// A shared, immutable description of a signature's length and hash
/// functions. Signatures built from the same `Family` (by `Arc` identity)
/// may be combined; signatures from independently-constructed families may
/// not, even if their `(m, k)` happen to match.
#[derive(Debug)]
pub struct Family {
    /// Bit-vector length.
    m: usize,
    /// `k` odd multipliers, one per hash function.
    multipliers: Vec<u64>,
}

impl Family {
    /// Build a fresh hash family: `k` multiplicative hash functions over a
    /// length-`m` bit vector, seeded deterministically from `seed`.
    ///
    /// # Panics
    ///
    /// Panics if `m` or `k` is zero.
    #[must_use]
    pub fn new(m: usize, k: usize, seed: u64) -> Arc<Self> {
        assert!(m > 0, "signature length must be positive");
        assert!(k > 0, "a signature needs at least one hash function");
        let mut rng = StdRng::seed_from_u64(seed);
        let multipliers = (0..k)
            .map(|_| rng.random_range((1u64 << 40)..(1u64 << 50)) * 2 + 1)
            .collect();
        Arc::new(Self { m, multipliers })
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.m
    }

    #[must_use]
    pub fn num_hashes(&self) -> usize {
        self.multipliers.len()
    }

    fn hash(&self, elem: u64, which: usize) -> usize {
        let mult = self.multipliers[which];
        let product = u128::from(elem) * u128::from(mult);
        ((product >> HASH_SHIFT) % (self.m as u128)) as usize
    }

    fn positions(&self, elem: u64) -> impl Iterator<Item = usize> + '_ {
        (0..self.multipliers.len()).map(move |i| self.hash(elem, i))
    }
}

/// A fixed-width bit vector, word-packed into `u64`s.
#[derive(Debug, Clone, PartialEq, Eq)]
struct BitVec {
    words: Vec<u64>,
    len: usize,
}

impl BitVec {
    fn new(len: usize) -> Self {
        Self {
            words: vec![0u64; len.div_ceil(64)],
            len,
        }
    }

    fn set(&mut self, bit: usize) {
        debug_assert!(bit < self.len);
        self.words[bit / 64] |= 1u64 << (bit % 64);
    }

    fn get(&self, bit: usize) -> bool {
        debug_assert!(bit < self.len);
        (self.words[bit / 64] >> (bit % 64)) & 1 == 1
    }

    fn is_all_zero(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    fn or(&self, other: &Self) -> Self {
        Self {
            words: self.words.iter().zip(&other.words).map(|(a, b)| a | b).collect(),
            len: self.len,
        }
    }

    fn and(&self, other: &Self) -> Self {
        Self {
            words: self.words.iter().zip(&other.words).map(|(a, b)| a & b).collect(),
            len: self.len,
        }
    }
}

/// An approximate set backed by a Bloom-style bit vector.
#[derive(Debug, Clone)]
pub struct Signature {
    family: Arc<Family>,
    bits: BitVec,
}

impl Signature {
    /// Construct a fresh, empty signature from `family`.
    #[must_use]
    pub fn new(family: &Arc<Family>) -> Self {
        Self {
            family: Arc::clone(family),
            bits: BitVec::new(family.len()),
        }
    }

    #[must_use]
    pub fn family(&self) -> &Arc<Family> {
        &self.family
    }

    fn same_family(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.family, &other.family)
    }
}

impl Set for Signature {
    fn add(&mut self, elem: u64) {
        for pos in self.family.positions(elem).collect::<Vec<_>>() {
            self.bits.set(pos);
        }
    }

    fn contains(&self, elem: u64) -> bool {
        self.family.positions(elem).all(|pos| self.bits.get(pos))
    }

    fn union(&self, other: &Self) -> Result<Self, Error> {
        if !self.same_family(other) {
            return Err(Error::FamilyMismatch);
        }
        Ok(Self {
            family: Arc::clone(&self.family),
            bits: self.bits.or(&other.bits),
        })
    }

    fn intersection(&self, other: &Self) -> Result<Self, Error> {
        if !self.same_family(other) {
            return Err(Error::FamilyMismatch);
        }
        Ok(Self {
            family: Arc::clone(&self.family),
            bits: self.bits.and(&other.bits),
        })
    }

    fn is_empty(&self) -> bool {
        self.bits.is_all_zero()
    }

    fn empty_like(&self) -> Self {
        Self::new(&self.family)
    }
}
