//! Error taxonomy for the scheduler core (spec §7).

use core::fmt;

/// Errors the scheduler core can raise.
///
/// None of these are ever recovered from mid-batch: the core never retries,
/// and a caller that sees one of these has a programming error or invalid
/// input, not a transient condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// `remove` or `cardinality` called on a [`Signature`](crate::signature::Signature)
    /// or [`ParallelSignature`](crate::signature::parallel::ParallelSignature).
    UnsupportedOperation(&'static str),
    /// Two signatures (or parallel signatures) from different hash families
    /// were combined via `union`/`intersection`, or compared for compatibility.
    FamilyMismatch,
    /// `merge` was called on two transactions that are not `compatible`.
    PreconditionViolation(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedOperation(op) => write!(f, "unsupported operation: {op}"),
            Self::FamilyMismatch => write!(f, "combined signatures from different hash families"),
            Self::PreconditionViolation(reason) => write!(f, "precondition violated: {reason}"),
        }
    }
}

impl std::error::Error for Error {}
