//! Transaction CSV grammar (spec §4.7, §6):
//!
//! ```text
//! <aux:int>, <obj:int>, <w:0|1>, <obj:int>, <w:0|1>, ...
//! ```
//!
//! One transaction per non-empty line; the 0-based index among non-empty
//! lines is the canonical transaction id. An odd count of post-`aux` fields
//! is a fatal error, not a silent truncation.

use winnow::ascii::{dec_uint, space0};
use winnow::combinator::separated;
use winnow::prelude::*;
use winnow::ModalResult;

use contend_core::set::ExactSet;
use contend_core::transaction::Transaction;
use contend_core::Set;

use crate::error::ParseError;

/// One parsed CSV line, before it is lowered into a [`Transaction`].
///
/// `aux` and the exact `(obj, write)` pair order are preserved verbatim so
/// round-tripping through [`write_csv`] reproduces the original line
/// (invariant 8) -- the scheduler itself never interprets `aux`.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTransaction {
    pub id: u64,
    pub aux: u64,
    pub pairs: Vec<(u64, bool)>,
}

impl RawTransaction {
    /// Lower into a [`Transaction`] over [`ExactSet`]s, discarding `aux`.
    #[must_use]
    pub fn into_transaction(&self) -> Transaction<ExactSet> {
        let mut read_set = ExactSet::new();
        let mut write_set = ExactSet::new();
        for &(obj, write) in &self.pairs {
            if write {
                write_set.add(obj);
            } else {
                read_set.add(obj);
            }
        }
        Transaction::singleton(self.id, read_set, write_set)
    }
}

fn field(input: &mut &str) -> ModalResult<u64> {
    (space0, dec_uint, space0).map(|(_, v, _)| v).parse_next(input)
}

fn fields_line(input: &mut &str) -> ModalResult<Vec<u64>> {
    separated(1.., field, ',').parse_next(input)
}

/// Parse a whole transactions file.
///
/// # Errors
///
/// Returns a [`ParseError`] on the first malformed line: non-integer fields,
/// an odd count of post-`aux` fields, or a write flag outside `{0, 1}`.
pub fn parse_csv(file: &str, input: &str) -> Result<Vec<RawTransaction>, ParseError> {
    let mut out = Vec::new();
    let mut id = 0u64;
    for (lineno, raw_line) in input.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        let fields = fields_line.parse(line).map_err(|e| ParseError {
            file: file.to_string(),
            line: lineno + 1,
            reason: format!("malformed transaction line: {e}"),
        })?;

        let Some((aux, rest)) = fields.split_first() else {
            return Err(ParseError {
                file: file.to_string(),
                line: lineno + 1,
                reason: "line has no fields".to_string(),
            });
        };
        if rest.len() % 2 != 0 {
            return Err(ParseError {
                file: file.to_string(),
                line: lineno + 1,
                reason: format!("odd number of post-aux fields ({})", rest.len()),
            });
        }

        let mut pairs = Vec::with_capacity(rest.len() / 2);
        for chunk in rest.chunks_exact(2) {
            let obj = chunk[0];
            let write = match chunk[1] {
                0 => false,
                1 => true,
                other => {
                    return Err(ParseError {
                        file: file.to_string(),
                        line: lineno + 1,
                        reason: format!("write flag must be 0 or 1, got {other}"),
                    })
                }
            };
            pairs.push((obj, write));
        }

        out.push(RawTransaction { id, aux: *aux, pairs });
        id += 1;
    }
    Ok(out)
}

/// Serialize transactions back into the CSV grammar, in `id` order.
///
/// Paired with [`parse_csv`] to exercise invariant 8 (round-trip fidelity).
#[must_use]
pub fn write_csv(txns: &[RawTransaction]) -> String {
    let mut out = String::new();
    for txn in txns {
        out.push_str(&txn.aux.to_string());
        for &(obj, write) in &txn.pairs {
            out.push_str(&format!(", {obj}, {}", u8::from(write)));
        }
        out.push('\n');
    }
    out
}
