//! Event-log text grammar (spec §4.8, §6, and the `recv`/`cleanup` Open
//! Question resolved in §9): one event per line, each prefixed by `[+<time>]`
//! where `<time>` is seconds as a real number.
//!
//! ```text
//! [+<time>] submit txn id=<i> [aux=<a>]
//! [+<time>] scheduled txn id=<i> assigned to puppet <p>
//! [+<time>] done puppet <p> finished txn id=<i>
//! [+<time>] recv txn id=<i>
//! [+<time>] cleanup txn id=<i>
//! ```
//!
//! Lines matching the simulator-init noise pattern (`.*[xX]sim.*` or
//! `.*veril.*`) are silently dropped; any other non-matching line is fatal.

use winnow::ascii::{dec_uint, float, space0, space1};
use winnow::combinator::{alt, opt};
use winnow::prelude::*;
use winnow::token::literal;
use winnow::ModalResult;

use crate::error::ParseError;

/// A single event, in the order it was read from the log.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    Submit { time: f64, id: u64, aux: Option<u64> },
    Scheduled { time: f64, id: u64, lane: u64 },
    Done { time: f64, id: u64, lane: u64 },
    Recv { time: f64, id: u64 },
    Cleanup { time: f64, id: u64 },
}

impl Event {
    #[must_use]
    pub const fn time(&self) -> f64 {
        match *self {
            Self::Submit { time, .. }
            | Self::Scheduled { time, .. }
            | Self::Done { time, .. }
            | Self::Recv { time, .. }
            | Self::Cleanup { time, .. } => time,
        }
    }

    #[must_use]
    pub const fn txn_id(&self) -> u64 {
        match *self {
            Self::Submit { id, .. }
            | Self::Scheduled { id, .. }
            | Self::Done { id, .. }
            | Self::Recv { id, .. }
            | Self::Cleanup { id, .. } => id,
        }
    }
}

fn is_noise(line: &str) -> bool {
    line.contains("xsim") || line.contains("Xsim") || line.contains("veril")
}

/// `"[" "+" WS? FLOAT "]"`
fn time_prefix(input: &mut &str) -> ModalResult<f64> {
    literal("[+").parse_next(input)?;
    space0.parse_next(input)?;
    let t = float.parse_next(input)?;
    literal("]").parse_next(input)?;
    Ok(t)
}

/// `"id=" INT`, with permissive whitespace around the integer.
fn id_field(input: &mut &str) -> ModalResult<u64> {
    literal("id=").parse_next(input)?;
    space0.parse_next(input)?;
    dec_uint.parse_next(input)
}

fn submit_event(time: f64) -> impl FnMut(&mut &str) -> ModalResult<Event> {
    move |input: &mut &str| {
        literal("submit").parse_next(input)?;
        space1.parse_next(input)?;
        literal("txn").parse_next(input)?;
        space1.parse_next(input)?;
        let id = id_field.parse_next(input)?;
        let aux = opt(|input: &mut &str| {
            space1.parse_next(input)?;
            literal("aux=").parse_next(input)?;
            dec_uint.parse_next(input)
        })
        .parse_next(input)?;
        Ok(Event::Submit { time, id, aux })
    }
}

fn scheduled_event(time: f64) -> impl FnMut(&mut &str) -> ModalResult<Event> {
    move |input: &mut &str| {
        literal("scheduled").parse_next(input)?;
        space1.parse_next(input)?;
        literal("txn").parse_next(input)?;
        space1.parse_next(input)?;
        let id = id_field.parse_next(input)?;
        space1.parse_next(input)?;
        literal("assigned").parse_next(input)?;
        space1.parse_next(input)?;
        literal("to").parse_next(input)?;
        space1.parse_next(input)?;
        literal("puppet").parse_next(input)?;
        space1.parse_next(input)?;
        let lane = dec_uint.parse_next(input)?;
        Ok(Event::Scheduled { time, id, lane })
    }
}

fn done_event(time: f64) -> impl FnMut(&mut &str) -> ModalResult<Event> {
    move |input: &mut &str| {
        literal("done").parse_next(input)?;
        space1.parse_next(input)?;
        literal("puppet").parse_next(input)?;
        space1.parse_next(input)?;
        let lane = dec_uint.parse_next(input)?;
        space1.parse_next(input)?;
        literal("finished").parse_next(input)?;
        space1.parse_next(input)?;
        literal("txn").parse_next(input)?;
        space1.parse_next(input)?;
        let id = id_field.parse_next(input)?;
        Ok(Event::Done { time, id, lane })
    }
}

fn recv_event(time: f64) -> impl FnMut(&mut &str) -> ModalResult<Event> {
    move |input: &mut &str| {
        literal("recv").parse_next(input)?;
        space1.parse_next(input)?;
        literal("txn").parse_next(input)?;
        space1.parse_next(input)?;
        let id = id_field.parse_next(input)?;
        Ok(Event::Recv { time, id })
    }
}

fn cleanup_event(time: f64) -> impl FnMut(&mut &str) -> ModalResult<Event> {
    move |input: &mut &str| {
        literal("cleanup").parse_next(input)?;
        space1.parse_next(input)?;
        literal("txn").parse_next(input)?;
        space1.parse_next(input)?;
        let id = id_field.parse_next(input)?;
        Ok(Event::Cleanup { time, id })
    }
}

/// `time_prefix WS event`, `event` being one of the five kinds above.
fn event_line(input: &mut &str) -> ModalResult<Event> {
    space0.parse_next(input)?;
    let time = time_prefix.parse_next(input)?;
    space1.parse_next(input)?;
    alt((
        submit_event(time),
        scheduled_event(time),
        done_event(time),
        recv_event(time),
        cleanup_event(time),
    ))
    .parse_next(input)
}

/// Parse a whole event log.
///
/// # Errors
///
/// Returns a [`ParseError`] on the first line that is neither noise nor a
/// recognized event (malformed or unknown grammar).
pub fn parse_event_log(file: &str, input: &str) -> Result<Vec<Event>, ParseError> {
    let mut out = Vec::new();
    for (lineno, raw_line) in input.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || is_noise(line) {
            continue;
        }
        let event = event_line.parse(line).map_err(|e| ParseError {
            file: file.to_string(),
            line: lineno + 1,
            reason: format!("malformed event line: {e}"),
        })?;
        out.push(event);
    }
    Ok(out)
}
