//! Winnow-based grammars (spec §4.7, §4.8) for the two text formats the
//! scheduler and analyzer consume: the transaction CSV file and the
//! event-log trace.

pub mod csv;
pub mod error;
pub mod event_log;

pub use csv::{parse_csv, write_csv, RawTransaction};
pub use error::ParseError;
pub use event_log::{parse_event_log, Event};
