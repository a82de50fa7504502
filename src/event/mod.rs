//! Event catalog: the changelog-style table of dated content.

pub mod parse;
pub mod row;

pub use parse::{parse_event_file, parse_event_text};
pub use row::{Event, EventKind};
