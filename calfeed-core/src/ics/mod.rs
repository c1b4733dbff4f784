//! ICS document decoding.
//!
//! Reads an iCalendar document into `RawCalendarEvent` values plus the zone
//! names the document declares. No recurrence logic happens here.

mod parse;

pub use parse::{DecodedCalendar, decode_calendar, unescape_text};
