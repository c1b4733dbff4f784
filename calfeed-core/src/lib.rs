//! Core library for calfeed.
//!
//! Turns an iCalendar document into the flat, ordered list of event records
//! a calendar UI renders:
//! - `ics` decodes VEVENTs and the zones the document declares
//! - `resolver` expands or collapses recurring series and attaches overrides
//! - `encode` writes the records as JSON
//!
//! `CalendarFeed` wires these together with user `Settings`.

pub mod builder;
pub mod config;
pub mod date_range;
pub mod encode;
pub mod error;
pub mod event;
pub mod feed;
pub mod ics;
pub mod interval;
pub mod pipeline;
pub mod record;
pub mod recurrence;
pub mod resolver;
pub mod sequencer;
pub mod source;
pub mod timezone;

pub use config::Settings;
pub use date_range::{DateRange, Query};
pub use encode::{DateStyle, encode_events};
pub use error::{CalFeedError, CalFeedResult};
pub use event::{EventTime, RawCalendarEvent};
pub use feed::CalendarFeed;
pub use pipeline::process_calendar;
pub use record::{OutputEventRecord, OverrideModification};
pub use recurrence::FrequencyLabel;
pub use source::CalendarSource;
