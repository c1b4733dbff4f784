//! Decoded calendar events, before any recurrence handling.
//!
//! A `RawCalendarEvent` is a plain projection of one VEVENT component. It is
//! produced by the ICS decoder and never mutated afterwards.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::timezone::{localize, resolve_name};

/// One VEVENT as found in the document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCalendarEvent {
    pub uid: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub status: Option<String>,
    pub start: Option<EventTime>,
    pub end: Option<EventTime>,

    /// RRULE value, e.g. `FREQ=WEEKLY;BYDAY=MO,WE`
    pub rrule: Option<String>,
    /// RECURRENCE-ID: the original occurrence this event overrides
    pub recurrence_id: Option<EventTime>,
}

impl RawCalendarEvent {
    /// Master of a recurring series.
    pub fn is_master(&self) -> bool {
        self.rrule.is_some()
    }

    /// Replacement for a single occurrence of some master.
    pub fn is_override(&self) -> bool {
        self.rrule.is_none() && self.recurrence_id.is_some()
    }
}

/// A date-like value as written in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventTime {
    /// VALUE=DATE, no time of day
    Date(NaiveDate),
    /// Date-time with a trailing `Z`
    DateTimeUtc(DateTime<Utc>),
    /// Date-time without zone, interpreted in the document zone
    DateTimeFloating(NaiveDateTime),
    /// Date-time with a TZID parameter
    DateTimeZoned { datetime: NaiveDateTime, tzid: String },
}

impl EventTime {
    /// True when the value carries no time-of-day component.
    pub fn is_date(&self) -> bool {
        matches!(self, EventTime::Date(_))
    }

    /// Normalize to an instant expressed in `zone`.
    ///
    /// Dates are anchored at midnight in `zone`. Floating times are read as
    /// wall-clock time in `zone`. Zoned times are read in their own TZID and
    /// converted; an unknown TZID falls back to `zone`.
    pub fn to_zoned(&self, zone: Tz) -> DateTime<Tz> {
        match self {
            EventTime::Date(d) => localize(zone, d.and_time(NaiveTime::MIN)),
            EventTime::DateTimeUtc(dt) => dt.with_timezone(&zone),
            EventTime::DateTimeFloating(dt) => localize(zone, *dt),
            EventTime::DateTimeZoned { datetime, tzid } => match resolve_name(tzid) {
                Some(own_zone) => localize(own_zone, *datetime).with_timezone(&zone),
                None => {
                    debug!(tzid = %tzid, "Unknown TZID, using document time zone");
                    localize(zone, *datetime)
                }
            },
        }
    }

    /// Zone whose wall clock recurrences starting at this value follow.
    ///
    /// UTC values repeat in UTC, zoned values in their TZID. Dates, floating
    /// times and unknown TZIDs repeat in `fallback`.
    pub fn own_zone(&self, fallback: Tz) -> Tz {
        match self {
            EventTime::DateTimeUtc(_) => Tz::UTC,
            EventTime::DateTimeZoned { tzid, .. } => resolve_name(tzid).unwrap_or(fallback),
            EventTime::Date(_) | EventTime::DateTimeFloating(_) => fallback,
        }
    }

    /// Parse a raw iCalendar date or date-time value.
    ///
    /// Handles `20240108`, `20240108T100000Z` and `20240108T100000`; the
    /// latter becomes zoned when `tzid` is given.
    pub fn parse_ics(value: &str, tzid: Option<&str>) -> Option<EventTime> {
        let value = value.trim();

        if !value.contains('T') {
            return NaiveDate::parse_from_str(value, "%Y%m%d")
                .ok()
                .map(EventTime::Date);
        }

        if let Some(utc) = value.strip_suffix('Z') {
            return NaiveDateTime::parse_from_str(utc, "%Y%m%dT%H%M%S")
                .ok()
                .map(|dt| EventTime::DateTimeUtc(dt.and_utc()));
        }

        let datetime = NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S").ok()?;
        Some(match tzid {
            Some(tz) => EventTime::DateTimeZoned {
                datetime,
                tzid: tz.to_string(),
            },
            None => EventTime::DateTimeFloating(datetime),
        })
    }
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventTime::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            EventTime::DateTimeUtc(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%SZ")),
            EventTime::DateTimeFloating(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S")),
            EventTime::DateTimeZoned { datetime, tzid } => {
                write!(f, "{} ({})", datetime.format("%Y-%m-%dT%H:%M:%S"), tzid)
            }
        }
    }
}
