//! Query interval and request flags.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};

/// Date range for filtering events.
/// None values mean unbounded in that direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        DateRange { from, to }
    }

    /// Neither bound given.
    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    /// Both bounds, when both are given.
    pub fn bounds(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        Some((self.from?, self.to?))
    }

    /// Whether `dt` lies strictly between the given bounds.
    pub fn strictly_contains<Z: TimeZone>(&self, dt: &DateTime<Z>) -> bool {
        self.from.is_none_or(|from| *dt > from) && self.to.is_none_or(|to| *dt < to)
    }

    /// Parse command-line bounds.
    /// - `from`: YYYY-MM-DD (start of day, UTC) or RFC 3339
    /// - `to`: YYYY-MM-DD (end of day, UTC) or RFC 3339
    pub fn from_args(from: Option<&str>, to: Option<&str>) -> Result<Self, String> {
        let from_dt = from.map(parse_date_start).transpose()?;
        let to_dt = to.map(parse_date_end).transpose()?;

        if let (Some(f), Some(t)) = (from_dt, to_dt) {
            if t < f {
                return Err(format!("Range end {} is before range start {}", t, f));
            }
        }

        Ok(DateRange {
            from: from_dt,
            to: to_dt,
        })
    }
}

/// What the caller asks the engine for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Query {
    pub range: DateRange,
    /// Summarize each recurring series as one record instead of expanding it
    pub collapse: bool,
}

impl Query {
    pub fn new(range: DateRange, collapse: bool) -> Self {
        Query { range, collapse }
    }

    /// Return the document's own events once, without recurrence handling.
    pub fn is_passthrough(&self) -> bool {
        self.range.is_unbounded() && !self.collapse
    }
}

/// Parse YYYY-MM-DD as start of day in UTC
fn parse_date_start(s: &str) -> Result<DateTime<Utc>, String> {
    parse_date_or_instant(s, NaiveTime::MIN)
}

/// Parse YYYY-MM-DD as end of day in UTC
fn parse_date_end(s: &str) -> Result<DateTime<Utc>, String> {
    let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
    parse_date_or_instant(s, end_of_day)
}

fn parse_date_or_instant(s: &str, time: NaiveTime) -> Result<DateTime<Utc>, String> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date.and_time(time).and_utc());
    }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            format!(
                "Invalid date format '{}'. Expected YYYY-MM-DD or RFC 3339",
                s
            )
        })
}
