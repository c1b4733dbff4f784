//! RRULE interpretation and occurrence generation.
//!
//! Only FREQ, INTERVAL, BYDAY, COUNT and UNTIL are interpreted. They drive
//! both the series summary (end date, frequency label) and date generation,
//! which is delegated to the `rrule` crate.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;
use rrule::RRuleSet;
use tracing::debug;

use crate::date_range::DateRange;
use crate::error::{CalFeedError, CalFeedResult};
use crate::event::EventTime;
use crate::timezone::localize;

/// Weekdays that make a weekly rule a "workdays" series.
const WORKDAYS: [Weekday; 5] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
];

/// Display bound for series with neither COUNT nor UNTIL, in years.
const OPEN_SERIES_YEARS: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Daily => "DAILY",
            Frequency::Weekly => "WEEKLY",
            Frequency::Monthly => "MONTHLY",
            Frequency::Yearly => "YEARLY",
        }
    }

    /// Fixed length of one period, used to estimate where a counted series
    /// ends. Months are 30 days and years 365 days.
    pub fn nominal_period(self) -> Duration {
        match self {
            Frequency::Daily => Duration::days(1),
            Frequency::Weekly => Duration::days(7),
            Frequency::Monthly => Duration::days(30),
            Frequency::Yearly => Duration::days(365),
        }
    }
}

impl FromStr for Frequency {
    type Err = CalFeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DAILY" => Ok(Frequency::Daily),
            "WEEKLY" => Ok(Frequency::Weekly),
            "MONTHLY" => Ok(Frequency::Monthly),
            "YEARLY" => Ok(Frequency::Yearly),
            other => Err(CalFeedError::RRule(format!("Unsupported FREQ '{}'", other))),
        }
    }
}

/// How a collapsed series describes its repetition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrequencyLabel {
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Workdays,
    Biweekly,
    Quarterly,
}

impl FrequencyLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            FrequencyLabel::Daily => "DAILY",
            FrequencyLabel::Weekly => "WEEKLY",
            FrequencyLabel::Monthly => "MONTHLY",
            FrequencyLabel::Yearly => "YEARLY",
            FrequencyLabel::Workdays => "WORKDAYS",
            FrequencyLabel::Biweekly => "BIWEEKLY",
            FrequencyLabel::Quarterly => "QUARTERLY",
        }
    }
}

impl From<Frequency> for FrequencyLabel {
    fn from(freq: Frequency) -> Self {
        match freq {
            Frequency::Daily => FrequencyLabel::Daily,
            Frequency::Weekly => FrequencyLabel::Weekly,
            Frequency::Monthly => FrequencyLabel::Monthly,
            Frequency::Yearly => FrequencyLabel::Yearly,
        }
    }
}

impl fmt::Display for FrequencyLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One BYDAY entry, e.g. `MO` or `-1FR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByDay {
    pub ordinal: Option<i16>,
    pub weekday: Weekday,
}

impl ByDay {
    pub fn every(weekday: Weekday) -> Self {
        ByDay {
            ordinal: None,
            weekday,
        }
    }
}

impl FromStr for ByDay {
    type Err = CalFeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_uppercase();
        if s.len() < 2 {
            return Err(CalFeedError::RRule(format!("Invalid BYDAY '{}'", s)));
        }
        let (ordinal, day) = s.split_at(s.len() - 2);

        let weekday = match day {
            "MO" => Weekday::Mon,
            "TU" => Weekday::Tue,
            "WE" => Weekday::Wed,
            "TH" => Weekday::Thu,
            "FR" => Weekday::Fri,
            "SA" => Weekday::Sat,
            "SU" => Weekday::Sun,
            _ => return Err(CalFeedError::RRule(format!("Invalid BYDAY '{}'", s))),
        };

        let ordinal = match ordinal.trim_start_matches('+') {
            "" => None,
            n => Some(
                n.parse::<i16>()
                    .map_err(|_| CalFeedError::RRule(format!("Invalid BYDAY '{}'", s)))?,
            ),
        };

        Ok(ByDay { ordinal, weekday })
    }
}

impl fmt::Display for ByDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let day = match self.weekday {
            Weekday::Mon => "MO",
            Weekday::Tue => "TU",
            Weekday::Wed => "WE",
            Weekday::Thu => "TH",
            Weekday::Fri => "FR",
            Weekday::Sat => "SA",
            Weekday::Sun => "SU",
        };
        match self.ordinal {
            Some(n) => write!(f, "{}{}", n, day),
            None => f.write_str(day),
        }
    }
}

/// What stops a series.
#[derive(Debug, Clone, PartialEq)]
pub enum RecurrenceBound {
    Open,
    Count(u32),
    Until(EventTime),
}

/// The interpreted subset of an RRULE.
#[derive(Debug, Clone, PartialEq)]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    pub interval: u16,
    pub by_day: Vec<ByDay>,
    pub bound: RecurrenceBound,
}

impl FromStr for RecurrenceRule {
    type Err = CalFeedError;

    /// Parse an RRULE value such as `FREQ=WEEKLY;INTERVAL=2;BYDAY=MO,FR`.
    /// Parts outside the interpreted subset are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s.strip_prefix("RRULE:").unwrap_or(s);

        let mut frequency = None;
        let mut interval = 1;
        let mut by_day = Vec::new();
        let mut count = None;
        let mut until = None;

        for part in s.split(';').filter(|p| !p.trim().is_empty()) {
            let (key, value) = part
                .split_once('=')
                .ok_or_else(|| CalFeedError::RRule(format!("Malformed part '{}'", part)))?;

            match key.trim().to_ascii_uppercase().as_str() {
                "FREQ" => frequency = Some(value.parse::<Frequency>()?),
                "INTERVAL" => {
                    interval = value
                        .parse::<u16>()
                        .ok()
                        .filter(|n| *n > 0)
                        .ok_or_else(|| CalFeedError::RRule(format!("Invalid INTERVAL '{}'", value)))?;
                }
                "BYDAY" => {
                    by_day = value
                        .split(',')
                        .map(ByDay::from_str)
                        .collect::<CalFeedResult<Vec<_>>>()?;
                }
                "COUNT" => {
                    count = Some(
                        value
                            .parse::<u32>()
                            .map_err(|_| CalFeedError::RRule(format!("Invalid COUNT '{}'", value)))?,
                    );
                }
                "UNTIL" => {
                    until = Some(
                        EventTime::parse_ics(value, None)
                            .ok_or_else(|| CalFeedError::RRule(format!("Invalid UNTIL '{}'", value)))?,
                    );
                }
                other => debug!(part = other, "Ignoring uninterpreted RRULE part"),
            }
        }

        let frequency = frequency.ok_or_else(|| CalFeedError::RRule("Missing FREQ".to_string()))?;

        let bound = match (until, count) {
            (Some(until), _) => RecurrenceBound::Until(until),
            (None, Some(count)) => RecurrenceBound::Count(count),
            (None, None) => RecurrenceBound::Open,
        };

        Ok(RecurrenceRule {
            frequency,
            interval,
            by_day,
            bound,
        })
    }
}

impl RecurrenceRule {
    /// Label shown for a collapsed series.
    pub fn label(&self) -> FrequencyLabel {
        match self.frequency {
            Frequency::Weekly if self.is_every_workday() => FrequencyLabel::Workdays,
            Frequency::Weekly if self.interval == 2 => FrequencyLabel::Biweekly,
            Frequency::Monthly if self.interval == 3 => FrequencyLabel::Quarterly,
            freq => freq.into(),
        }
    }

    /// BYDAY is exactly Monday through Friday.
    fn is_every_workday(&self) -> bool {
        self.by_day.len() == WORKDAYS.len()
            && WORKDAYS
                .iter()
                .all(|day| self.by_day.contains(&ByDay::every(*day)))
    }

    /// Where a collapsed series is displayed to end.
    ///
    /// UNTIL when present; for COUNT an estimate from the nominal period
    /// length; otherwise a fixed number of years after `start`.
    pub fn series_end(&self, start: DateTime<Tz>, zone: Tz) -> DateTime<Tz> {
        let open_end = || start + Frequency::Yearly.nominal_period() * OPEN_SERIES_YEARS;

        match &self.bound {
            RecurrenceBound::Until(until) => until.to_zoned(zone),
            RecurrenceBound::Count(count) => i32::try_from(*count)
                .ok()
                .and_then(|n| self.frequency.nominal_period().checked_mul(n))
                .and_then(|span| start.checked_add_signed(span))
                .unwrap_or_else(open_end),
            RecurrenceBound::Open => open_end(),
        }
    }

    /// Prepare occurrence generation for a series starting at `dtstart`.
    ///
    /// Occurrences follow the wall clock of `dtstart`'s zone. An UNTIL
    /// before `dtstart` yields a series without occurrences.
    pub fn series(&self, dtstart: DateTime<Tz>) -> CalFeedResult<Series> {
        let zone = dtstart.timezone();

        if let RecurrenceBound::Until(until) = &self.bound {
            if until_instant(until, zone) < dtstart.with_timezone(&Utc) {
                debug!(until = %until, "UNTIL precedes DTSTART, series is empty");
                return Ok(Series { set: None, zone });
            }
        }

        let text = self.to_rrule_text(dtstart);
        let set: RRuleSet = text
            .parse()
            .map_err(|e| CalFeedError::RRule(format!("{}: {}", text.replace('\n', " "), e)))?;

        Ok(Series {
            set: Some(set),
            zone,
        })
    }

    /// DTSTART and RRULE lines in the form the `rrule` crate parses.
    fn to_rrule_text(&self, dtstart: DateTime<Tz>) -> String {
        let zone = dtstart.timezone();
        let mut rule = format!("FREQ={};INTERVAL={}", self.frequency.as_str(), self.interval);

        if !self.by_day.is_empty() {
            let days: Vec<String> = self.by_day.iter().map(ByDay::to_string).collect();
            rule.push_str(&format!(";BYDAY={}", days.join(",")));
        }

        match &self.bound {
            RecurrenceBound::Open => {}
            RecurrenceBound::Count(count) => rule.push_str(&format!(";COUNT={}", count)),
            RecurrenceBound::Until(until) => {
                let until = until_instant(until, zone);
                rule.push_str(&format!(";UNTIL={}", until.format("%Y%m%dT%H%M%SZ")));
            }
        }

        format!(
            "DTSTART;TZID={}:{}\nRRULE:{}",
            zone.name(),
            dtstart.naive_local().format("%Y%m%dT%H%M%S"),
            rule
        )
    }
}

/// A date UNTIL includes every occurrence on that day.
fn until_instant(until: &EventTime, zone: Tz) -> DateTime<Utc> {
    let zoned = match until {
        EventTime::Date(d) => {
            localize(zone, (*d + Duration::days(1)).and_time(NaiveTime::MIN)) - Duration::seconds(1)
        }
        other => other.to_zoned(zone),
    };
    zoned.with_timezone(&Utc)
}

/// Occurrence generator for one master event.
#[derive(Debug, Clone)]
pub struct Series {
    /// `None` when the rule can never produce an occurrence
    set: Option<RRuleSet>,
    zone: Tz,
}

impl Series {
    /// The rule ends before it starts.
    pub fn is_empty(&self) -> bool {
        self.set.is_none()
    }

    /// Occurrence starts strictly inside `range`, at most `limit` of them,
    /// in the zone the series was seeded in.
    /// An absent bound leaves that side of the range open.
    pub fn occurrences(&self, range: &DateRange, limit: u16) -> Vec<DateTime<Tz>> {
        let Some(set) = &self.set else {
            return Vec::new();
        };
        let rrule_tz = rrule::Tz::Tz(chrono_tz::UTC);
        let mut set = set.clone();

        // rrule bounds are inclusive; shift them so an occurrence sitting
        // exactly on a bound does not use up the limit
        if let Some(from) = range.from {
            set = set.after((from + Duration::nanoseconds(1)).with_timezone(&rrule_tz));
        }
        if let Some(to) = range.to {
            set = set.before((to - Duration::nanoseconds(1)).with_timezone(&rrule_tz));
        }

        let result = set.all(limit);
        if result.limited {
            debug!(limit, "Occurrence generation stopped at limit");
        }

        result
            .dates
            .iter()
            .map(|dt| dt.with_timezone(&self.zone))
            .filter(|dt| range.strictly_contains(dt))
            .collect()
    }
}
