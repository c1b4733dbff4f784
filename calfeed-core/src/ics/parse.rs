//! ICS parsing using the icalendar crate's parser.

use icalendar::{
    DatePerhapsTime,
    parser::{Component, Property, read_calendar, unfold},
};
use tracing::debug;

use crate::error::{CalFeedError, CalFeedResult};
use crate::event::{EventTime, RawCalendarEvent};

/// Everything the engine needs from one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedCalendar {
    /// VEVENTs in document order
    pub events: Vec<RawCalendarEvent>,
    /// Calendar-level X-WR-TIMEZONE
    pub calendar_timezone: Option<String>,
    /// TZID of the first VTIMEZONE component
    pub vtimezone_id: Option<String>,
}

impl DecodedCalendar {
    /// Zone names declared by the document, in lookup order.
    pub fn zone_hints(&self) -> Vec<&str> {
        [
            self.calendar_timezone.as_deref(),
            self.vtimezone_id.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

/// Parse ICS content into its events and declared zones.
///
/// Fails only when the document as a whole cannot be read. Events with
/// missing or unreadable values are still returned, with those fields unset.
pub fn decode_calendar(content: &str) -> CalFeedResult<DecodedCalendar> {
    if !content.to_ascii_uppercase().contains("BEGIN:VCALENDAR") {
        return Err(CalFeedError::IcsParse(
            "Missing BEGIN:VCALENDAR".to_string(),
        ));
    }

    let unfolded = unfold(content);
    let calendar = read_calendar(&unfolded).map_err(|e| CalFeedError::IcsParse(e.to_string()))?;

    let mut decoded = DecodedCalendar {
        calendar_timezone: calendar
            .properties
            .iter()
            .find(|p| p.name == "X-WR-TIMEZONE")
            .map(|p| p.val.to_string()),
        ..Default::default()
    };
    collect(&calendar.components, &mut decoded);

    debug!(
        events = decoded.events.len(),
        timezone = decoded.calendar_timezone.as_deref().unwrap_or(""),
        "Decoded calendar"
    );

    Ok(decoded)
}

/// Walk components, descending into nested VCALENDARs.
fn collect(components: &[Component], decoded: &mut DecodedCalendar) {
    for component in components {
        match component.name.as_ref() {
            "VEVENT" => decoded.events.push(parse_event(component)),
            "VTIMEZONE" if decoded.vtimezone_id.is_none() => {
                decoded.vtimezone_id = component.find_prop("TZID").map(|p| p.val.to_string());
            }
            "VCALENDAR" => {
                if decoded.calendar_timezone.is_none() {
                    decoded.calendar_timezone = component
                        .find_prop("X-WR-TIMEZONE")
                        .map(|p| p.val.to_string());
                }
                collect(&component.components, decoded);
            }
            _ => {}
        }
    }
}

/// Convert one VEVENT component
fn parse_event(vevent: &Component) -> RawCalendarEvent {
    let text = |name: &str| vevent.find_prop(name).map(|p| unescape_text(p.val.as_ref()));
    let time = |name: &str| vevent.find_prop(name).and_then(parse_time);

    RawCalendarEvent {
        uid: vevent.find_prop("UID").map(|p| p.val.to_string()),
        summary: text("SUMMARY"),
        description: text("DESCRIPTION"),
        location: text("LOCATION"),
        status: vevent.find_prop("STATUS").map(|p| p.val.to_string()),
        start: time("DTSTART"),
        end: time("DTEND"),
        rrule: vevent.find_prop("RRULE").map(|p| p.val.to_string()),
        recurrence_id: time("RECURRENCE-ID"),
    }
}

/// Read a DTSTART-like property, keeping whether it had a time and a zone.
fn parse_time(prop: &Property) -> Option<EventTime> {
    match DatePerhapsTime::try_from(prop) {
        Ok(dpt) => Some(to_event_time(dpt)),
        Err(_) => {
            let tzid = param(prop, "TZID");
            EventTime::parse_ics(prop.val.as_ref(), tzid.as_deref())
        }
    }
}

/// Convert icalendar's DatePerhapsTime to our EventTime, preserving timezone info
fn to_event_time(dpt: DatePerhapsTime) -> EventTime {
    match dpt {
        DatePerhapsTime::Date(d) => EventTime::Date(d),
        DatePerhapsTime::DateTime(cal_dt) => match cal_dt {
            icalendar::CalendarDateTime::Utc(dt) => EventTime::DateTimeUtc(dt),
            icalendar::CalendarDateTime::Floating(naive) => EventTime::DateTimeFloating(naive),
            icalendar::CalendarDateTime::WithTimezone { date_time, tzid } => {
                EventTime::DateTimeZoned {
                    datetime: date_time,
                    tzid,
                }
            }
        },
    }
}

fn param(prop: &Property, key: &str) -> Option<String> {
    prop.params
        .iter()
        .find(|p| p.key == key)
        .and_then(|p| p.val.as_ref().map(|v| v.to_string()))
}

/// Undo RFC 5545 TEXT escaping (`\n`, `\,`, `\;`, `\\`).
pub fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(escaped) => out.push(escaped),
            None => out.push('\\'),
        }
    }

    out
}
