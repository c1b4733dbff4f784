//! Draft record construction from a decoded VEVENT.

use chrono::Duration;
use chrono_tz::Tz;
use tracing::warn;

use crate::event::RawCalendarEvent;
use crate::record::OutputEventRecord;
use crate::timezone::localize;

/// Build the draft record for one event, or `None` when it has no DTSTART.
///
/// - All-day only if neither DTSTART nor DTEND carries a time of day.
/// - A missing DTEND means the event lasts one calendar day in `zone`.
/// - Absent text properties become empty strings.
pub fn build_event(raw: &RawCalendarEvent, zone: Tz) -> Option<OutputEventRecord> {
    let Some(start_time) = raw.start.as_ref() else {
        warn!(uid = raw.uid.as_deref().unwrap_or(""), "Skipping event without DTSTART");
        return None;
    };

    let all_day = start_time.is_date() && raw.end.as_ref().is_none_or(|end| end.is_date());

    let start = start_time.to_zoned(zone);
    let mut end = match &raw.end {
        Some(end_time) => end_time.to_zoned(zone),
        None => localize(zone, start.naive_local() + Duration::days(1)),
    };

    if end < start {
        warn!(
            uid = raw.uid.as_deref().unwrap_or(""),
            "DTEND before DTSTART, clamping to start"
        );
        end = start;
    }

    Some(OutputEventRecord {
        id: text(&raw.uid),
        title: text(&raw.summary),
        description: text(&raw.description),
        location: text(&raw.location),
        status: text(&raw.status),
        start,
        end,
        all_day,
        recurrent: false,
        rec_end_date: None,
        recurrence_freq: None,
        group_id: None,
        modifications: Vec::new(),
    })
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}
