//! Full resolution run over one document's events.

use chrono_tz::Tz;
use tracing::debug;

use crate::date_range::Query;
use crate::event::RawCalendarEvent;
use crate::record::OutputEventRecord;
use crate::resolver::resolve_events;
use crate::sequencer::sequence_events;

/// Sequence then resolve `events`, in the document zone `zone`.
pub fn process_calendar(
    events: &[RawCalendarEvent],
    zone: Tz,
    query: &Query,
    max_occurrences: u16,
) -> Vec<OutputEventRecord> {
    let sequenced = sequence_events(events);
    let records = resolve_events(sequenced, zone, *query, max_occurrences);

    debug!(
        events = events.len(),
        records = records.len(),
        zone = zone.name(),
        collapse = query.collapse,
        "Processed calendar"
    );

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date_range::DateRange;
    use crate::event::EventTime;
    use crate::resolver::DEFAULT_MAX_OCCURRENCES;
    use chrono::{NaiveDate, TimeZone, Utc};
    use chrono_tz::Europe::Paris;

    fn at(d: u32, h: u32) -> EventTime {
        EventTime::DateTimeFloating(
            NaiveDate::from_ymd_opt(2024, 1, d)
                .unwrap()
                .and_hms_opt(h, 0, 0)
                .unwrap(),
        )
    }

    #[test]
    fn override_listed_first_still_attaches() {
        let events = vec![
            RawCalendarEvent {
                uid: Some("weekly".to_string()),
                summary: Some("Moved".to_string()),
                recurrence_id: Some(at(8, 10)),
                start: Some(at(8, 15)),
                end: Some(at(8, 16)),
                ..Default::default()
            },
            RawCalendarEvent {
                uid: Some("weekly".to_string()),
                summary: Some("Planning".to_string()),
                rrule: Some("FREQ=WEEKLY".to_string()),
                start: Some(at(1, 10)),
                end: Some(at(1, 11)),
                ..Default::default()
            },
        ];
        let query = Query::new(
            DateRange::new(
                Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
                Some(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()),
            ),
            true,
        );

        let records = process_calendar(&events, Paris, &query, DEFAULT_MAX_OCCURRENCES);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Planning");
        assert_eq!(records[0].modifications.len(), 1);
        assert_eq!(records[0].modifications[0].modified_title, "Moved");
    }

    #[test]
    fn empty_document_gives_empty_output() {
        assert!(process_calendar(&[], Paris, &Query::default(), DEFAULT_MAX_OCCURRENCES).is_empty());
    }
}
