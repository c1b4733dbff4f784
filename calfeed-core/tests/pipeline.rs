//! End-to-end: ICS text in, JSON event list out.

use calfeed_core::{CalendarFeed, DateRange, DateStyle, Query, Settings};
use serde_json::Value;

const TEAM_CALENDAR: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//calfeed//test//EN\r\n\
X-WR-TIMEZONE:Europe/Paris\r\n\
BEGIN:VEVENT\r\n\
UID:standup@example.com\r\n\
RECURRENCE-ID;TZID=Europe/Paris:20240110T093000\r\n\
DTSTART;TZID=Europe/Paris:20240110T110000\r\n\
DTEND;TZID=Europe/Paris:20240110T111500\r\n\
SUMMARY:Standup (moved)\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:standup@example.com\r\n\
DTSTART;TZID=Europe/Paris:20240108T093000\r\n\
DTEND;TZID=Europe/Paris:20240108T094500\r\n\
RRULE:FREQ=WEEKLY;BYDAY=MO,TU,WE,TH,FR;UNTIL=20240131T235959Z\r\n\
SUMMARY:Standup\r\n\
LOCATION:Room 1\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:offsite@example.com\r\n\
DTSTART;VALUE=DATE:20240115\r\n\
DTEND;VALUE=DATE:20240116\r\n\
SUMMARY:Offsite\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:dinner@example.com\r\n\
DTSTART:20240120T180000Z\r\n\
DTEND:20240120T200000Z\r\n\
SUMMARY:Dinner\r\n\
STATUS:CONFIRMED\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:old@example.com\r\n\
DTSTART:20231201T180000Z\r\n\
DTEND:20231201T200000Z\r\n\
SUMMARY:Old\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:broken@example.com\r\n\
SUMMARY:No start\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

fn january(collapse: bool) -> Query {
    Query::new(
        DateRange::from_args(Some("2024-01-01"), Some("2024-01-31")).unwrap(),
        collapse,
    )
}

fn run(feed: &CalendarFeed, query: &Query) -> Vec<Value> {
    let records = feed.events_from_str(TEAM_CALENDAR, query).unwrap();
    let json = feed.encode(&records).unwrap();
    match serde_json::from_str(&json).unwrap() {
        Value::Array(events) => events,
        other => panic!("Expected array, got {}", other),
    }
}

fn ids(events: &[Value]) -> Vec<&str> {
    events.iter().map(|e| e["id"].as_str().unwrap()).collect()
}

#[test]
fn collapsed_month_view() {
    let events = run(&CalendarFeed::default(), &january(true));

    assert_eq!(
        ids(&events),
        vec!["standup@example.com", "offsite@example.com", "dinner@example.com"]
    );

    let standup = &events[0];
    assert_eq!(standup["recurrent"], 1);
    assert_eq!(standup["recurrenceFreq"], "WORKDAYS");
    assert_eq!(standup["groupId"], "standup@example.com_group");
    assert_eq!(standup["start"], "2024-01-08T09:30:00.000");
    assert_eq!(standup["recEndDate"], "2024-02-01T00:59:59.000");
    assert_eq!(standup["location"], "Room 1");

    let modifications = standup["modificationList"].as_array().unwrap();
    assert_eq!(modifications.len(), 1);
    assert_eq!(modifications[0]["originalDate"], "2024-01-10T09:30:00.000");
    assert_eq!(modifications[0]["modifiedStartDate"], "2024-01-10T11:00:00.000");
    assert_eq!(modifications[0]["modifiedEndDate"], "2024-01-10T11:15:00.000");
    assert_eq!(modifications[0]["modifiedTitle"], "Standup (moved)");

    let offsite = &events[1];
    assert_eq!(offsite["allDay"], true);
    assert_eq!(offsite["start"], "2024-01-15T00:00:00.000");
    assert_eq!(offsite["end"], "2024-01-16T00:00:00.000");

    let dinner = &events[2];
    assert_eq!(dinner["allDay"], false);
    assert_eq!(dinner["start"], "2024-01-20T19:00:00.000");
    assert_eq!(dinner["status"], "CONFIRMED");
    assert_eq!(dinner["recurrent"], 0);
}

#[test]
fn expanded_month_view() {
    let events = run(&CalendarFeed::default(), &january(false));

    let occurrences: Vec<&Value> = events
        .iter()
        .filter(|e| e["groupId"] == "standup@example.com_group")
        .collect();
    assert_eq!(occurrences.len(), 18, "Workdays from Jan 8 to Jan 31");
    assert_eq!(occurrences[0]["id"], "standup@example.com_0");
    assert_eq!(occurrences[17]["id"], "standup@example.com_17");
    assert_eq!(occurrences[17]["start"], "2024-01-31T09:30:00.000");
    assert_eq!(occurrences[17]["end"], "2024-01-31T09:45:00.000");
    assert!(occurrences.iter().all(|e| e["recurrent"] == 0));

    // The override shows up as a plain event of its own
    let tail = &ids(&events)[18..];
    assert_eq!(
        tail,
        ["offsite@example.com", "dinner@example.com", "standup@example.com"]
    );
    assert_eq!(events[20]["title"], "Standup (moved)");
}

#[test]
fn passthrough_lists_document_events_once() {
    let events = run(&CalendarFeed::default(), &Query::default());

    assert_eq!(
        ids(&events),
        vec![
            "standup@example.com",
            "offsite@example.com",
            "dinner@example.com",
            "old@example.com",
            "standup@example.com",
        ]
    );
    assert!(events.iter().all(|e| e["recurrent"] == 0));
    assert!(events.iter().all(|e| e["groupId"].is_null()));
}

#[test]
fn legacy_date_style() {
    let feed = CalendarFeed::new(Settings {
        date_style: DateStyle::Legacy,
        ..Default::default()
    });
    let events = run(&feed, &january(true));

    assert_eq!(events[0]["recEndDate"], "2024-02-01T00:59:59.059");
    assert_eq!(events[2]["start"], "2024-01-20T19:00:00.000");
}

#[test]
fn series_outside_range_is_dropped_when_collapsed() {
    let query = Query::new(
        DateRange::from_args(Some("2024-03-01"), Some("2024-03-31")).unwrap(),
        true,
    );
    let events = run(&CalendarFeed::default(), &query);

    assert!(events.is_empty());
}
