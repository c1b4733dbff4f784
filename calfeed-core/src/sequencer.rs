//! Processing order for decoded events.

use crate::event::RawCalendarEvent;

/// Order events so every override comes after every other event.
///
/// Overrides attach to a master record that must already be in the output,
/// and document order does not guarantee that. This is a stable partition:
/// relative order inside each group is kept.
pub fn sequence_events(events: &[RawCalendarEvent]) -> Vec<&RawCalendarEvent> {
    let (overrides, mut ordered): (Vec<_>, Vec<_>) =
        events.iter().partition(|event| event.is_override());
    ordered.extend(overrides);
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventTime;
    use chrono::NaiveDate;

    fn master(uid: &str) -> RawCalendarEvent {
        RawCalendarEvent {
            uid: Some(uid.to_string()),
            rrule: Some("FREQ=DAILY".to_string()),
            ..Default::default()
        }
    }

    fn instance(uid: &str) -> RawCalendarEvent {
        RawCalendarEvent {
            uid: Some(uid.to_string()),
            recurrence_id: Some(EventTime::Date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())),
            ..Default::default()
        }
    }

    fn plain(uid: &str) -> RawCalendarEvent {
        RawCalendarEvent {
            uid: Some(uid.to_string()),
            ..Default::default()
        }
    }

    fn uids(events: &[&RawCalendarEvent]) -> Vec<String> {
        events.iter().map(|e| e.uid.clone().unwrap()).collect()
    }

    #[test]
    fn overrides_move_behind_masters() {
        let events = vec![instance("o1"), master("m1"), instance("o2"), master("m2")];
        let sequenced = sequence_events(&events);

        assert_eq!(uids(&sequenced), vec!["m1", "m2", "o1", "o2"]);
    }

    #[test]
    fn relative_order_is_stable() {
        let events = vec![
            plain("p1"),
            instance("o1"),
            master("m1"),
            plain("p2"),
            instance("o2"),
        ];
        let sequenced = sequence_events(&events);

        assert_eq!(uids(&sequenced), vec!["p1", "m1", "p2", "o1", "o2"]);
    }

    #[test]
    fn already_ordered_input_is_unchanged() {
        let events = vec![master("m1"), plain("p1"), instance("o1")];
        assert_eq!(uids(&sequence_events(&events)), vec!["m1", "p1", "o1"]);
    }

    #[test]
    fn empty_input() {
        assert!(sequence_events(&[]).is_empty());
    }
}
