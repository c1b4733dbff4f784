//! Recurrence resolution: turns sequenced events into output records.
//!
//! Each event goes through exactly one of four branches, in priority order:
//!
//! 1. Passthrough: no range and no collapse requested, the draft is emitted as is.
//! 2. Master: the series is expanded into occurrences or collapsed into one record.
//! 3. Override (collapse only): attached to the already emitted master record.
//! 4. Plain event: emitted when it intersects the range, or when the range is open.
//!
//! Nothing here fails. Bad rules downgrade the event to a plain one and
//! orphan overrides are dropped, both with a log line.

use std::collections::HashMap;

use chrono::DateTime;
use chrono_tz::Tz;
use tracing::{debug, warn};

use crate::builder::build_event;
use crate::date_range::Query;
use crate::event::{EventTime, RawCalendarEvent};
use crate::interval::intersects;
use crate::record::{OutputEventRecord, OverrideModification};
use crate::recurrence::RecurrenceRule;
use crate::timezone::localize;

/// Default cap on occurrences generated for one master.
pub const DEFAULT_MAX_OCCURRENCES: u16 = 1000;

/// Accumulates output records for one document.
///
/// Overrides are matched against records emitted earlier, so input must be
/// sequenced (see [`crate::sequencer::sequence_events`]). An override seen
/// before its master finds nothing and is dropped.
#[derive(Debug)]
pub struct EventResolver {
    zone: Tz,
    query: Query,
    max_occurrences: u16,
    output: Vec<OutputEventRecord>,
    /// Record id to its first position in `output`
    index: HashMap<String, usize>,
}

impl EventResolver {
    pub fn new(zone: Tz, query: Query, max_occurrences: u16) -> Self {
        EventResolver {
            zone,
            query,
            max_occurrences,
            output: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Process one event.
    pub fn push(&mut self, raw: &RawCalendarEvent) {
        let Some(draft) = build_event(raw, self.zone) else {
            return;
        };

        if self.query.is_passthrough() {
            self.emit(draft);
            return;
        }

        if let Some(rule) = self.parse_rule(raw) {
            match self.process_master(raw, &draft, &rule) {
                Ok(()) => return,
                Err(reason) => {
                    warn!(uid = %draft.id, reason = %reason, "Treating recurring event as plain");
                }
            }
        }

        match &raw.recurrence_id {
            Some(recurrence_id) if self.query.collapse => self.attach_override(draft, recurrence_id),
            _ => self.include_plain(draft),
        }
    }

    /// The records emitted so far, in emission order.
    pub fn records(&self) -> &[OutputEventRecord] {
        &self.output
    }

    pub fn finish(self) -> Vec<OutputEventRecord> {
        self.output
    }

    fn emit(&mut self, record: OutputEventRecord) {
        self.index.entry(record.id.clone()).or_insert(self.output.len());
        self.output.push(record);
    }

    fn parse_rule(&self, raw: &RawCalendarEvent) -> Option<RecurrenceRule> {
        let text = raw.rrule.as_deref()?;
        match text.parse::<RecurrenceRule>() {
            Ok(rule) => Some(rule),
            Err(e) => {
                warn!(
                    uid = raw.uid.as_deref().unwrap_or(""),
                    rrule = text,
                    error = %e,
                    "Ignoring unsupported RRULE"
                );
                None
            }
        }
    }

    fn process_master(
        &mut self,
        raw: &RawCalendarEvent,
        draft: &OutputEventRecord,
        rule: &RecurrenceRule,
    ) -> Result<(), String> {
        // Repeat on the master's own wall clock, report in the document zone
        let own_zone = raw
            .start
            .as_ref()
            .map_or(self.zone, |start| start.own_zone(self.zone));
        let series = rule
            .series(draft.start.with_timezone(&own_zone))
            .map_err(|e| e.to_string())?;
        let group_id = format!("{}_group", draft.id);

        if self.query.collapse {
            if series.is_empty() {
                debug!(uid = %draft.id, "Series has no occurrences, dropping it");
                return Ok(());
            }
            if self.query.range.bounds().is_some()
                && series.occurrences(&self.query.range, 1).is_empty()
            {
                debug!(uid = %draft.id, "No occurrence in range, dropping series");
                return Ok(());
            }

            let mut record = draft.clone();
            record.recurrent = true;
            record.rec_end_date = Some(rule.series_end(draft.start, self.zone));
            record.recurrence_freq = Some(rule.label());
            record.group_id = Some(group_id);
            self.emit(record);
        } else {
            let span = draft.wall_clock_span();
            let occurrences = series.occurrences(&self.query.range, self.max_occurrences);
            debug!(uid = %draft.id, count = occurrences.len(), "Expanded series");

            for (i, start) in occurrences.into_iter().enumerate() {
                let start = start.with_timezone(&self.zone);
                let mut record = draft.clone();
                record.id = format!("{}_{}", draft.id, i);
                record.group_id = Some(group_id.clone());
                record.end = localize(self.zone, start.naive_local() + span);
                record.start = start;
                self.emit(record);
            }
        }

        Ok(())
    }

    fn attach_override(&mut self, draft: OutputEventRecord, recurrence_id: &EventTime) {
        let original_date: DateTime<Tz> = recurrence_id.to_zoned(self.zone);

        match self.index.get(&draft.id) {
            Some(&position) => {
                let modification = OverrideModification::from_draft(original_date, &draft);
                self.output[position].add_modification(modification);
            }
            None => {
                debug!(uid = %draft.id, recurrence_id = %recurrence_id, "Dropping override without master");
            }
        }
    }

    fn include_plain(&mut self, draft: OutputEventRecord) {
        let matches = match self.query.range.bounds() {
            Some((from, to)) => intersects(
                &draft.start,
                &draft.end,
                &from.with_timezone(&self.zone),
                &to.with_timezone(&self.zone),
            ),
            None => true,
        };

        if matches {
            self.emit(draft);
        }
    }
}

/// Resolve already sequenced events into output records.
pub fn resolve_events<'a, I>(
    events: I,
    zone: Tz,
    query: Query,
    max_occurrences: u16,
) -> Vec<OutputEventRecord>
where
    I: IntoIterator<Item = &'a RawCalendarEvent>,
{
    let mut resolver = EventResolver::new(zone, query, max_occurrences);
    for event in events {
        resolver.push(event);
    }
    resolver.finish()
}
