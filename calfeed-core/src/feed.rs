//! One-call conversion from a calendar source to output records or JSON.

use chrono_tz::Tz;
use tracing::info;

use crate::config::Settings;
use crate::date_range::Query;
use crate::encode::{encode_events, encode_events_pretty};
use crate::error::CalFeedResult;
use crate::ics::{DecodedCalendar, decode_calendar};
use crate::pipeline::process_calendar;
use crate::record::OutputEventRecord;
use crate::source::CalendarSource;
use crate::timezone::resolve_document_zone;

/// Runs source, decoder, zone resolution, pipeline and encoder with one set
/// of settings.
#[derive(Debug, Clone, Default)]
pub struct CalendarFeed {
    settings: Settings,
}

impl CalendarFeed {
    pub fn new(settings: Settings) -> Self {
        CalendarFeed { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Fetch `source` and resolve its events for `query`.
    pub async fn events(
        &self,
        source: &CalendarSource,
        query: &Query,
    ) -> CalFeedResult<Vec<OutputEventRecord>> {
        let content = source.read(self.settings.fetch_timeout()?).await?;
        info!(source = %source, "Loaded calendar");
        self.events_from_str(&content, query)
    }

    /// Fetch `source` and return its events as a JSON array.
    pub async fn events_json(&self, source: &CalendarSource, query: &Query) -> CalFeedResult<String> {
        let records = self.events(source, query).await?;
        self.encode(&records)
    }

    /// Resolve events of an in-memory document.
    pub fn events_from_str(
        &self,
        content: &str,
        query: &Query,
    ) -> CalFeedResult<Vec<OutputEventRecord>> {
        let calendar = decode_calendar(content)?;
        let zone = self.document_zone(&calendar);

        Ok(process_calendar(
            &calendar.events,
            zone,
            query,
            self.settings.max_occurrences,
        ))
    }

    /// Zone the document's floating and all-day values are read in.
    pub fn document_zone(&self, calendar: &DecodedCalendar) -> Tz {
        resolve_document_zone(
            &calendar.zone_hints(),
            self.settings.default_timezone.as_deref(),
        )
    }

    pub fn encode(&self, records: &[OutputEventRecord]) -> CalFeedResult<String> {
        encode_events(records, self.settings.date_style)
    }

    pub fn encode_pretty(&self, records: &[OutputEventRecord]) -> CalFeedResult<String> {
        encode_events_pretty(records, self.settings.date_style)
    }
}
