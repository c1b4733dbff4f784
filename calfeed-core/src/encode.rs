//! JSON encoding of output records for calendar front-ends.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Timelike};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{CalFeedError, CalFeedResult};
use crate::record::{OutputEventRecord, OverrideModification};

/// How instants are rendered.
///
/// Both styles write the wall-clock time in the document zone, without an
/// offset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateStyle {
    /// `2024-01-08T10:00:00.000`, real milliseconds
    #[default]
    Iso,
    /// `2024-01-08T10:00:05.005`, the fraction repeats the seconds as older
    /// consumers of this feed expect
    Legacy,
}

impl DateStyle {
    pub fn format(self, dt: &DateTime<Tz>) -> String {
        match self {
            DateStyle::Iso => dt.format("%Y-%m-%dT%H:%M:%S%.3f").to_string(),
            DateStyle::Legacy => {
                format!("{}.{:03}", dt.format("%Y-%m-%dT%H:%M:%S"), dt.second())
            }
        }
    }
}

impl FromStr for DateStyle {
    type Err = CalFeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "iso" => Ok(DateStyle::Iso),
            "legacy" => Ok(DateStyle::Legacy),
            other => Err(CalFeedError::Config(format!(
                "Unknown date style '{}', expected 'iso' or 'legacy'",
                other
            ))),
        }
    }
}

impl fmt::Display for DateStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateStyle::Iso => f.write_str("iso"),
            DateStyle::Legacy => f.write_str("legacy"),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EventView<'a> {
    id: &'a str,
    title: &'a str,
    description: &'a str,
    location: &'a str,
    status: &'a str,
    start: String,
    end: String,
    all_day: bool,
    recurrent: u8,
    rec_end_date: Option<String>,
    recurrence_freq: Option<&'static str>,
    group_id: Option<&'a str>,
    modification_list: Vec<ModificationView<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ModificationView<'a> {
    original_date: String,
    modified_start_date: String,
    modified_end_date: String,
    modified_title: &'a str,
    modified_description: &'a str,
}

impl<'a> EventView<'a> {
    fn new(record: &'a OutputEventRecord, style: DateStyle) -> Self {
        EventView {
            id: &record.id,
            title: &record.title,
            description: &record.description,
            location: &record.location,
            status: &record.status,
            start: style.format(&record.start),
            end: style.format(&record.end),
            all_day: record.all_day,
            recurrent: u8::from(record.recurrent),
            rec_end_date: record.rec_end_date.as_ref().map(|dt| style.format(dt)),
            recurrence_freq: record.recurrence_freq.map(|label| label.as_str()),
            group_id: record.group_id.as_deref(),
            modification_list: record
                .modifications
                .iter()
                .map(|m| ModificationView::new(m, style))
                .collect(),
        }
    }
}

impl<'a> ModificationView<'a> {
    fn new(modification: &'a OverrideModification, style: DateStyle) -> Self {
        ModificationView {
            original_date: style.format(&modification.original_date),
            modified_start_date: style.format(&modification.modified_start),
            modified_end_date: style.format(&modification.modified_end),
            modified_title: &modification.modified_title,
            modified_description: &modification.modified_description,
        }
    }
}

fn views(records: &[OutputEventRecord], style: DateStyle) -> Vec<EventView<'_>> {
    records.iter().map(|r| EventView::new(r, style)).collect()
}

/// Serialize records, in order, as a compact JSON array.
pub fn encode_events(records: &[OutputEventRecord], style: DateStyle) -> CalFeedResult<String> {
    serde_json::to_string(&views(records, style))
        .map_err(|e| CalFeedError::Serialization(e.to_string()))
}

/// Like [`encode_events`], indented for reading.
pub fn encode_events_pretty(
    records: &[OutputEventRecord],
    style: DateStyle,
) -> CalFeedResult<String> {
    serde_json::to_string_pretty(&views(records, style))
        .map_err(|e| CalFeedError::Serialization(e.to_string()))
}
