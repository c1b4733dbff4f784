//! Display-ready event records, the output of the resolution engine.

use chrono::{DateTime, Duration};
use chrono_tz::Tz;

use crate::recurrence::FrequencyLabel;

/// One entry of the list a calendar UI renders.
///
/// Either a single event, one expanded occurrence of a series, or a whole
/// series collapsed into one record (`recurrent == true`).
#[derive(Debug, Clone, PartialEq)]
pub struct OutputEventRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub status: String,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    pub all_day: bool,

    // Collapsed series only
    pub recurrent: bool,
    pub rec_end_date: Option<DateTime<Tz>>,
    pub recurrence_freq: Option<FrequencyLabel>,

    /// Shared by all records generated from the same master (`{uid}_group`)
    pub group_id: Option<String>,
    /// Overridden occurrences of a collapsed series
    pub modifications: Vec<OverrideModification>,
}

impl OutputEventRecord {
    /// Elapsed time between start and end.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Wall-clock span between start and end, ignoring DST shifts in between.
    pub fn wall_clock_span(&self) -> Duration {
        self.end.naive_local() - self.start.naive_local()
    }

    pub fn add_modification(&mut self, modification: OverrideModification) {
        self.modifications.push(modification);
    }
}

/// Replacement details for one occurrence of a recurring series.
#[derive(Debug, Clone, PartialEq)]
pub struct OverrideModification {
    /// The occurrence being replaced (RECURRENCE-ID)
    pub original_date: DateTime<Tz>,
    pub modified_title: String,
    pub modified_description: String,
    pub modified_start: DateTime<Tz>,
    pub modified_end: DateTime<Tz>,
}

impl OverrideModification {
    /// Take the replacement values from an override's own draft record.
    pub fn from_draft(original_date: DateTime<Tz>, draft: &OutputEventRecord) -> Self {
        OverrideModification {
            original_date,
            modified_title: draft.title.clone(),
            modified_description: draft.description.clone(),
            modified_start: draft.start,
            modified_end: draft.end,
        }
    }
}
