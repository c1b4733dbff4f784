//! Terminal rendering for calfeed-core types.
//!
//! Extension traits that add colored output to core types using owo_colors.

use calfeed_core::OutputEventRecord;
use owo_colors::OwoColorize;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for OutputEventRecord {
    fn render(&self) -> String {
        let time = if self.all_day {
            format!("{:>7}", "all-day")
        } else {
            format!("{:>7}", self.start.format("%H:%M"))
        };

        let title = if self.title.is_empty() {
            "(No title)"
        } else {
            self.title.as_str()
        };
        let title = if self.status.eq_ignore_ascii_case("CANCELLED") {
            title.strikethrough().to_string()
        } else {
            title.to_string()
        };

        let mut line = format!("{} {}", time, title);

        if !self.location.is_empty() {
            line.push_str(&format!(" {}", format!("@ {}", self.location).dimmed()));
        }

        if self.recurrent {
            let freq = self
                .recurrence_freq
                .map(|label| label.as_str().to_lowercase())
                .unwrap_or_default();
            let until = self
                .rec_end_date
                .map(|end| format!(" until {}", end.format("%Y-%m-%d")))
                .unwrap_or_default();
            line.push_str(&format!(" {}", format!("[{}{}]", freq, until).cyan()));
        }

        if !self.modifications.is_empty() {
            let changed = format!("({} changed)", self.modifications.len());
            line.push_str(&format!(" {}", changed.yellow()));
        }

        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calfeed_core::{FrequencyLabel, OverrideModification};
    use chrono::{Duration, TimeZone};
    use chrono_tz::Europe::Paris;

    fn record() -> OutputEventRecord {
        let start = Paris.with_ymd_and_hms(2024, 1, 8, 9, 30, 0).unwrap();
        OutputEventRecord {
            id: "evt".to_string(),
            title: "Planning".to_string(),
            description: String::new(),
            location: String::new(),
            status: String::new(),
            start,
            end: start + Duration::hours(1),
            all_day: false,
            recurrent: false,
            rec_end_date: None,
            recurrence_freq: None,
            group_id: None,
            modifications: Vec::new(),
        }
    }

    #[test]
    fn timed_event_shows_start_time() {
        let line = record().render();
        assert!(line.contains("09:30"));
        assert!(line.contains("Planning"));
    }

    #[test]
    fn all_day_event_has_no_time() {
        let mut r = record();
        r.all_day = true;
        let line = r.render();
        assert!(line.contains("all-day"));
        assert!(!line.contains("09:30"));
    }

    #[test]
    fn collapsed_series_shows_frequency_and_changes() {
        let mut r = record();
        r.recurrent = true;
        r.recurrence_freq = Some(FrequencyLabel::Workdays);
        r.rec_end_date = Some(r.start + Duration::days(30));
        r.add_modification(OverrideModification::from_draft(r.start, &record()));

        let line = r.render();
        assert!(line.contains("workdays until 2024-02-07"));
        assert!(line.contains("(1 changed)"));
    }

    #[test]
    fn untitled_event_gets_placeholder() {
        let mut r = record();
        r.title = String::new();
        assert!(r.render().contains("(No title)"));
    }
}
