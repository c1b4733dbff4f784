use anyhow::Result;
use calfeed_core::{CalendarFeed, CalendarSource, Query};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use owo_colors::OwoColorize;

use crate::render::Render;

pub async fn run(feed: &CalendarFeed, source: &CalendarSource, query: &Query) -> Result<()> {
    let mut records = feed.events(source, query).await?;

    // Sort by start time
    records.sort_by(|a, b| a.start.cmp(&b.start));

    if records.is_empty() {
        println!("{}", "No events found".dimmed());
        return Ok(());
    }

    // Group events by day and print
    let mut current_date: Option<String> = None;

    for record in &records {
        let date_label = format_date_label(&record.start, Utc::now());

        if current_date.as_ref() != Some(&date_label) {
            if current_date.is_some() {
                println!();
            }
            println!("{}", date_label.bold());
            current_date = Some(date_label);
        }

        println!("  {}", record.render());
    }

    Ok(())
}

/// Format a date as a human-readable label (e.g. "Today", "Tomorrow", "Wed Feb 25")
fn format_date_label(start: &DateTime<Tz>, now: DateTime<Utc>) -> String {
    let today = now.with_timezone(&start.timezone()).date_naive();
    let date = start.date_naive();

    match (date - today).num_days() {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        _ => date.format("%a %b %-d %Y").to_string(),
    }
}
