use anyhow::Result;
use calfeed_core::{CalendarFeed, CalendarSource, Query};

pub async fn run(
    feed: &CalendarFeed,
    source: &CalendarSource,
    query: &Query,
    pretty: bool,
) -> Result<()> {
    let records = feed.events(source, query).await?;
    tracing::debug!(records = records.len(), pretty, "Encoding events");

    let json = if pretty {
        feed.encode_pretty(&records)?
    } else {
        feed.encode(&records)?
    };

    println!("{}", json);
    Ok(())
}
