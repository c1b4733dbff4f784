mod commands;
mod render;

use std::path::PathBuf;

use anyhow::Result;
use calfeed_core::{CalendarFeed, CalendarSource, DateRange, DateStyle, Query, Settings};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "calfeed")]
#[command(about = "Turn iCalendar feeds into display-ready event lists")]
struct Cli {
    /// Config file (default: ~/.config/calfeed/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log diagnostics to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct QueryArgs {
    /// Calendar URL (http, https, webcal) or path to an .ics file
    source: String,

    /// Only events after this date (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    from: Option<String>,

    /// Only events before this date (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    to: Option<String>,

    /// One record per recurring series instead of one per occurrence
    #[arg(long)]
    collapse: bool,

    /// Time zone for calendars that do not declare one
    #[arg(long)]
    timezone: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print events as a JSON array
    Events {
        #[command(flatten)]
        query: QueryArgs,

        /// Date rendering: "iso" or "legacy"
        #[arg(long)]
        date_style: Option<DateStyle>,

        /// Indent the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Print an agenda grouped by day
    List {
        #[command(flatten)]
        query: QueryArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Events {
            query,
            date_style,
            pretty,
        } => {
            if let Some(style) = date_style {
                settings.date_style = style;
            }
            let (source, query) = resolve_query(&mut settings, query)?;
            commands::events::run(&CalendarFeed::new(settings), &source, &query, pretty).await
        }
        Commands::List { query } => {
            let (source, query) = resolve_query(&mut settings, query)?;
            commands::list::run(&CalendarFeed::new(settings), &source, &query).await
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

/// Apply per-invocation overrides and build the query.
fn resolve_query(settings: &mut Settings, args: QueryArgs) -> Result<(CalendarSource, Query)> {
    if let Some(zone) = args.timezone {
        settings.default_timezone = Some(zone);
        settings.validate()?;
    }

    let source: CalendarSource = args.source.parse()?;
    let range = DateRange::from_args(args.from.as_deref(), args.to.as_deref())
        .map_err(|e| anyhow::anyhow!(e))?;

    Ok((source, Query::new(range, args.collapse)))
}
