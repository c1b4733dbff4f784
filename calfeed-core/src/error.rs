//! Error types for calfeed.

use thiserror::Error;

/// Errors that can abort a calendar conversion.
///
/// Problems confined to a single event (missing DTSTART, unreadable RRULE,
/// an override without its master) are not errors: they are logged and the
/// event is skipped or downgraded.
#[derive(Error, Debug)]
pub enum CalFeedError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("ICS parse error: {0}")]
    IcsParse(String),

    #[error("Invalid recurrence rule: {0}")]
    RRule(String),

    #[error("Unknown time zone: {0}")]
    Timezone(String),

    #[error("Failed to fetch calendar: {0}")]
    Fetch(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for calfeed operations.
pub type CalFeedResult<T> = Result<T, CalFeedError>;
