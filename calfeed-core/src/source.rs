//! Where a calendar document comes from: a URL or a local file.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::debug;
use url::Url;

use crate::error::{CalFeedError, CalFeedResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarSource {
    /// http(s) URL; `webcal://` is stored as `https://`
    Url(Url),
    File(PathBuf),
}

impl FromStr for CalendarSource {
    type Err = CalFeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(CalFeedError::Config("Empty calendar source".to_string()));
        }

        if let Ok(url) = Url::parse(s) {
            match url.scheme() {
                "http" | "https" => return Ok(CalendarSource::Url(url)),
                "webcal" | "webcals" => {
                    let rest = &url.as_str()[url.scheme().len()..];
                    let https = Url::parse(&format!("https{}", rest))
                        .map_err(|e| CalFeedError::Config(format!("Invalid URL '{}': {}", s, e)))?;
                    return Ok(CalendarSource::Url(https));
                }
                "file" => {
                    let path = url.to_file_path().map_err(|_| {
                        CalFeedError::Config(format!("Invalid file URL '{}'", s))
                    })?;
                    return Ok(CalendarSource::File(path));
                }
                // Anything else (including Windows drive letters) is a path
                _ => {}
            }
        }

        Ok(CalendarSource::File(PathBuf::from(
            shellexpand::tilde(s).into_owned(),
        )))
    }
}

impl fmt::Display for CalendarSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalendarSource::Url(url) => write!(f, "{}", url),
            CalendarSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

impl CalendarSource {
    /// Read the whole document as text.
    ///
    /// `timeout` bounds URL retrieval. Invalid UTF-8 is replaced rather than
    /// rejected, since some servers mislabel their encoding.
    pub async fn read(&self, timeout: Duration) -> CalFeedResult<String> {
        match self {
            CalendarSource::Url(url) => fetch_url(url, timeout).await,
            CalendarSource::File(path) => {
                let bytes = tokio::fs::read(path).await?;
                debug!(path = %path.display(), bytes = bytes.len(), "Read calendar file");
                Ok(String::from_utf8_lossy(&bytes).into_owned())
            }
        }
    }
}

async fn fetch_url(url: &Url, timeout: Duration) -> CalFeedResult<String> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| CalFeedError::Fetch(e.to_string()))?;

    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| CalFeedError::Fetch(format!("{}: {}", url, e)))?
        .error_for_status()
        .map_err(|e| CalFeedError::Fetch(format!("{}: {}", url, e)))?;

    let bytes = response
        .bytes()
        .await
        .map_err(|e| CalFeedError::Fetch(format!("{}: {}", url, e)))?;

    debug!(url = %url, bytes = bytes.len(), "Fetched calendar");
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
