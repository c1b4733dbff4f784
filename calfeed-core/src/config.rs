//! User settings at ~/.config/calfeed/config.toml, overridable from the
//! environment (`CALFEED_MAX_OCCURRENCES=200`, ...).

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::encode::DateStyle;
use crate::error::{CalFeedError, CalFeedResult};
use crate::resolver::DEFAULT_MAX_OCCURRENCES;
use crate::timezone::resolve_name;

static DEFAULT_FETCH_TIMEOUT: &str = "30s";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Zone for documents that do not name one. Host zone when unset.
    pub default_timezone: Option<String>,
    pub date_style: DateStyle,
    /// Cap on occurrences generated per recurring event
    pub max_occurrences: u16,
    /// Human-readable duration, e.g. "30s" or "2m"
    pub fetch_timeout: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            default_timezone: None,
            date_style: DateStyle::default(),
            max_occurrences: DEFAULT_MAX_OCCURRENCES,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT.to_string(),
        }
    }
}

impl Settings {
    pub fn config_path() -> CalFeedResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CalFeedError::Config("Could not determine config directory".into()))?
            .join("calfeed");

        Ok(config_dir.join("config.toml"))
    }

    /// Load settings from `path`, or from the default location.
    ///
    /// An explicit path must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> CalFeedResult<Self> {
        let source = match path {
            Some(p) => {
                let expanded = shellexpand::tilde(&p.to_string_lossy()).into_owned();
                File::from(PathBuf::from(expanded)).required(true)
            }
            None => File::from(Self::config_path()?).required(false),
        };

        let settings: Settings = Config::builder()
            .add_source(source)
            .add_source(Environment::with_prefix("CALFEED").try_parsing(true))
            .build()
            .map_err(|e| CalFeedError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| CalFeedError::Config(e.to_string()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Check values that deserialize fine but are unusable.
    pub fn validate(&self) -> CalFeedResult<()> {
        if let Some(zone) = &self.default_timezone {
            if resolve_name(zone).is_none() {
                return Err(CalFeedError::Timezone(zone.clone()));
            }
        }
        if self.max_occurrences == 0 {
            return Err(CalFeedError::Config(
                "max_occurrences must be at least 1".to_string(),
            ));
        }
        self.fetch_timeout()?;
        Ok(())
    }

    pub fn fetch_timeout(&self) -> CalFeedResult<Duration> {
        humantime::parse_duration(&self.fetch_timeout).map_err(|e| {
            CalFeedError::Config(format!("Invalid fetch_timeout '{}': {}", self.fetch_timeout, e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn defaults() {
        let settings = Settings::default();

        assert_eq!(settings.default_timezone, None);
        assert_eq!(settings.date_style, DateStyle::Iso);
        assert_eq!(settings.max_occurrences, 1000);
        assert_eq!(settings.fetch_timeout().unwrap(), Duration::from_secs(30));
    }

    #[test]
    fn load_reads_toml_file() {
        let (_dir, path) = write_config(
            r#"
default_timezone = "Europe/Paris"
date_style = "legacy"
max_occurrences = 250
fetch_timeout = "2m"
"#,
        );

        let settings = Settings::load(Some(&path)).unwrap();

        assert_eq!(settings.default_timezone.as_deref(), Some("Europe/Paris"));
        assert_eq!(settings.date_style, DateStyle::Legacy);
        assert_eq!(settings.max_occurrences, 250);
        assert_eq!(settings.fetch_timeout().unwrap(), Duration::from_secs(120));
    }

    #[test]
    fn load_fills_missing_keys_with_defaults() {
        let (_dir, path) = write_config("date_style = \"legacy\"\n");

        let settings = Settings::load(Some(&path)).unwrap();

        assert_eq!(settings.date_style, DateStyle::Legacy);
        assert_eq!(settings.max_occurrences, DEFAULT_MAX_OCCURRENCES);
        assert_eq!(settings.fetch_timeout, "30s");
    }

    #[test]
    fn explicit_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");

        assert!(matches!(
            Settings::load(Some(&missing)),
            Err(CalFeedError::Config(_))
        ));
    }

    #[test]
    fn unknown_default_timezone_is_rejected() {
        let (_dir, path) = write_config("default_timezone = \"Mars/Base\"\n");

        assert!(matches!(
            Settings::load(Some(&path)),
            Err(CalFeedError::Timezone(_))
        ));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let bad_timeout = Settings {
            fetch_timeout: "soon".to_string(),
            ..Default::default()
        };
        assert!(bad_timeout.validate().is_err());

        let zero_cap = Settings {
            max_occurrences: 0,
            ..Default::default()
        };
        assert!(zero_cap.validate().is_err());

        let (_dir, path) = write_config("date_style = \"fancy\"\n");
        assert!(Settings::load(Some(&path)).is_err());
    }

    #[test]
    fn config_path_ends_in_calfeed_dir() {
        let path = Settings::config_path().unwrap();
        assert!(path.ends_with("calfeed/config.toml"));
    }
}
