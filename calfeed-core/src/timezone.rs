//! Time zone resolution for calendar documents and individual values.

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use tracing::{debug, warn};

/// Windows zone names some producers (Outlook, Exchange) put in TZID or
/// X-WR-TIMEZONE instead of IANA names.
static WINDOWS_ZONES: &[(&str, &str)] = &[
    ("W. Europe Standard Time", "Europe/Berlin"),
    ("W. European Standard Time", "Europe/Berlin"),
    ("Romance Standard Time", "Europe/Paris"),
    ("Central Europe Standard Time", "Europe/Budapest"),
    ("Central European Standard Time", "Europe/Warsaw"),
    ("GMT Standard Time", "Europe/London"),
    ("GTB Standard Time", "Europe/Bucharest"),
    ("FLE Standard Time", "Europe/Kiev"),
    ("E. Europe Standard Time", "Europe/Chisinau"),
    ("Russian Standard Time", "Europe/Moscow"),
    ("Eastern Standard Time", "America/New_York"),
    ("Central Standard Time", "America/Chicago"),
    ("Mountain Standard Time", "America/Denver"),
    ("Pacific Standard Time", "America/Los_Angeles"),
    ("India Standard Time", "Asia/Calcutta"),
    ("China Standard Time", "Asia/Shanghai"),
    ("Tokyo Standard Time", "Asia/Tokyo"),
    ("AUS Eastern Standard Time", "Australia/Sydney"),
    ("UTC", "UTC"),
];

/// Resolve a zone name (IANA or Windows alias) to a `Tz`.
pub fn resolve_name(name: &str) -> Option<Tz> {
    let name = name.trim().trim_matches('"');
    if name.is_empty() {
        return None;
    }

    if let Ok(tz) = name.parse::<Tz>() {
        return Some(tz);
    }

    WINDOWS_ZONES
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(name))
        .and_then(|(_, iana)| iana.parse::<Tz>().ok())
}

/// Pick the zone a whole document is interpreted in.
///
/// Candidates are tried in order: the zones the document names, the
/// configured fallback, the host zone, and finally UTC.
pub fn resolve_document_zone(document_hints: &[&str], configured: Option<&str>) -> Tz {
    for candidate in document_hints.iter().copied().chain(configured) {
        match resolve_name(candidate) {
            Some(tz) => return tz,
            None => warn!(zone = candidate, "Ignoring unknown time zone"),
        }
    }

    match iana_time_zone::get_timezone() {
        Ok(host) => {
            if let Some(tz) = resolve_name(&host) {
                debug!(zone = tz.name(), "Using host time zone");
                return tz;
            }
        }
        Err(e) => debug!(error = %e, "Could not determine host time zone"),
    }

    Tz::UTC
}

/// Attach a zone to a wall-clock time.
///
/// Ambiguous times (DST fall-back) take the earlier instant. Times that do
/// not exist (DST spring-forward gap) are moved forward by one hour.
pub fn localize(zone: Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    zone.from_local_datetime(&naive)
        .earliest()
        .or_else(|| {
            zone.from_local_datetime(&(naive + Duration::hours(1)))
                .earliest()
        })
        .unwrap_or_else(|| zone.from_utc_datetime(&naive))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    #[test]
    fn resolves_iana_names() {
        assert_eq!(resolve_name("Europe/Paris"), Some(chrono_tz::Europe::Paris));
        assert_eq!(resolve_name(" America/New_York "), Some(chrono_tz::America::New_York));
    }

    #[test]
    fn resolves_windows_aliases() {
        assert_eq!(resolve_name("W. Europe Standard Time"), Some(chrono_tz::Europe::Berlin));
        assert_eq!(resolve_name("W. European Standard Time"), Some(chrono_tz::Europe::Berlin));
        assert_eq!(resolve_name("pacific standard time"), Some(chrono_tz::America::Los_Angeles));
    }

    #[test]
    fn unknown_names_do_not_resolve() {
        assert_eq!(resolve_name("Mars/Olympus_Mons"), None);
        assert_eq!(resolve_name(""), None);
    }

    #[test]
    fn document_zone_prefers_document_hint() {
        let tz = resolve_document_zone(&["Asia/Tokyo", "Europe/Berlin"], Some("Europe/Paris"));
        assert_eq!(tz, chrono_tz::Asia::Tokyo);

        let tz = resolve_document_zone(&["Nowhere/Special", "Europe/Berlin"], Some("Europe/Paris"));
        assert_eq!(tz, chrono_tz::Europe::Berlin);
    }

    #[test]
    fn document_zone_falls_back_to_configured() {
        let tz = resolve_document_zone(&["Nowhere/Special"], Some("Europe/Paris"));
        assert_eq!(tz, chrono_tz::Europe::Paris);

        let tz = resolve_document_zone(&[], Some("Europe/Paris"));
        assert_eq!(tz, chrono_tz::Europe::Paris);
    }

    #[test]
    fn localize_skips_dst_gap() {
        // 2024-03-31 02:30 does not exist in Paris
        let naive = NaiveDate::from_ymd_opt(2024, 3, 31)
            .unwrap()
            .and_hms_opt(2, 30, 0)
            .unwrap();
        let dt = localize(chrono_tz::Europe::Paris, naive);
        assert_eq!(dt.hour(), 3);
        assert_eq!(dt.minute(), 30);
    }

    #[test]
    fn localize_takes_earliest_on_overlap() {
        // 2024-10-27 02:30 happens twice in Paris
        let naive = NaiveDate::from_ymd_opt(2024, 10, 27)
            .unwrap()
            .and_hms_opt(2, 30, 0)
            .unwrap();
        let dt = localize(chrono_tz::Europe::Paris, naive);
        assert_eq!(dt.naive_utc().hour(), 0);
    }
}
