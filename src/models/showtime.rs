//! Showtime data structures.

use chrono::DateTime;
use chrono_tz::Tz;

/// A showtime as scraped from the calendar page, before validation.
///
/// One instance per showtime marker found under each day/event block.
/// Fields the page did not provide are empty strings; nothing is checked
/// here, the normalizer decides what is usable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawShowtime {
    /// Series label, e.g. "Midnight Movies:" (may be empty)
    pub series: String,

    /// Film title (empty is rejected later)
    pub title: String,

    /// Free-text date token from the day container attribute
    pub date: String,

    /// Free-text time token from the showtime marker
    pub time: String,

    /// Relative detail-page link, when the layout carries one
    pub detail_path: Option<String>,
}

/// A validated, normalized showtime ready for persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Showtime {
    /// Series label with colons stripped
    pub series: String,

    /// Film title
    pub title: String,

    /// Start of the showing in the venue's time zone
    pub starts_at: DateTime<Tz>,

    /// Absolute detail-page URL, when the source carried a link
    pub url: Option<String>,
}

impl Showtime {
    /// Stable composite key for upsert-style stores.
    ///
    /// Repeated runs against an unchanged calendar page map to the same
    /// keys, so puts overwrite instead of accumulating duplicates.
    pub fn storage_key(&self) -> String {
        format!("{}|{}", self.title, self.starts_at.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::America::Los_Angeles;

    fn sample_showtime() -> Showtime {
        Showtime {
            series: "Midnight Movies".to_string(),
            title: "Alien".to_string(),
            starts_at: Los_Angeles.with_ymd_and_hms(2023, 11, 3, 22, 30, 0).unwrap(),
            url: Some("https://hollywoodtheatre.org/films/alien".to_string()),
        }
    }

    #[test]
    fn test_storage_key_combines_title_and_start() {
        let showtime = sample_showtime();
        assert_eq!(showtime.storage_key(), "Alien|2023-11-03T22:30:00-07:00");
    }

    #[test]
    fn test_storage_key_stable_across_clones() {
        let showtime = sample_showtime();
        assert_eq!(showtime.storage_key(), showtime.clone().storage_key());
    }
}
