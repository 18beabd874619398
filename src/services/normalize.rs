// src/services/normalize.rs

//! Raw showtime validation and normalization.
//!
//! Turns a [`RawShowtime`] into a canonical [`Showtime`] with a single
//! zone-aware timestamp, or rejects it with a per-field reason. Rejections
//! are returned, never logged here; diagnostics are the caller's job.

use chrono::{NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use thiserror::Error;

use crate::models::{Config, RawShowtime, Showtime};
use crate::utils::join_origin;

/// Why a raw showtime was rejected.
///
/// Each validation check has its own variant so outcomes are testable
/// without scraping log output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("missing title (series: {series:?})")]
    MissingTitle { series: String },

    #[error("missing date/time for {title:?} (date: {date:?}, time: {time:?})")]
    MissingDateTime {
        title: String,
        date: String,
        time: String,
    },

    #[error("unparseable date/time for {title:?} on {date:?} at {time:?}: {message}")]
    UnparseableDateTime {
        title: String,
        date: String,
        time: String,
        message: String,
    },
}

/// Validates raw showtimes and produces canonical records.
pub struct Normalizer {
    origin: String,
    time_zone: Tz,
    layout: String,
}

impl Normalizer {
    /// Create a normalizer from the application configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            origin: config.venue.base_url.clone(),
            time_zone: config.normalize.time_zone,
            layout: config.normalize.date_time_layout.clone(),
        }
    }

    /// Validate one raw showtime and convert it into a canonical record.
    pub fn normalize(&self, raw: &RawShowtime) -> Result<Showtime, RejectReason> {
        if raw.title.is_empty() {
            return Err(RejectReason::MissingTitle {
                series: raw.series.clone(),
            });
        }
        if raw.date.is_empty() || raw.time.is_empty() {
            return Err(RejectReason::MissingDateTime {
                title: raw.title.clone(),
                date: raw.date.clone(),
                time: raw.time.clone(),
            });
        }

        let starts_at = self.parse_starts_at(raw)?;
        let url = raw
            .detail_path
            .as_deref()
            .map(|path| join_origin(&self.origin, path));

        Ok(Showtime {
            // Colons collide with storage-key delimiters downstream.
            series: raw.series.replace(':', ""),
            title: raw.title.clone(),
            starts_at,
            url,
        })
    }

    /// Parse the date and time tokens into one timestamp in the venue zone.
    ///
    /// The tokens are joined with a single explicit space and the layout
    /// expects that space; the two must be kept in step if either changes.
    fn parse_starts_at(&self, raw: &RawShowtime) -> Result<chrono::DateTime<Tz>, RejectReason> {
        let joined = format!("{} {}", raw.date, raw.time);
        let naive = NaiveDateTime::parse_from_str(&joined, &self.layout).map_err(|e| {
            RejectReason::UnparseableDateTime {
                title: raw.title.clone(),
                date: raw.date.clone(),
                time: raw.time.clone(),
                message: e.to_string(),
            }
        })?;

        // Ambiguous local times (fall-back DST hour) resolve to the earlier
        // instant; nonexistent ones (spring-forward gap) are rejected.
        self.time_zone
            .from_local_datetime(&naive)
            .earliest()
            .ok_or_else(|| RejectReason::UnparseableDateTime {
                title: raw.title.clone(),
                date: raw.date.clone(),
                time: raw.time.clone(),
                message: format!("no such local time in {}", self.time_zone),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::America::Los_Angeles;

    fn normalizer() -> Normalizer {
        Normalizer::new(&Config::default())
    }

    fn raw_alien() -> RawShowtime {
        RawShowtime {
            series: "Midnight Movies:".to_string(),
            title: "Alien".to_string(),
            date: "2023-11-03".to_string(),
            time: "10:30 PM".to_string(),
            detail_path: Some("/films/alien".to_string()),
        }
    }

    #[test]
    fn test_normalize_happy_path() {
        let showtime = normalizer().normalize(&raw_alien()).unwrap();
        assert_eq!(showtime.series, "Midnight Movies");
        assert_eq!(showtime.title, "Alien");
        assert_eq!(
            showtime.starts_at,
            Los_Angeles.with_ymd_and_hms(2023, 11, 3, 22, 30, 0).unwrap()
        );
        assert_eq!(
            showtime.url.as_deref(),
            Some("https://hollywoodtheatre.org/films/alien")
        );
    }

    #[test]
    fn test_rejects_missing_title() {
        let raw = RawShowtime {
            title: String::new(),
            ..raw_alien()
        };
        assert!(matches!(
            normalizer().normalize(&raw),
            Err(RejectReason::MissingTitle { .. })
        ));
    }

    #[test]
    fn test_rejects_missing_date_or_time() {
        let no_date = RawShowtime {
            date: String::new(),
            ..raw_alien()
        };
        let no_time = RawShowtime {
            time: String::new(),
            ..raw_alien()
        };
        for raw in [no_date, no_time] {
            assert!(matches!(
                normalizer().normalize(&raw),
                Err(RejectReason::MissingDateTime { .. })
            ));
        }
    }

    #[test]
    fn test_unparseable_tokens_keep_originals() {
        let raw = RawShowtime {
            date: "Friday".to_string(),
            time: "late".to_string(),
            ..raw_alien()
        };
        match normalizer().normalize(&raw) {
            Err(RejectReason::UnparseableDateTime { date, time, .. }) => {
                assert_eq!(date, "Friday");
                assert_eq!(time, "late");
            }
            other => panic!("expected unparseable rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_no_other_rejection_paths() {
        // Empty series and absent detail path are both fine.
        let raw = RawShowtime {
            series: String::new(),
            detail_path: None,
            ..raw_alien()
        };
        let showtime = normalizer().normalize(&raw).unwrap();
        assert_eq!(showtime.series, "");
        assert_eq!(showtime.url, None);
    }

    #[test]
    fn test_strips_every_colon_and_nothing_else() {
        let raw = RawShowtime {
            series: ":Fri:ght Sch:ool:".to_string(),
            ..raw_alien()
        };
        let showtime = normalizer().normalize(&raw).unwrap();
        assert_eq!(showtime.series, "Fright School");
    }

    #[test]
    fn test_single_digit_day_and_hour_parse() {
        let raw = RawShowtime {
            date: "2023-11-3".to_string(),
            time: "9:05 PM".to_string(),
            ..raw_alien()
        };
        let showtime = normalizer().normalize(&raw).unwrap();
        assert_eq!(
            showtime.starts_at,
            Los_Angeles.with_ymd_and_hms(2023, 11, 3, 21, 5, 0).unwrap()
        );
    }

    #[test]
    fn test_morning_times_stay_am() {
        let raw = RawShowtime {
            time: "10:30 AM".to_string(),
            ..raw_alien()
        };
        let showtime = normalizer().normalize(&raw).unwrap();
        assert_eq!(
            showtime.starts_at,
            Los_Angeles.with_ymd_and_hms(2023, 11, 3, 10, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_nonexistent_local_time_is_rejected() {
        // 2:30 AM does not exist on the spring-forward date.
        let raw = RawShowtime {
            date: "2024-03-10".to_string(),
            time: "2:30 AM".to_string(),
            ..raw_alien()
        };
        assert!(matches!(
            normalizer().normalize(&raw),
            Err(RejectReason::UnparseableDateTime { .. })
        ));
    }

    #[test]
    fn test_ambiguous_local_time_takes_earlier_offset() {
        // 1:30 AM happens twice on the fall-back date; the PDT reading wins.
        let raw = RawShowtime {
            date: "2024-11-03".to_string(),
            time: "1:30 AM".to_string(),
            ..raw_alien()
        };
        let showtime = normalizer().normalize(&raw).unwrap();
        assert_eq!(showtime.starts_at.to_rfc3339(), "2024-11-03T01:30:00-07:00");
    }
}
