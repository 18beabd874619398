//! Application configuration structures.

use std::fs;
use std::path::Path;

use chrono_tz::Tz;
use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Venue location settings
    #[serde(default)]
    pub venue: VenueConfig,

    /// CSS selectors describing the calendar page structure
    #[serde(default)]
    pub selectors: CalendarSelectors,

    /// HTTP and run behavior settings
    #[serde(default)]
    pub scrape: ScrapeConfig,

    /// Date/time normalization settings
    #[serde(default)]
    pub normalize: NormalizeConfig,

    /// Storage backend settings
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.scrape.user_agent.trim().is_empty() {
            return Err(AppError::validation("scrape.user_agent is empty"));
        }
        if self.scrape.timeout_secs == 0 {
            return Err(AppError::validation("scrape.timeout_secs must be > 0"));
        }
        if self.scrape.max_concurrent == 0 {
            return Err(AppError::validation("scrape.max_concurrent must be > 0"));
        }
        if self.scrape.deadline_secs == 0 {
            return Err(AppError::validation("scrape.deadline_secs must be > 0"));
        }
        url::Url::parse(&self.venue.base_url)
            .map_err(|e| AppError::validation(format!("venue.base_url is invalid: {e}")))?;
        if !self.venue.calendar_path.starts_with('/') {
            return Err(AppError::validation(
                "venue.calendar_path must start with '/'",
            ));
        }
        if self.normalize.date_time_layout.trim().is_empty() {
            return Err(AppError::validation("normalize.date_time_layout is empty"));
        }
        if self.storage.table_name.trim().is_empty() {
            return Err(AppError::validation("storage.table_name is empty"));
        }
        self.selectors.validate()?;
        Ok(())
    }
}

/// Venue location settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueConfig {
    /// Origin of the venue site, used to resolve relative detail links
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Path of the calendar page under the venue origin
    #[serde(default = "defaults::calendar_path")]
    pub calendar_path: String,
}

impl VenueConfig {
    /// Full URL of the calendar page.
    pub fn calendar_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.calendar_path)
    }
}

impl Default for VenueConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            calendar_path: defaults::calendar_path(),
        }
    }
}

/// CSS selectors describing the calendar page structure.
///
/// The calendar nests showtime markers inside event blocks inside day
/// containers; each selector below is evaluated relative to its parent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarSelectors {
    /// Selector for one day container
    #[serde(default = "defaults::day_selector")]
    pub day: String,

    /// Attribute on the day container holding the date token
    #[serde(default = "defaults::date_attr")]
    pub date_attr: String,

    /// Selector for one event block within a day
    #[serde(default = "defaults::event_selector")]
    pub event: String,

    /// Selector for the series label within an event
    #[serde(default = "defaults::series_selector")]
    pub series: String,

    /// Selector for the title label within an event
    #[serde(default = "defaults::title_selector")]
    pub title: String,

    /// Selector for one showtime marker within an event
    #[serde(default = "defaults::showtime_selector")]
    pub showtime: String,

    /// Selector for the leading element of a marker carrying the time text
    #[serde(default = "defaults::time_selector")]
    pub time: String,

    /// HTML attribute for detail-link extraction
    #[serde(default = "defaults::link_attr")]
    pub link_attr: String,
}

impl CalendarSelectors {
    /// Check that every selector parses as CSS.
    pub fn validate(&self) -> Result<()> {
        for (name, selector) in [
            ("selectors.day", &self.day),
            ("selectors.event", &self.event),
            ("selectors.series", &self.series),
            ("selectors.title", &self.title),
            ("selectors.showtime", &self.showtime),
            ("selectors.time", &self.time),
        ] {
            Selector::parse(selector)
                .map_err(|e| AppError::validation(format!("{name} is invalid: {e:?}")))?;
        }
        Ok(())
    }
}

impl Default for CalendarSelectors {
    fn default() -> Self {
        Self {
            day: defaults::day_selector(),
            date_attr: defaults::date_attr(),
            event: defaults::event_selector(),
            series: defaults::series_selector(),
            title: defaults::title_selector(),
            showtime: defaults::showtime_selector(),
            time: defaults::time_selector(),
            link_attr: defaults::link_attr(),
        }
    }
}

/// HTTP client and run behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Maximum concurrent normalize+store workers
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// Overall deadline for one run, covering fetch and all record work
    #[serde(default = "defaults::deadline")]
    pub deadline_secs: u64,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            max_concurrent: defaults::max_concurrent(),
            deadline_secs: defaults::deadline(),
        }
    }
}

/// Date/time normalization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizeConfig {
    /// IANA time zone the venue publishes times in
    #[serde(default = "defaults::time_zone")]
    pub time_zone: Tz,

    /// chrono layout for the joined "<date> <time>" token pair
    #[serde(default = "defaults::date_time_layout")]
    pub date_time_layout: String,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            time_zone: defaults::time_zone(),
            date_time_layout: defaults::date_time_layout(),
        }
    }
}

/// Storage backend choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// JSON map on the local filesystem
    #[default]
    Local,
    /// DynamoDB table (requires the `dynamodb` feature)
    Dynamodb,
}

/// Storage backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Which backend to write showtimes to
    #[serde(default)]
    pub backend: StorageBackend,

    /// DynamoDB table name
    #[serde(default = "defaults::table_name")]
    pub table_name: String,

    /// Endpoint override for local DynamoDB emulators
    #[serde(default)]
    pub endpoint_override: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            table_name: defaults::table_name(),
            endpoint_override: None,
        }
    }
}

mod defaults {
    use chrono_tz::Tz;

    // Venue defaults
    pub fn base_url() -> String {
        "https://hollywoodtheatre.org".into()
    }
    pub fn calendar_path() -> String {
        "/m/calendar/".into()
    }

    // Selector defaults
    pub fn day_selector() -> String {
        ".calendar__events__day".into()
    }
    pub fn date_attr() -> String {
        "data-calendar-date".into()
    }
    pub fn event_selector() -> String {
        ".calendar__events__day__event".into()
    }
    pub fn series_selector() -> String {
        ".calendar__events__day__event__series".into()
    }
    pub fn title_selector() -> String {
        ".calendar__events__day__event__title".into()
    }
    pub fn showtime_selector() -> String {
        ".showtime-square".into()
    }
    pub fn time_selector() -> String {
        ":first-child".into()
    }
    pub fn link_attr() -> String {
        "href".into()
    }

    // Scrape defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; marquee/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn max_concurrent() -> usize {
        5
    }
    pub fn deadline() -> u64 {
        120
    }

    // Normalize defaults
    pub fn time_zone() -> Tz {
        chrono_tz::America::Los_Angeles
    }
    pub fn date_time_layout() -> String {
        "%Y-%m-%d %l:%M %p".into()
    }

    // Storage defaults
    pub fn table_name() -> String {
        "HollywoodTheatreShowtimes".into()
    }
}
