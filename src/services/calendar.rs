// src/services/calendar.rs

//! Calendar page scraper service.
//!
//! Fetches the venue calendar and walks its DOM with configured CSS
//! selectors, producing one unvalidated [`RawShowtime`] per showtime marker.

use std::sync::Arc;

use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{CalendarSelectors, Config, RawShowtime};
use crate::utils::http;

/// Service for scraping showtimes from the venue calendar page.
pub struct CalendarScraper {
    config: Arc<Config>,
    client: reqwest::Client,
}

impl CalendarScraper {
    /// Create a new calendar scraper with the given configuration.
    pub fn new(config: Arc<Config>) -> Result<Self> {
        let client = http::create_async_client(&config.scrape)?;
        Ok(Self { config, client })
    }

    /// Fetch the calendar page and extract every showtime on it.
    ///
    /// A fetch failure is fatal for the whole batch; there is nothing to
    /// partially extract before the page arrives.
    pub async fn scrape(&self) -> Result<Vec<RawShowtime>> {
        let url = self.config.venue.calendar_url();
        let document = http::fetch_page_async(&self.client, &url).await?;
        extract_showtimes(&document, &self.config.selectors)
    }
}

/// Walk a parsed calendar document and collect raw showtimes.
///
/// Yields one entry per (day, event, showtime marker) in document order.
/// Nothing is validated here: absent labels become empty strings and are
/// left for the normalizer to judge.
pub fn extract_showtimes(
    document: &Html,
    selectors: &CalendarSelectors,
) -> Result<Vec<RawShowtime>> {
    let day_sel = parse_selector(&selectors.day)?;
    let event_sel = parse_selector(&selectors.event)?;
    let series_sel = parse_selector(&selectors.series)?;
    let title_sel = parse_selector(&selectors.title)?;
    let showtime_sel = parse_selector(&selectors.showtime)?;
    let time_sel = parse_selector(&selectors.time)?;

    let mut showtimes = Vec::new();

    for day in document.select(&day_sel) {
        let date = day
            .value()
            .attr(&selectors.date_attr)
            .unwrap_or_default()
            .trim()
            .to_string();

        for event in day.select(&event_sel) {
            let series = select_text(&event, &series_sel);
            let title = select_text(&event, &title_sel);

            for marker in event.select(&showtime_sel) {
                // The marker's leading element carries the visible time
                // text and, in link-bearing layouts, the detail href.
                let leading = marker.select(&time_sel).next();
                let time = leading.map(|el| element_text(&el)).unwrap_or_default();
                let detail_path = leading
                    .and_then(|el| el.value().attr(&selectors.link_attr))
                    .filter(|href| !href.is_empty())
                    .map(str::to_string);

                showtimes.push(RawShowtime {
                    series: series.clone(),
                    title: title.clone(),
                    date: date.clone(),
                    time,
                    detail_path,
                });
            }
        }
    }

    Ok(showtimes)
}

/// Trimmed, whitespace-normalized text of the first match under `scope`.
fn select_text(scope: &ElementRef, selector: &Selector) -> String {
    scope
        .select(selector)
        .next()
        .map(|el| element_text(&el))
        .unwrap_or_default()
}

fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}
