// src/pipeline/run.rs

//! One scrape-normalize-store pass per invocation.
//!
//! Extraction runs once and must finish before any record work starts; the
//! per-record steps then fan out across a bounded worker pool where each
//! worker owns exactly one raw entry end-to-end. Workers return outcomes
//! instead of firing and forgetting, so the caller gets aggregate counts
//! without scraping log output.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};

use crate::error::{AppError, Result};
use crate::models::{Config, RawShowtime, Showtime};
use crate::services::{CalendarScraper, Normalizer, RejectReason};
use crate::storage::ShowtimeStore;

/// Outcome of one record's normalize+store step.
#[derive(Debug)]
pub enum RecordOutcome {
    /// Normalized and persisted
    Stored(Showtime),
    /// Dropped by validation; the batch continues
    Rejected {
        raw: RawShowtime,
        reason: RejectReason,
    },
    /// Normalized but the backend refused the put; the batch continues
    StoreFailed { showtime: Showtime, error: AppError },
}

/// Aggregate counts for one run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub scraped: usize,
    pub stored: usize,
    pub rejected: usize,
    pub store_failures: usize,
}

impl RunSummary {
    fn tally(scraped: usize, outcomes: &[RecordOutcome]) -> Self {
        let mut summary = Self {
            scraped,
            ..Self::default()
        };
        for outcome in outcomes {
            match outcome {
                RecordOutcome::Stored(_) => summary.stored += 1,
                RecordOutcome::Rejected { .. } => summary.rejected += 1,
                RecordOutcome::StoreFailed { .. } => summary.store_failures += 1,
            }
        }
        summary
    }
}

/// Run one full pass: fetch the calendar, then normalize and store every
/// scraped entry.
///
/// Per-record rejections and storage failures are diagnostics, not errors;
/// only a fetch failure or deadline expiry fails the invocation.
pub async fn run_pipeline(config: Arc<Config>, store: &dyn ShowtimeStore) -> Result<RunSummary> {
    let deadline = Duration::from_secs(config.scrape.deadline_secs);
    tokio::time::timeout(deadline, run_once(Arc::clone(&config), store))
        .await
        .map_err(|_| AppError::Deadline(config.scrape.deadline_secs))?
}

async fn run_once(config: Arc<Config>, store: &dyn ShowtimeStore) -> Result<RunSummary> {
    let scraper = CalendarScraper::new(Arc::clone(&config))?;
    let batch = scraper.scrape().await?;
    Ok(process_batch(&config, store, batch).await)
}

/// Scrape and normalize without touching the store.
pub async fn run_preview(config: Arc<Config>) -> Result<RunSummary> {
    let scraper = CalendarScraper::new(Arc::clone(&config))?;
    let batch = scraper.scrape().await?;

    let normalizer = Normalizer::new(&config);
    let mut summary = RunSummary {
        scraped: batch.len(),
        ..RunSummary::default()
    };

    for raw in &batch {
        match normalizer.normalize(raw) {
            Ok(showtime) => {
                log::info!("Would store {:?} at {}", showtime.title, showtime.starts_at);
            }
            Err(reason) => {
                summary.rejected += 1;
                log::warn!("Rejected scraped entry {:?}: {}", raw, reason);
            }
        }
    }

    Ok(summary)
}

/// Fan a scraped batch across bounded normalize+store workers.
///
/// With zero records this completes as a trivial success.
pub async fn process_batch(
    config: &Config,
    store: &dyn ShowtimeStore,
    batch: Vec<RawShowtime>,
) -> RunSummary {
    let scraped = batch.len();
    let normalizer = Normalizer::new(config);
    let concurrency = config.scrape.max_concurrent.max(1);

    let outcomes: Vec<RecordOutcome> = stream::iter(batch)
        .map(|raw| {
            let normalizer = &normalizer;
            async move {
                match normalizer.normalize(&raw) {
                    Err(reason) => RecordOutcome::Rejected { raw, reason },
                    Ok(showtime) => match store.put_showtime(&showtime).await {
                        Ok(()) => RecordOutcome::Stored(showtime),
                        Err(error) => RecordOutcome::StoreFailed { showtime, error },
                    },
                }
            }
        })
        .buffer_unordered(concurrency)
        .collect()
        .await;

    for outcome in &outcomes {
        report(outcome);
    }

    RunSummary::tally(scraped, &outcomes)
}

fn report(outcome: &RecordOutcome) {
    match outcome {
        RecordOutcome::Stored(showtime) => {
            log::info!("Stored {:?} at {}", showtime.title, showtime.starts_at);
        }
        RecordOutcome::Rejected { raw, reason } => {
            log::warn!("Rejected scraped entry {:?}: {}", raw, reason);
        }
        RecordOutcome::StoreFailed { showtime, error } => {
            log::error!(
                "Failed to store {:?} at {}: {}",
                showtime.title,
                showtime.starts_at,
                error
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::TimeZone;
    use chrono_tz::America::Los_Angeles;
    use scraper::Html;

    use crate::services::extract_showtimes;

    /// In-memory sink recording every put.
    #[derive(Default)]
    struct MemoryStore {
        records: Mutex<Vec<Showtime>>,
    }

    #[async_trait]
    impl ShowtimeStore for MemoryStore {
        async fn put_showtime(&self, showtime: &Showtime) -> Result<()> {
            self.records.lock().unwrap().push(showtime.clone());
            Ok(())
        }
    }

    /// Sink that refuses a specific title and records the rest.
    struct FailingStore {
        poison_title: String,
        records: Mutex<Vec<Showtime>>,
    }

    impl FailingStore {
        fn new(poison_title: &str) -> Self {
            Self {
                poison_title: poison_title.to_string(),
                records: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ShowtimeStore for FailingStore {
        async fn put_showtime(&self, showtime: &Showtime) -> Result<()> {
            if showtime.title == self.poison_title {
                return Err(AppError::storage("put_showtime", "backend unavailable"));
            }
            self.records.lock().unwrap().push(showtime.clone());
            Ok(())
        }
    }

    fn raw(title: &str, time: &str) -> RawShowtime {
        RawShowtime {
            series: String::new(),
            title: title.to_string(),
            date: "2023-11-03".to_string(),
            time: time.to_string(),
            detail_path: None,
        }
    }

    #[tokio::test]
    async fn test_empty_batch_is_trivial_success() {
        let store = MemoryStore::default();
        let summary = process_batch(&Config::default(), &store, Vec::new()).await;
        assert_eq!(summary, RunSummary::default());
    }

    #[tokio::test]
    async fn test_storage_failure_is_isolated_per_record() {
        let store = FailingStore::new("Poison");
        let batch = vec![
            raw("Alien", "10:30 PM"),
            raw("Poison", "7:00 PM"),
            raw("Paris, Texas", "4:00 PM"),
        ];

        let summary = process_batch(&Config::default(), &store, batch).await;

        assert_eq!(summary.scraped, 3);
        assert_eq!(summary.stored, 2);
        assert_eq!(summary.store_failures, 1);
        assert_eq!(summary.rejected, 0);

        let mut stored: Vec<String> = store
            .records
            .lock()
            .unwrap()
            .iter()
            .map(|s| s.title.clone())
            .collect();
        stored.sort();
        assert_eq!(stored, vec!["Alien", "Paris, Texas"]);
    }

    #[tokio::test]
    async fn test_validation_failure_is_isolated_per_record() {
        let store = MemoryStore::default();
        let batch = vec![
            raw("Alien", "10:30 PM"),
            raw("Aliens", ""),
            raw("Alien 3", "9:00 PM"),
        ];

        let summary = process_batch(&Config::default(), &store, batch).await;

        assert_eq!(summary.stored, 2);
        assert_eq!(summary.rejected, 1);
        assert_eq!(summary.store_failures, 0);
        assert_eq!(store.records.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_end_to_end_single_showtime() {
        let html = r#"
            <div class="calendar__events__day" data-calendar-date="2023-11-03">
              <div class="calendar__events__day__event">
                <span class="calendar__events__day__event__series">Midnight Movies:</span>
                <span class="calendar__events__day__event__title">Alien</span>
                <div class="showtime-square"><a href="/films/alien">10:30 PM</a></div>
              </div>
            </div>
        "#;
        let config = Config::default();
        let batch = extract_showtimes(&Html::parse_document(html), &config.selectors).unwrap();
        let store = MemoryStore::default();

        let summary = process_batch(&config, &store, batch).await;
        assert_eq!(summary.scraped, 1);
        assert_eq!(summary.stored, 1);

        let records = store.records.lock().unwrap();
        assert_eq!(records.len(), 1);
        let showtime = &records[0];
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

    #[tokio::test]
    async fn test_end_to_end_empty_time_rejection() {
        let html = r#"
            <div class="calendar__events__day" data-calendar-date="2023-11-03">
              <div class="calendar__events__day__event">
                <span class="calendar__events__day__event__title">Alien</span>
                <div class="showtime-square"><a href="/films/alien"></a></div>
              </div>
            </div>
        "#;
        let config = Config::default();
        let batch = extract_showtimes(&Html::parse_document(html), &config.selectors).unwrap();
        assert_eq!(batch.len(), 1);

        let store = MemoryStore::default();
        let summary = process_batch(&config, &store, batch).await;

        assert_eq!(summary.stored, 0);
        assert_eq!(summary.rejected, 1);
        // The sink is never invoked for a rejected entry.
        assert!(store.records.lock().unwrap().is_empty());
    }
}
