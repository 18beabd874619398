// src/lambda.rs

//! AWS Lambda handler for the scraper.
//!
//! This module provides the Lambda function entry point that:
//! 1. Builds configuration from environment variables
//! 2. Scrapes the venue calendar page
//! 3. Normalizes and stores each showtime in DynamoDB

use std::sync::Arc;

use lambda_runtime::{Error as LambdaError, LambdaEvent};

use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::error::{AppError, Result};
use crate::models::{Config, StorageBackend};
use crate::pipeline::{self, RunSummary};
use crate::storage::DynamoStore;

/// Lambda invocation payload.
#[derive(Debug, Deserialize)]
pub struct ScrapeRequest {
    /// Scrape and normalize only; skip all stores
    #[serde(default)]
    pub dry_run: bool,
}

/// Lambda response payload.
#[derive(Debug, Default, Serialize)]
pub struct ScrapeResponse {
    /// Whether the run was successful
    pub success: bool,

    /// Number of raw entries scraped from the page
    pub scraped: usize,

    /// Number of records stored
    pub stored: usize,

    /// Number of entries rejected by validation
    pub rejected: usize,

    /// Number of records the backend refused
    pub store_failures: usize,

    /// Error message if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Execution time in milliseconds
    pub execution_time_ms: u64,
}

impl ScrapeResponse {
    fn from_summary(summary: &RunSummary) -> Self {
        Self {
            success: true,
            scraped: summary.scraped,
            stored: summary.stored,
            rejected: summary.rejected,
            store_failures: summary.store_failures,
            ..Self::default()
        }
    }
}

/// Main Lambda handler function.
#[instrument(skip(event))]
pub async fn handler(
    event: LambdaEvent<ScrapeRequest>,
) -> std::result::Result<ScrapeResponse, LambdaError> {
    let start = std::time::Instant::now();
    let (request, _context) = event.into_parts();

    info!("Starting scrape: dry_run={}", request.dry_run);

    match run_scrape(&request).await {
        Ok(summary) => {
            let mut response = ScrapeResponse::from_summary(&summary);
            response.execution_time_ms = start.elapsed().as_millis() as u64;
            info!(
                "Scrape completed: {} scraped, {} stored, {} rejected, {} store failures in {}ms",
                response.scraped,
                response.stored,
                response.rejected,
                response.store_failures,
                response.execution_time_ms
            );
            Ok(response)
        }
        Err(e) => {
            error!("Scrape failed: {}", e);
            Ok(ScrapeResponse {
                success: false,
                error: Some(e.to_string()),
                execution_time_ms: start.elapsed().as_millis() as u64,
                ..ScrapeResponse::default()
            })
        }
    }
}

/// Internal scrape logic.
async fn run_scrape(request: &ScrapeRequest) -> Result<RunSummary> {
    let config = Arc::new(load_lambda_config()?);

    if request.dry_run {
        return pipeline::run_preview(config).await;
    }

    let store = DynamoStore::from_config(&config.storage).await;
    pipeline::run_pipeline(config, &store).await
}

/// Load configuration suitable for Lambda environment.
fn load_lambda_config() -> Result<Config> {
    // In Lambda, use environment variables or defaults
    let mut config = Config::default();
    config.storage.backend = StorageBackend::Dynamodb;

    if let Ok(table) = std::env::var("SHOWTIMES_TABLE") {
        config.storage.table_name = table;
    }

    if let Ok(endpoint) = std::env::var("DYNAMODB_ENDPOINT") {
        config.storage.endpoint_override = Some(endpoint);
    } else if std::env::var("ENVIRONMENT").as_deref() == Ok("development") {
        config.storage.endpoint_override = Some("http://localhost:8000".to_string());
    }

    if let Ok(zone) = std::env::var("VENUE_TIME_ZONE") {
        config.normalize.time_zone = zone
            .parse()
            .map_err(|e| AppError::config(format!("invalid VENUE_TIME_ZONE: {e}")))?;
    }

    if let Ok(concurrent) = std::env::var("MAX_CONCURRENT") {
        if let Ok(n) = concurrent.parse() {
            config.scrape.max_concurrent = n;
        }
    }

    if let Ok(deadline) = std::env::var("DEADLINE_SECS") {
        if let Ok(secs) = deadline.parse() {
            config.scrape.deadline_secs = secs;
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scrape_request_defaults() {
        let json = r#"{}"#;
        let req: ScrapeRequest = serde_json::from_str(json).unwrap();
        assert!(!req.dry_run);
    }

    #[test]
    fn test_scrape_request_with_options() {
        let json = r#"{"dry_run": true}"#;
        let req: ScrapeRequest = serde_json::from_str(json).unwrap();
        assert!(req.dry_run);
    }

    #[test]
    fn test_response_omits_absent_error() {
        let summary = RunSummary {
            scraped: 2,
            stored: 2,
            ..RunSummary::default()
        };
        let json = serde_json::to_string(&ScrapeResponse::from_summary(&summary)).unwrap();
        assert!(!json.contains("\"error\""));
        assert!(json.contains("\"stored\":2"));
    }
}
