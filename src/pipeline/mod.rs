//! Pipeline entry points for scraper operations.
//!
//! - `run_pipeline`: one full scrape → normalize → store pass
//! - `run_preview`: scrape and normalize only, nothing stored

pub mod run;

pub use run::{RecordOutcome, RunSummary, process_batch, run_pipeline, run_preview};
