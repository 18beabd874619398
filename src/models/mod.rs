// src/models/mod.rs

//! Domain models for the scraper application.

mod config;
mod showtime;

// Re-export all public types
pub use config::{
    CalendarSelectors, Config, NormalizeConfig, ScrapeConfig, StorageBackend, StorageConfig,
    VenueConfig,
};
pub use showtime::{RawShowtime, Showtime};
