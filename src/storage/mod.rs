//! Storage abstractions for showtime persistence.
//!
//! Every backend exposes a single upsert-style put, invoked once per
//! record with no batching and no cross-record transaction. Records are
//! keyed by the `(title, starts_at)` composite so repeated runs against an
//! unchanged calendar page converge instead of accumulating duplicates.

#[cfg(feature = "dynamodb")]
pub mod dynamo;
pub mod local;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Showtime;

// Re-export for convenience
#[cfg(feature = "dynamodb")]
pub use dynamo::DynamoStore;
pub use local::LocalStore;

/// Trait for showtime storage backends.
#[async_trait]
pub trait ShowtimeStore: Send + Sync {
    /// Upsert one showtime record.
    ///
    /// A failure here concerns this record only; callers keep processing
    /// the rest of the batch.
    async fn put_showtime(&self, showtime: &Showtime) -> Result<()>;
}
