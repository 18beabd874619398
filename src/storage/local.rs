//! Local filesystem storage implementation.
//!
//! Keeps the whole showtime table as one JSON object keyed by the
//! composite storage key, for development and tests. Production
//! deployments should use `DynamoStore`.

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::{AppError, Result};
use crate::models::Showtime;
use crate::storage::ShowtimeStore;

/// One persisted showtime row.
///
/// `starts_at` is flattened to RFC 3339 text so the file stays readable
/// and stable across time zone data updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredRecord {
    series: String,
    title: String,
    starts_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
}

impl From<&Showtime> for StoredRecord {
    fn from(showtime: &Showtime) -> Self {
        Self {
            series: showtime.series.clone(),
            title: showtime.title.clone(),
            starts_at: showtime.starts_at.to_rfc3339(),
            url: showtime.url.clone(),
        }
    }
}

/// Local filesystem storage backend.
pub struct LocalStore {
    path: PathBuf,
    // Serializes read-modify-write cycles across concurrent workers.
    write_lock: Mutex<()>,
}

impl LocalStore {
    /// Create a new LocalStore backed by the given JSON file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Number of stored records.
    pub async fn len(&self) -> Result<usize> {
        Ok(self.read_map().await?.len())
    }

    async fn read_map(&self) -> Result<BTreeMap<String, StoredRecord>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Write the map atomically (write to temp, then rename).
    async fn write_map(&self, map: &BTreeMap<String, StoredRecord>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let bytes = serde_json::to_vec_pretty(map)?;
        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl ShowtimeStore for LocalStore {
    async fn put_showtime(&self, showtime: &Showtime) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut map = self.read_map().await?;
        map.insert(showtime.storage_key(), StoredRecord::from(showtime));
        self.write_map(&map).await
    }
}
