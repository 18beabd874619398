//! AWS DynamoDB storage implementation.
//!
//! One `put_item` per record against a table with composite primary key
//! `(title, starts_at)`. Re-running against an unchanged calendar page
//! overwrites the same items rather than growing the table.

use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::AttributeValue;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::{Showtime, StorageConfig};
use crate::storage::ShowtimeStore;

/// DynamoDB-backed showtime storage.
pub struct DynamoStore {
    client: Client,
    table: String,
}

impl DynamoStore {
    /// Create a new DynamoDB storage instance.
    pub fn new(client: Client, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }

    /// Create DynamoDB storage from the application configuration.
    ///
    /// Honors `endpoint_override` so local emulators can stand in for the
    /// real service during development.
    pub async fn from_config(storage: &StorageConfig) -> Self {
        let shared = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;

        let client = match &storage.endpoint_override {
            Some(endpoint) => {
                log::info!("Using DynamoDB endpoint override: {}", endpoint);
                let conf = aws_sdk_dynamodb::config::Builder::from(&shared)
                    .endpoint_url(endpoint)
                    .build();
                Client::from_conf(conf)
            }
            None => Client::new(&shared),
        };

        Self::new(client, storage.table_name.clone())
    }
}

#[async_trait]
impl ShowtimeStore for DynamoStore {
    async fn put_showtime(&self, showtime: &Showtime) -> Result<()> {
        let mut request = self
            .client
            .put_item()
            .table_name(&self.table)
            .item("title", AttributeValue::S(showtime.title.clone()))
            .item(
                "starts_at",
                AttributeValue::S(showtime.starts_at.to_rfc3339()),
            )
            .item("series", AttributeValue::S(showtime.series.clone()));

        if let Some(url) = &showtime.url {
            request = request.item("url", AttributeValue::S(url.clone()));
        }

        request.send().await.map_err(|e| {
            AppError::storage(
                format!("put_item to {}", self.table),
                e.into_service_error(),
            )
        })?;

        Ok(())
    }
}
