// src/store/content.rs

//! Content store client
//!
//! Records live in a remote content API. The pipeline reads the full record
//! listing once at startup and writes each rewritten record back
//! individually; there is no partial-listing or paging support.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::error::{Error, Result};

/// A textual content record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    /// Store-assigned identifier, unique within the listing
    pub id: String,
    /// Full textual content, possibly containing resource references
    pub content: String,
}

/// Remote source of records and sink for rewritten content
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Fetch every record in the store
    async fn list_records(&self) -> Result<Vec<Record>>;

    /// Replace the content of a single record
    async fn update_record(&self, id: &str, content: &str) -> Result<()>;
}

/// HTTP client for a JSON record API
pub struct HttpContentStore {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpContentStore {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::InitError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

#[async_trait]
impl ContentStore for HttpContentStore {
    async fn list_records(&self) -> Result<Vec<Record>> {
        let url = format!("{}/records", self.base_url);
        debug!("Listing records from {}", url);

        let response = self
            .request(self.client.get(&url))
            .send()
            .await
            .map_err(|e| Error::StoreError(format!("Failed to list records: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::StoreError(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        let records: Vec<Record> = response
            .json()
            .await
            .map_err(|e| Error::StoreError(format!("Invalid record listing: {e}")))?;

        debug!("Listed {} records", records.len());
        Ok(records)
    }

    async fn update_record(&self, id: &str, content: &str) -> Result<()> {
        let url = format!("{}/records/{}", self.base_url, id);
        debug!("Updating record {}", id);

        let response = self
            .request(self.client.put(&url))
            .json(&serde_json::json!({ "content": content }))
            .send()
            .await
            .map_err(|e| Error::StoreError(format!("Failed to update record {id}: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::StoreError(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        Ok(())
    }
}
