//! HTTP client for the Walrus aggregator and publisher.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

use super::{BlobStore, StorageError};
use crate::domain::BlobId;

/// Walrus endpoint configuration.
#[derive(Debug, Clone)]
pub struct WalrusConfig {
    /// Base URL of the read aggregator.
    pub aggregator_url: String,
    /// Base URL of the write publisher.
    pub publisher_url: String,
    /// Per-request timeout applied to both endpoints.
    pub timeout: Duration,
}

/// Store receipt returned by the publisher. Two shapes exist depending on
/// whether the content was already certified.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreReceipt {
    newly_created: Option<NewlyCreated>,
    already_certified: Option<AlreadyCertified>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewlyCreated {
    blob_object: BlobObject,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlobObject {
    blob_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AlreadyCertified {
    blob_id: String,
}

impl StoreReceipt {
    fn blob_id(self) -> Result<BlobId, StorageError> {
        if let Some(created) = self.newly_created {
            return Ok(BlobId::new(created.blob_object.blob_id));
        }
        if let Some(certified) = self.already_certified {
            return Ok(BlobId::new(certified.blob_id));
        }
        Err(StorageError::UnexpectedReceipt)
    }
}

/// Reqwest-backed Walrus client.
pub struct WalrusClient {
    config: WalrusConfig,
    http: reqwest::Client,
}

impl WalrusClient {
    pub fn new(config: WalrusConfig) -> Result<Self, StorageError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { config, http })
    }

    fn read_url(&self, blob_id: &BlobId) -> String {
        format!(
            "{}/v1/{}",
            self.config.aggregator_url.trim_end_matches('/'),
            blob_id
        )
    }

    fn store_url(&self) -> String {
        format!("{}/v1/store", self.config.publisher_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl BlobStore for WalrusClient {
    #[instrument(skip(self), fields(blob_id = %blob_id))]
    async fn fetch(&self, blob_id: &BlobId) -> Result<Vec<u8>, StorageError> {
        let response = self.http.get(self.read_url(blob_id)).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let content = response.bytes().await?.to_vec();
        debug!(bytes = content.len(), "fetched blob from aggregator");
        Ok(content)
    }

    #[instrument(skip_all, fields(bytes = content.len()))]
    async fn store(&self, content: Vec<u8>) -> Result<BlobId, StorageError> {
        let response = self
            .http
            .put(self.store_url())
            .body(content)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let receipt: StoreReceipt = response.json().await?;
        let blob_id = receipt.blob_id()?;
        debug!(blob_id = %blob_id, "stored blob on publisher");
        Ok(blob_id)
    }
}
