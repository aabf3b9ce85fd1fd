//! Blob storage: the Walrus aggregator/publisher client.
//!
//! The worker treats Walrus as an opaque content-addressed store: bytes go
//! in via `PUT {publisher}/v1/store` and come back via
//! `GET {aggregator}/v1/{blobId}`. Certification and epoch metadata on the
//! store receipt are neither verified nor modified here.

mod walrus;

pub use walrus::*;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::domain::BlobId;

/// Errors from the blob storage collaborator.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Transport-level failure (connect, timeout, body read).
    #[error("storage request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The aggregator or publisher answered with a non-success status.
    #[error("storage responded with status {status}: {body}")]
    Status { status: u16, body: String },

    /// The publisher's store receipt matched neither known shape.
    #[error("unrecognized store receipt from publisher")]
    UnexpectedReceipt,
}

/// Content-addressed blob store.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Fetch the raw content of a blob. No retry; failures are terminal for
    /// the invocation.
    async fn fetch(&self, blob_id: &BlobId) -> Result<Vec<u8>, StorageError>;

    /// Upload opaque bytes and return the content identifier.
    async fn store(&self, content: Vec<u8>) -> Result<BlobId, StorageError>;
}
