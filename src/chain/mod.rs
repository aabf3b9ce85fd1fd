//! Ledger access: the Sui fullnode JSON-RPC client.

mod sui;

pub use sui::*;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::crypto::Credential;
use crate::domain::{Handout, HandoutId, SuiAddress, TransactionDigest};

/// Errors from the ledger collaborator.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    /// Transport-level failure talking to the fullnode.
    #[error("fullnode request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The fullnode answered with a non-success HTTP status.
    #[error("fullnode responded with status {0}")]
    Status(u16),

    /// JSON-RPC level error returned by the fullnode.
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The transaction executed but failed on-chain.
    #[error("transaction execution failed: {0}")]
    Execution(String),

    /// A response was missing an expected field.
    #[error("malformed rpc response: missing {0}")]
    MissingField(&'static str),

    /// Transaction bytes from the fullnode were not valid base64.
    #[error("transaction bytes were not valid base64")]
    InvalidTxBytes,
}

/// Read/write access to the external ledger.
///
/// The write path submits exactly one signed single-call transaction per
/// invocation: no retries, no gas backoff, no idempotency key. Re-submitting
/// against an already-verified Handout is decided by the ledger, not here.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Ledger: Send + Sync {
    /// List Handout objects owned by an address.
    async fn owned_handouts(&self, owner: &SuiAddress) -> Result<Vec<Handout>, ChainError>;

    /// Build, sign, and execute the `verify_handout` Move call against the
    /// given Handout object. Returns the transaction digest on success.
    async fn submit_verification(
        &self,
        handout_id: &HandoutId,
        credential: &Credential,
    ) -> Result<TransactionDigest, ChainError>;
}
