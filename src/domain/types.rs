//! Identifier newtypes shared across the worker.
//!
//! All of these wrap the opaque string representations used on the wire:
//! Walrus blob ids, Sui object ids, Sui addresses, and transaction digests.
//! None of them are interpreted locally beyond non-emptiness.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Content identifier for a blob stored on the Walrus aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlobId(pub String);

impl BlobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for BlobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// On-chain object id of a Handout record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandoutId(pub String);

impl HandoutId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for HandoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hex-encoded Sui account address (`0x`-prefixed).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SuiAddress(pub String);

impl SuiAddress {
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SuiAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Base58 transaction digest returned by the fullnode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionDigest(pub String);

impl TransactionDigest {
    pub fn new(digest: impl Into<String>) -> Self {
        Self(digest.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Decision produced by a content predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    /// Whether the content is acceptable.
    pub accepted: bool,
    /// Diagnostic reason, set on rejection.
    pub reason: Option<String>,
}

impl Verdict {
    pub fn accept() -> Self {
        Self {
            accepted: true,
            reason: None,
        }
    }

    pub fn reject(reason: impl Into<String>) -> Self {
        Self {
            accepted: false,
            reason: Some(reason.into()),
        }
    }
}

/// Outcome of a single verification invocation.
///
/// Failures (fetch, submission) are errors, not outcomes; callers handle
/// every success case exhaustively instead of probing optional fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// The content predicate rejected the blob. No chain write was made.
    Rejected {
        /// Diagnostic reason from the predicate.
        reason: String,
    },
    /// Content accepted but no signing credential is configured, so the
    /// on-chain flag was not flipped. Degraded mode, not an error.
    LocalOnly,
    /// Content accepted and the verification transaction landed on-chain.
    OnChain {
        /// Digest of the submitted transaction.
        digest: TransactionDigest,
    },
}
