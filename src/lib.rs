//! Echo Verifier Library
//!
//! Verification worker for the Sui Echo handout network: fetches submitted
//! blob content from Walrus, applies a content-acceptability predicate, and
//! on success signs and submits the on-chain attestation that marks the
//! Handout verified.
//!
//! ## Modules
//!
//! - [`domain`] - Core domain types (ids, Handout records, outcomes)
//! - [`storage`] - Walrus aggregator/publisher client
//! - [`chain`] - Sui fullnode JSON-RPC client
//! - [`crypto`] - Hashing and the TEE signing credential
//! - [`auth`] - Session tokens for authenticated reads
//! - [`verify`] - The verification service and content predicates
//! - [`metrics`] - Operational counters
//! - [`api`] - REST API routes
//! - [`server`] - HTTP server bootstrap

pub mod api;
pub mod auth;
pub mod chain;
pub mod crypto;
pub mod domain;
pub mod metrics;
pub mod server;
pub mod storage;
pub mod verify;

// Re-export commonly used types
pub use domain::{
    BlobId, Handout, HandoutId, SuiAddress, TransactionDigest, Verdict, VerificationOutcome,
};
pub use verify::{
    ContentPredicate, MinLengthPredicate, VerificationService, VerifierConfig, VerifyError,
    ATTESTATION_TAG,
};
