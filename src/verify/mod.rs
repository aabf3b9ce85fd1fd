//! The verification service: fetch, evaluate, attest.

mod predicate;
mod service;

pub use predicate::*;
pub use service::*;

use crate::chain::ChainError;
use crate::domain::HandoutId;
use crate::storage::StorageError;

/// Attestation tag attached to every on-chain verification response.
pub const ATTESTATION_TAG: &str = "SUI_ECHO_TEE_SIGNED_VERIFICATION_V1";

/// Errors terminating a verification invocation.
///
/// Every variant is terminal for that invocation; the caller decides whether
/// to resubmit. Rejection by the content predicate is an outcome, not an
/// error.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    /// The blob could not be retrieved. Short-circuits before evaluation.
    #[error("blob fetch failed: {0}")]
    Fetch(#[from] StorageError),

    /// The signed transaction failed to submit or failed on-chain.
    #[error("chain submission failed: {0}")]
    Submission(#[from] ChainError),

    /// A verification for the same handout is already running.
    #[error("verification already in progress for handout {0}")]
    InFlight(HandoutId),

    /// The service is shutting down and no longer admits work.
    #[error("verification service is shutting down")]
    Shutdown,
}
