//! The verification service proper.
//!
//! Stateless per invocation: fetch the blob, evaluate the predicate, and on
//! acceptance submit the attestation transaction. Nothing persists between
//! invocations. The only shared state is operational: a concurrency limiter
//! and an in-flight guard that stops two concurrent verifications of the
//! same handout from racing duplicate transactions.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;
use tracing::{info, instrument, warn};

use super::{ContentPredicate, VerifyError};
use crate::chain::Ledger;
use crate::crypto::{content_fingerprint, Credential};
use crate::domain::{BlobId, HandoutId, VerificationOutcome};
use crate::storage::BlobStore;

/// Tunables for the verification service.
///
/// Always constructed explicitly and passed in; the service never reads
/// ambient environment state.
#[derive(Debug, Clone)]
pub struct VerifierConfig {
    /// Upper bound on concurrently running verifications.
    pub max_concurrent: usize,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self { max_concurrent: 8 }
    }
}

/// Tracks handouts with a verification currently running.
struct InFlight {
    active: Mutex<HashSet<String>>,
}

impl InFlight {
    fn new() -> Self {
        Self {
            active: Mutex::new(HashSet::new()),
        }
    }

    /// Claim a handout; `None` if a verification for it is already running.
    fn begin(self: &Arc<Self>, handout_id: &HandoutId) -> Option<InFlightPermit> {
        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        if !active.insert(handout_id.as_str().to_string()) {
            return None;
        }
        Some(InFlightPermit {
            registry: Arc::clone(self),
            handout_id: handout_id.as_str().to_string(),
        })
    }
}

/// Releases the claim on drop, on every exit path.
struct InFlightPermit {
    registry: Arc<InFlight>,
    handout_id: String,
}

impl Drop for InFlightPermit {
    fn drop(&mut self) {
        let mut active = self
            .registry
            .active
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        active.remove(&self.handout_id);
    }
}

/// Fetch-evaluate-attest pipeline over injected collaborators.
pub struct VerificationService {
    blob_store: Arc<dyn BlobStore>,
    ledger: Arc<dyn Ledger>,
    predicate: Arc<dyn ContentPredicate>,
    credential: Option<Credential>,
    limiter: Arc<Semaphore>,
    in_flight: Arc<InFlight>,
}

impl VerificationService {
    pub fn new(
        config: VerifierConfig,
        blob_store: Arc<dyn BlobStore>,
        ledger: Arc<dyn Ledger>,
        predicate: Arc<dyn ContentPredicate>,
        credential: Option<Credential>,
    ) -> Self {
        Self {
            blob_store,
            ledger,
            predicate,
            credential,
            limiter: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
            in_flight: Arc::new(InFlight::new()),
        }
    }

    /// Whether a signing credential is configured.
    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    /// Verify one handout's blob content and, if acceptable, attest on-chain.
    ///
    /// Per-invocation state machine:
    /// fetch -> evaluate -> { rejected | accepted } ->
    /// { skipped (no credential) | submit } -> { digest | error }.
    ///
    /// Every failure mode is terminal for this invocation; nothing retries.
    #[instrument(skip(self), fields(blob_id = %blob_id, handout_id = %handout_id))]
    pub async fn verify(
        &self,
        blob_id: &BlobId,
        handout_id: &HandoutId,
    ) -> Result<VerificationOutcome, VerifyError> {
        let _slot = self
            .limiter
            .acquire()
            .await
            .map_err(|_| VerifyError::Shutdown)?;
        let _claim = self
            .in_flight
            .begin(handout_id)
            .ok_or_else(|| VerifyError::InFlight(handout_id.clone()))?;

        info!("starting verification");

        let content = self.blob_store.fetch(blob_id).await?;
        info!(
            bytes = content.len(),
            fingerprint = %content_fingerprint(&content),
            "content fetched"
        );

        let verdict = self.predicate.evaluate(&content);
        if !verdict.accepted {
            let reason = verdict
                .reason
                .unwrap_or_else(|| "content rejected".to_string());
            warn!(%reason, "content rejected by predicate");
            return Ok(VerificationOutcome::Rejected { reason });
        }

        let Some(credential) = &self.credential else {
            // Degraded mode for environments without a provisioned key.
            info!("no signing credential configured, skipping on-chain update");
            return Ok(VerificationOutcome::LocalOnly);
        };

        let digest = self
            .ledger
            .submit_verification(handout_id, credential)
            .await?;
        info!(digest = %digest, "handout verified on-chain");
        Ok(VerificationOutcome::OnChain { digest })
    }
}
