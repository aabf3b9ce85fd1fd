//! Shared fixtures for the integration tests: in-process fakes standing in
//! for the Walrus aggregator and the Sui fullnode.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use echo_verifier::auth::SessionValidator;
use echo_verifier::chain::{ChainError, Ledger};
use echo_verifier::crypto::Credential;
use echo_verifier::domain::{BlobId, Handout, HandoutId, SuiAddress, TransactionDigest};
use echo_verifier::metrics::VerifierMetrics;
use echo_verifier::server::AppState;
use echo_verifier::storage::{BlobStore, StorageError};
use echo_verifier::verify::{MinLengthPredicate, VerificationService, VerifierConfig};

/// Blob store serving canned content, counting calls.
pub struct FakeBlobStore {
    /// Content returned by `fetch`; `None` simulates an aggregator failure.
    pub content: Option<Vec<u8>>,
    /// Blob id returned by `store`.
    pub stored_id: String,
    pub fetch_calls: AtomicUsize,
    pub store_calls: AtomicUsize,
}

impl FakeBlobStore {
    pub fn serving(content: &[u8]) -> Self {
        Self {
            content: Some(content.to_vec()),
            stored_id: "stored-blob".to_string(),
            fetch_calls: AtomicUsize::new(0),
            store_calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            content: None,
            stored_id: "stored-blob".to_string(),
            fetch_calls: AtomicUsize::new(0),
            store_calls: AtomicUsize::new(0),
        }
    }

    pub fn fetches(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlobStore for FakeBlobStore {
    async fn fetch(&self, _blob_id: &BlobId) -> Result<Vec<u8>, StorageError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        match &self.content {
            Some(content) => Ok(content.clone()),
            None => Err(StorageError::Status {
                status: 404,
                body: "blob not found".to_string(),
            }),
        }
    }

    async fn store(&self, _content: Vec<u8>) -> Result<BlobId, StorageError> {
        self.store_calls.fetch_add(1, Ordering::SeqCst);
        Ok(BlobId::new(self.stored_id.clone()))
    }
}

/// Ledger recording submissions, returning canned results.
pub struct FakeLedger {
    /// Digest returned on submission; `None` simulates an execution failure.
    pub digest: Option<String>,
    /// Handouts returned by `owned_handouts`.
    pub handouts: Vec<Handout>,
    /// Handout ids of every submission made.
    pub submissions: Mutex<Vec<String>>,
}

impl FakeLedger {
    pub fn succeeding(digest: &str) -> Self {
        Self {
            digest: Some(digest.to_string()),
            handouts: Vec::new(),
            submissions: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            digest: None,
            handouts: Vec::new(),
            submissions: Mutex::new(Vec::new()),
        }
    }

    pub fn with_handouts(handouts: Vec<Handout>) -> Self {
        Self {
            digest: None,
            handouts,
            submissions: Mutex::new(Vec::new()),
        }
    }

    pub fn submitted(&self) -> Vec<String> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl Ledger for FakeLedger {
    async fn owned_handouts(&self, _owner: &SuiAddress) -> Result<Vec<Handout>, ChainError> {
        Ok(self.handouts.clone())
    }

    async fn submit_verification(
        &self,
        handout_id: &HandoutId,
        _credential: &Credential,
    ) -> Result<TransactionDigest, ChainError> {
        self.submissions
            .lock()
            .unwrap()
            .push(handout_id.as_str().to_string());
        match &self.digest {
            Some(digest) => Ok(TransactionDigest::new(digest.clone())),
            None => Err(ChainError::Execution("MoveAbort(echo, 1)".to_string())),
        }
    }
}

/// Assemble application state around the fakes.
pub fn test_state(
    blob_store: Arc<FakeBlobStore>,
    ledger: Arc<FakeLedger>,
    credential: Option<Credential>,
    sessions: Option<Arc<SessionValidator>>,
) -> AppState {
    let verifier = Arc::new(VerificationService::new(
        VerifierConfig::default(),
        blob_store.clone(),
        ledger.clone(),
        Arc::new(MinLengthPredicate::default()),
        credential,
    ));

    AppState {
        verifier,
        blob_store,
        ledger,
        sessions,
        metrics: Arc::new(VerifierMetrics::new()),
    }
}

/// Sample handout for listing tests.
pub fn sample_handout(id: &str, verified: bool) -> Handout {
    Handout {
        id: HandoutId::new(id),
        owner: SuiAddress::new("0xowner"),
        blob_id: BlobId::new(format!("blob-{id}")),
        description: "GST 111 lecture notes".to_string(),
        verified,
        created_at_ms: Some(1735689600000),
    }
}
