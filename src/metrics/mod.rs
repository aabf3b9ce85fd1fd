//! Operational counters for the verification worker.
//!
//! The external contract does not distinguish transient from permanent
//! failures, but the counters do; that classification exists only for
//! operators reading `/metrics`.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crate::domain::VerificationOutcome;
use crate::verify::VerifyError;

/// Counter registry shared across handlers.
pub struct VerifierMetrics {
    start_time: Instant,
    requests: AtomicU64,
    verified_onchain: AtomicU64,
    verified_locally: AtomicU64,
    rejected: AtomicU64,
    fetch_failures: AtomicU64,
    submission_failures: AtomicU64,
    in_flight_rejections: AtomicU64,
}

/// Point-in-time snapshot served by `/metrics`.
#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub uptime_secs: u64,
    pub requests: u64,
    pub verified_onchain: u64,
    pub verified_locally: u64,
    pub rejected: u64,
    pub fetch_failures: u64,
    pub submission_failures: u64,
    pub in_flight_rejections: u64,
}

impl VerifierMetrics {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            requests: AtomicU64::new(0),
            verified_onchain: AtomicU64::new(0),
            verified_locally: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            fetch_failures: AtomicU64::new(0),
            submission_failures: AtomicU64::new(0),
            in_flight_rejections: AtomicU64::new(0),
        }
    }

    /// Count one accepted verification request (after input validation).
    pub fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_outcome(&self, outcome: &VerificationOutcome) {
        let counter = match outcome {
            VerificationOutcome::OnChain { .. } => &self.verified_onchain,
            VerificationOutcome::LocalOnly => &self.verified_locally,
            VerificationOutcome::Rejected { .. } => &self.rejected,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self, error: &VerifyError) {
        let counter = match error {
            VerifyError::Fetch(_) => &self.fetch_failures,
            VerifyError::Submission(_) => &self.submission_failures,
            VerifyError::InFlight(_) => &self.in_flight_rejections,
            VerifyError::Shutdown => return,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            uptime_secs: self.start_time.elapsed().as_secs(),
            requests: self.requests.load(Ordering::Relaxed),
            verified_onchain: self.verified_onchain.load(Ordering::Relaxed),
            verified_locally: self.verified_locally.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            submission_failures: self.submission_failures.load(Ordering::Relaxed),
            in_flight_rejections: self.in_flight_rejections.load(Ordering::Relaxed),
        }
    }
}

impl Default for VerifierMetrics {
    fn default() -> Self {
        Self::new()
    }
}
