//! Content acceptability predicates.
//!
//! The predicate is a pluggable strategy: the shipping check is a minimal
//! length threshold standing in for a real OCR-and-compare accuracy score.
//! Swapping in a real scorer must not touch the service control flow, so the
//! seam is this trait.

use crate::domain::Verdict;

/// Rejection reason surfaced to callers, wire-compatible with the reference
/// worker's 422 body.
pub const REJECT_REASON_TOO_SHORT: &str = "content too short or corrupted";

/// Accept/reject decision over fetched blob content.
pub trait ContentPredicate: Send + Sync {
    /// Evaluate the content. Must be deterministic for a given input.
    fn evaluate(&self, content: &[u8]) -> Verdict;
}

/// Accepts content strictly longer than a fixed threshold.
#[derive(Debug, Clone)]
pub struct MinLengthPredicate {
    min_length: usize,
}

impl MinLengthPredicate {
    pub fn new(min_length: usize) -> Self {
        Self { min_length }
    }
}

impl Default for MinLengthPredicate {
    /// Reference behavior: acceptable iff length exceeds 5.
    fn default() -> Self {
        Self::new(5)
    }
}

impl ContentPredicate for MinLengthPredicate {
    fn evaluate(&self, content: &[u8]) -> Verdict {
        if content.len() > self.min_length {
            Verdict::accept()
        } else {
            Verdict::reject(REJECT_REASON_TOO_SHORT)
        }
    }
}
