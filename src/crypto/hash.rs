//! Hashing helpers.
//!
//! Sui uses Blake2b-256 for address derivation and transaction signing
//! digests; SHA-256 is used only for local content fingerprints in logs and
//! diagnostics.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use sha2::Sha256;

/// 32-byte hash output.
pub type Hash256 = [u8; 32];

type Blake2b256 = Blake2b<U32>;

/// Blake2b-256 over arbitrary bytes.
pub fn blake2b_256(data: &[u8]) -> Hash256 {
    let mut hasher = Blake2b256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// SHA-256 over arbitrary bytes.
pub fn sha256(data: &[u8]) -> Hash256 {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Short hex fingerprint of blob content, for structured logging.
///
/// Never log raw blob content; handouts may contain personal data.
pub fn content_fingerprint(content: &[u8]) -> String {
    hex::encode(&sha256(content)[..8])
}
