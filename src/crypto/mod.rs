//! Cryptographic utilities: hashing and the TEE signing credential.

mod hash;
mod keys;

pub use hash::*;
pub use keys::*;
