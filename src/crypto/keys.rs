//! Ed25519 signing credential for on-chain attestations.
//!
//! The worker signs `verify_handout` transactions with a locally held
//! Ed25519 key (the "TEE key"). Signatures follow the Sui serialization:
//! `flag || signature || public_key`, base64-encoded, over the Blake2b-256
//! digest of the intent-prefixed transaction bytes.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use ed25519_dalek::{Signer, SigningKey, VerifyingKey, SECRET_KEY_LENGTH};
use rand::rngs::OsRng;

use crate::crypto::hash::blake2b_256;
use crate::domain::SuiAddress;

/// Sui signature scheme flag for Ed25519.
const ED25519_FLAG: u8 = 0x00;

/// Intent prefix for transaction data (scope, version, app id).
const INTENT_TRANSACTION_DATA: [u8; 3] = [0, 0, 0];

/// Errors raised while loading or using a credential.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("secret key is not valid base64 or hex")]
    UnrecognizedEncoding,

    #[error("secret key must be {SECRET_KEY_LENGTH} bytes, got {0}")]
    InvalidLength(usize),

    #[error("secret key has unsupported scheme flag {0:#04x}")]
    UnsupportedScheme(u8),
}

/// The worker's signing credential.
#[derive(Clone)]
pub struct Credential {
    signing_key: SigningKey,
}

impl Credential {
    /// Generate a fresh random credential.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Load a credential from an exported secret key string.
    ///
    /// Accepts base64 (raw 32 bytes, or 33 bytes with a leading Ed25519
    /// scheme flag as produced by Sui keytool exports) and hex with an
    /// optional `0x` prefix.
    pub fn from_encoded(secret: &str) -> Result<Self, CredentialError> {
        let secret = secret.trim();
        // A bare 64-character hex secret is also syntactically valid
        // base64 (decoding to 48 bytes), so hex takes precedence whenever
        // it yields a key-sized payload.
        let stripped = secret.strip_prefix("0x").unwrap_or(secret);
        let bytes = match hex::decode(stripped) {
            Ok(decoded)
                if decoded.len() == SECRET_KEY_LENGTH
                    || decoded.len() == SECRET_KEY_LENGTH + 1 =>
            {
                decoded
            }
            _ => BASE64
                .decode(secret)
                .map_err(|_| CredentialError::UnrecognizedEncoding)?,
        };

        let raw = match bytes.len() {
            SECRET_KEY_LENGTH => bytes.as_slice(),
            n if n == SECRET_KEY_LENGTH + 1 => {
                if bytes[0] != ED25519_FLAG {
                    return Err(CredentialError::UnsupportedScheme(bytes[0]));
                }
                &bytes[1..]
            }
            n => return Err(CredentialError::InvalidLength(n)),
        };
        let key_bytes: [u8; SECRET_KEY_LENGTH] = raw
            .try_into()
            .map_err(|_| CredentialError::InvalidLength(raw.len()))?;

        Ok(Self {
            signing_key: SigningKey::from_bytes(&key_bytes),
        })
    }

    /// The credential's public key.
    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Derive the Sui address for this credential:
    /// Blake2b-256 of `flag || public_key`, hex-encoded.
    pub fn address(&self) -> SuiAddress {
        let mut preimage = Vec::with_capacity(1 + 32);
        preimage.push(ED25519_FLAG);
        preimage.extend_from_slice(self.verifying_key().as_bytes());
        SuiAddress::new(format!("0x{}", hex::encode(blake2b_256(&preimage))))
    }

    /// Sign raw transaction bytes and return the serialized Sui signature.
    pub fn sign_transaction(&self, tx_bytes: &[u8]) -> String {
        let mut message = Vec::with_capacity(INTENT_TRANSACTION_DATA.len() + tx_bytes.len());
        message.extend_from_slice(&INTENT_TRANSACTION_DATA);
        message.extend_from_slice(tx_bytes);
        let digest = blake2b_256(&message);

        let signature = self.signing_key.sign(&digest);

        let mut serialized = Vec::with_capacity(1 + 64 + 32);
        serialized.push(ED25519_FLAG);
        serialized.extend_from_slice(&signature.to_bytes());
        serialized.extend_from_slice(self.verifying_key().as_bytes());
        BASE64.encode(serialized)
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Secret material stays out of logs.
        f.debug_struct("Credential")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}
