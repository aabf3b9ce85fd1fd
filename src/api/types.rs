//! Request and response bodies, wire-compatible with the reference worker.

use serde::{Deserialize, Serialize};

use crate::domain::Handout;

/// `POST /verify` request body. Both fields are required; the handler turns
/// absent or empty values into a 400 before any network call.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    #[serde(default)]
    pub blob_id: Option<String>,
    #[serde(default)]
    pub handout_id: Option<String>,
}

/// `POST /verify` success body.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum VerifyResponse {
    /// Content verified, no credential configured for on-chain signing.
    Local {
        status: &'static str,
        message: &'static str,
    },
    /// Content verified and attested on-chain.
    OnChain {
        status: &'static str,
        digest: String,
        attestation: &'static str,
    },
}

impl VerifyResponse {
    pub fn local() -> Self {
        VerifyResponse::Local {
            status: "verified_locally",
            message: "Verification successful, but TEE key not configured for on-chain signing.",
        }
    }

    pub fn on_chain(digest: String, attestation: &'static str) -> Self {
        VerifyResponse::OnChain {
            status: "verified_onchain",
            digest,
            attestation,
        }
    }
}

/// `GET /v1/handouts` query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct HandoutsQuery {
    /// Owner address; required when no session layer is configured.
    pub owner: Option<String>,
    /// Optional filter on the verified flag.
    pub verified: Option<bool>,
}

/// `GET /v1/handouts` response body.
#[derive(Debug, Serialize)]
pub struct HandoutsResponse {
    pub handouts: Vec<Handout>,
    pub total: usize,
}

/// `POST /v1/blobs` response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreBlobResponse {
    pub blob_id: String,
}
