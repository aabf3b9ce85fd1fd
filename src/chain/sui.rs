//! JSON-RPC client for a Sui fullnode.
//!
//! The write path mirrors the reference worker: build the
//! `{package}::echo::verify_handout` call server-side via `unsafe_moveCall`,
//! sign the returned transaction bytes with the TEE credential, and execute
//! with `sui_executeTransactionBlock`.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, instrument};

use super::{ChainError, Ledger};
use crate::crypto::Credential;
use crate::domain::{Handout, HandoutId, SuiAddress, TransactionDigest};

/// Move module and function targeted by the verification transaction.
const ECHO_MODULE: &str = "echo";
const VERIFY_FUNCTION: &str = "verify_handout";
const HANDOUT_STRUCT: &str = "Handout";

/// Fullnode endpoint and Move package configuration.
#[derive(Debug, Clone)]
pub struct SuiConfig {
    /// Fullnode JSON-RPC URL.
    pub rpc_url: String,
    /// Published Echo package id.
    pub package_id: String,
    /// Gas budget for the verification call, in MIST.
    pub gas_budget: u64,
    /// Per-request timeout.
    pub timeout: Duration,
}

/// Reqwest-backed fullnode client.
pub struct SuiRpcClient {
    config: SuiConfig,
    http: reqwest::Client,
}

impl SuiRpcClient {
    pub fn new(config: SuiConfig) -> Result<Self, ChainError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { config, http })
    }

    /// Fully qualified Handout struct type, used as the owned-object filter.
    fn handout_type(&self) -> String {
        format!(
            "{}::{}::{}",
            self.config.package_id, ECHO_MODULE, HANDOUT_STRUCT
        )
    }

    /// One JSON-RPC 2.0 round trip.
    async fn rpc(&self, method: &str, params: Value) -> Result<Value, ChainError> {
        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response = self
            .http
            .post(&self.config.rpc_url)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChainError::Status(status.as_u16()));
        }

        let body: Value = response.json().await?;
        if let Some(error) = body.get("error") {
            return Err(ChainError::Rpc {
                code: error.get("code").and_then(Value::as_i64).unwrap_or(0),
                message: error
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown")
                    .to_string(),
            });
        }

        body.get("result")
            .cloned()
            .ok_or(ChainError::MissingField("result"))
    }
}

#[async_trait]
impl Ledger for SuiRpcClient {
    #[instrument(skip(self), fields(owner = %owner))]
    async fn owned_handouts(&self, owner: &SuiAddress) -> Result<Vec<Handout>, ChainError> {
        let result = self
            .rpc(
                "suix_getOwnedObjects",
                json!([
                    owner.as_str(),
                    {
                        "filter": { "StructType": self.handout_type() },
                        "options": { "showType": true, "showContent": true },
                    },
                    null,
                    null,
                ]),
            )
            .await?;

        let entries = result
            .get("data")
            .and_then(Value::as_array)
            .ok_or(ChainError::MissingField("data"))?;

        let handouts: Vec<Handout> = entries
            .iter()
            .filter_map(|entry| Handout::from_owned_object(entry, owner))
            .collect();
        debug!(count = handouts.len(), "listed owned handouts");
        Ok(handouts)
    }

    #[instrument(skip(self, credential), fields(handout_id = %handout_id))]
    async fn submit_verification(
        &self,
        handout_id: &HandoutId,
        credential: &Credential,
    ) -> Result<TransactionDigest, ChainError> {
        // Step 1: have the fullnode assemble the move call.
        let built = self
            .rpc(
                "unsafe_moveCall",
                json!([
                    credential.address().as_str(),
                    self.config.package_id,
                    ECHO_MODULE,
                    VERIFY_FUNCTION,
                    [],
                    [handout_id.as_str()],
                    null,
                    self.config.gas_budget.to_string(),
                ]),
            )
            .await?;

        let tx_bytes_b64 = built
            .get("txBytes")
            .and_then(Value::as_str)
            .ok_or(ChainError::MissingField("txBytes"))?;
        let tx_bytes = BASE64
            .decode(tx_bytes_b64)
            .map_err(|_| ChainError::InvalidTxBytes)?;

        // Step 2: sign and execute.
        let signature = credential.sign_transaction(&tx_bytes);
        let executed = self
            .rpc(
                "sui_executeTransactionBlock",
                json!([
                    tx_bytes_b64,
                    [signature],
                    { "showEffects": true },
                    "WaitForLocalExecution",
                ]),
            )
            .await?;

        let digest = executed
            .get("digest")
            .and_then(Value::as_str)
            .ok_or(ChainError::MissingField("digest"))?
            .to_string();

        // Execution failures come back inside the effects. `showEffects`
        // was requested, so a response without them is malformed.
        let status = executed
            .pointer("/effects/status")
            .ok_or(ChainError::MissingField("effects"))?;
        if status.get("status").and_then(Value::as_str) != Some("success") {
            let error = status
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("unknown execution error")
                .to_string();
            return Err(ChainError::Execution(error));
        }

        info!(digest = %digest, "verification transaction executed");
        Ok(TransactionDigest::new(digest))
    }
}
