//! Handout records read back from the chain.

use serde::{Deserialize, Serialize};

use super::{BlobId, HandoutId, SuiAddress};

/// An on-chain Handout object owned by a submitting account.
///
/// The authoritative state lives entirely on the ledger; instances of this
/// struct are read-only projections of `suix_getOwnedObjects` content and are
/// never persisted locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handout {
    /// Object id of the Handout record.
    pub id: HandoutId,
    /// Account that submitted the handout.
    pub owner: SuiAddress,
    /// Blob id of the stored document content.
    pub blob_id: BlobId,
    /// Free-text description supplied at submission time.
    pub description: String,
    /// Whether the verification flag has been flipped.
    pub verified: bool,
    /// Creation timestamp in milliseconds, when the Move object carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at_ms: Option<u64>,
}

impl Handout {
    /// Parse a Handout from one entry of a `suix_getOwnedObjects` response.
    ///
    /// Returns `None` for entries that are not Handout move objects or whose
    /// content is missing; the caller skips those silently, mirroring the
    /// lenient read path of the dashboard.
    pub fn from_owned_object(value: &serde_json::Value, owner: &SuiAddress) -> Option<Self> {
        let data = value.get("data")?;
        let object_type = data.get("type")?.as_str()?;
        if !object_type.contains("Handout") {
            return None;
        }

        let content = data.get("content")?;
        if content.get("dataType")?.as_str()? != "moveObject" {
            return None;
        }
        let fields = content.get("fields")?;

        let id = data.get("objectId")?.as_str()?;
        let blob_id = fields
            .get("blob_id")
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        let description = fields
            .get("description")
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        let verified = fields
            .get("verified")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        // Move u64 fields come back as JSON strings.
        let created_at_ms = fields
            .get("created_at")
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse().ok());

        Some(Self {
            id: HandoutId::new(id),
            owner: owner.clone(),
            blob_id: BlobId::new(blob_id),
            description: description.to_string(),
            verified,
            created_at_ms,
        })
    }
}
