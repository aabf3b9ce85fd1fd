//! REST endpoints for the verification worker.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::info;

use super::error::ApiError;
use super::types::{
    HandoutsQuery, HandoutsResponse, StoreBlobResponse, VerifyRequest, VerifyResponse,
};
use crate::api::ErrorCode;
use crate::auth::bearer_token;
use crate::domain::{BlobId, HandoutId, SuiAddress, VerificationOutcome};
use crate::server::AppState;
use crate::verify::ATTESTATION_TAG;

/// Build the application router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/verify", post(verify_handout))
        .route("/v1/handouts", get(list_handouts))
        .route("/v1/blobs", post(store_blob))
        .route("/metrics", get(metrics_snapshot))
}

/// `POST /verify` — the verification operation.
async fn verify_handout(
    State(state): State<AppState>,
    Json(request): Json<VerifyRequest>,
) -> Result<Json<VerifyResponse>, ApiError> {
    // Input validation happens before any network call.
    let blob_id = match request.blob_id.as_deref() {
        Some(id) if !id.is_empty() => BlobId::new(id),
        _ => return Err(ApiError::missing_field()),
    };
    let handout_id = match request.handout_id.as_deref() {
        Some(id) if !id.is_empty() => HandoutId::new(id),
        _ => return Err(ApiError::missing_field()),
    };

    info!(%blob_id, %handout_id, "verification requested");
    state.metrics.record_request();

    match state.verifier.verify(&blob_id, &handout_id).await {
        Ok(outcome) => {
            state.metrics.record_outcome(&outcome);
            match outcome {
                VerificationOutcome::Rejected { reason } => Err(ApiError::new(
                    ErrorCode::ContentRejected,
                    format!("Verification failed: {reason}"),
                )),
                VerificationOutcome::LocalOnly => Ok(Json(VerifyResponse::local())),
                VerificationOutcome::OnChain { digest } => Ok(Json(VerifyResponse::on_chain(
                    digest.0,
                    ATTESTATION_TAG,
                ))),
            }
        }
        Err(err) => {
            state.metrics.record_failure(&err);
            Err(err.into())
        }
    }
}

/// `GET /v1/handouts` — list Handout records owned by an address.
///
/// With a session layer configured the owner comes from the bearer token;
/// otherwise an explicit `owner` query parameter is required.
async fn list_handouts(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<HandoutsQuery>,
) -> Result<Json<HandoutsResponse>, ApiError> {
    let owner = match &state.sessions {
        Some(validator) => {
            let header = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
            let session = validator.validate(bearer_token(header)?)?;
            if !session.is_valid() {
                return Err(crate::auth::AuthError::Expired.into());
            }
            session.address
        }
        None => match query.owner.as_deref() {
            Some(owner) if !owner.is_empty() => SuiAddress::new(owner),
            _ => {
                return Err(ApiError::new(
                    ErrorCode::MissingRequiredField,
                    "Missing owner",
                ))
            }
        },
    };

    let mut handouts = state.ledger.owned_handouts(&owner).await?;
    if let Some(verified) = query.verified {
        handouts.retain(|h| h.verified == verified);
    }
    let total = handouts.len();
    Ok(Json(HandoutsResponse { handouts, total }))
}

/// `POST /v1/blobs` — upload raw content to the publisher.
async fn store_blob(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<StoreBlobResponse>, ApiError> {
    if body.is_empty() {
        return Err(ApiError::new(
            ErrorCode::MissingRequiredField,
            "Empty request body",
        ));
    }
    let blob_id = state.blob_store.store(body.to_vec()).await?;
    Ok(Json(StoreBlobResponse {
        blob_id: blob_id.0,
    }))
}

/// `GET /metrics` — counter snapshot.
async fn metrics_snapshot(State(state): State<AppState>) -> Json<crate::metrics::MetricsSnapshot> {
    Json(state.metrics.snapshot())
}
