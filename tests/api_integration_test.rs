//! REST API integration tests for the Echo verifier.
//!
//! These drive the full router with in-process fakes for the Walrus
//! aggregator and the Sui fullnode; no live network is involved.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use echo_verifier::auth::SessionValidator;
use echo_verifier::crypto::Credential;
use echo_verifier::domain::SuiAddress;
use echo_verifier::server::AppState;

use common::*;

fn test_router(state: AppState) -> axum::Router {
    echo_verifier::api::router()
        .route("/health", axum::routing::get(|| async { "ok" }))
        .with_state(state)
}

async fn post_json(router: axum::Router, path: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(path)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn get(router: axum::Router, path: &str, bearer: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(Method::GET).uri(path);
    if let Some(token) = bearer {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let response = router.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

// ============================================================================
// POST /verify
// ============================================================================

#[tokio::test]
async fn missing_fields_return_400_without_any_network_call() {
    let blob_store = Arc::new(FakeBlobStore::serving(b"content"));
    let ledger = Arc::new(FakeLedger::succeeding("Digest123"));
    let state = test_state(blob_store.clone(), ledger.clone(), None, None);

    for body in [
        json!({}),
        json!({ "blobId": "b1" }),
        json!({ "handoutId": "0xh" }),
        json!({ "blobId": "", "handoutId": "0xh" }),
    ] {
        let (status, value) = post_json(test_router(state.clone()), "/verify", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["error"], "Missing blobId or handoutId");
    }

    assert_eq!(blob_store.fetches(), 0);
    assert!(ledger.submitted().is_empty());
}

#[tokio::test]
async fn short_content_is_rejected_with_422() {
    let blob_store = Arc::new(FakeBlobStore::serving(b"hi"));
    let ledger = Arc::new(FakeLedger::succeeding("Digest123"));
    let state = test_state(
        blob_store.clone(),
        ledger.clone(),
        Some(Credential::generate()),
        None,
    );

    let (status, value) = post_json(
        test_router(state),
        "/verify",
        json!({ "blobId": "b1", "handoutId": "0xh" }),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        value["error"],
        "Verification failed: content too short or corrupted"
    );
    assert!(ledger.submitted().is_empty());
}

#[tokio::test]
async fn accepted_content_without_credential_is_verified_locally() {
    let blob_store = Arc::new(FakeBlobStore::serving(b"Chapter 4 notes on..."));
    let ledger = Arc::new(FakeLedger::succeeding("Digest123"));
    let state = test_state(blob_store, ledger.clone(), None, None);

    let (status, value) = post_json(
        test_router(state),
        "/verify",
        json!({ "blobId": "b1", "handoutId": "0xh" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["status"], "verified_locally");
    assert!(value["message"]
        .as_str()
        .unwrap()
        .contains("TEE key not configured"));
    assert!(ledger.submitted().is_empty());
}

#[tokio::test]
async fn accepted_content_with_credential_is_verified_onchain() {
    let blob_store = Arc::new(FakeBlobStore::serving(b"Chapter 4 notes on..."));
    let ledger = Arc::new(FakeLedger::succeeding("Digest123"));
    let state = test_state(
        blob_store,
        ledger.clone(),
        Some(Credential::generate()),
        None,
    );

    let (status, value) = post_json(
        test_router(state),
        "/verify",
        json!({ "blobId": "b1", "handoutId": "0xhandout" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["status"], "verified_onchain");
    assert_eq!(value["digest"], "Digest123");
    assert_eq!(value["attestation"], "SUI_ECHO_TEE_SIGNED_VERIFICATION_V1");
    assert_eq!(ledger.submitted(), vec!["0xhandout".to_string()]);
}

#[tokio::test]
async fn fetch_failure_returns_500_and_skips_the_chain() {
    let blob_store = Arc::new(FakeBlobStore::failing());
    let ledger = Arc::new(FakeLedger::succeeding("Digest123"));
    let state = test_state(
        blob_store.clone(),
        ledger.clone(),
        Some(Credential::generate()),
        None,
    );

    let (status, value) = post_json(
        test_router(state),
        "/verify",
        json!({ "blobId": "missing", "handoutId": "0xh" }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(value["error"], "TEE processing failed");
    assert_eq!(blob_store.fetches(), 1);
    assert!(ledger.submitted().is_empty());
}

#[tokio::test]
async fn submission_failure_returns_500_after_acceptance() {
    let blob_store = Arc::new(FakeBlobStore::serving(b"Chapter 4 notes on..."));
    let ledger = Arc::new(FakeLedger::failing());
    let state = test_state(
        blob_store.clone(),
        ledger.clone(),
        Some(Credential::generate()),
        None,
    );

    let (status, value) = post_json(
        test_router(state),
        "/verify",
        json!({ "blobId": "b1", "handoutId": "0xh" }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(value["error"], "TEE processing failed");
    // The content was fetched and accepted exactly once before submission.
    assert_eq!(blob_store.fetches(), 1);
    assert_eq!(ledger.submitted().len(), 1);
}

#[tokio::test]
async fn repeat_requests_are_not_deduplicated() {
    // Documented non-idempotence: two sequential identical requests submit
    // two transactions. The ledger decides what the second one means.
    let blob_store = Arc::new(FakeBlobStore::serving(b"Chapter 4 notes on..."));
    let ledger = Arc::new(FakeLedger::succeeding("Digest123"));
    let state = test_state(
        blob_store,
        ledger.clone(),
        Some(Credential::generate()),
        None,
    );

    for _ in 0..2 {
        let (status, _) = post_json(
            test_router(state.clone()),
            "/verify",
            json!({ "blobId": "b1", "handoutId": "0xh" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
    assert_eq!(ledger.submitted().len(), 2);
}

// ============================================================================
// GET /v1/handouts
// ============================================================================

#[tokio::test]
async fn handouts_listing_by_owner_param() {
    let ledger = Arc::new(FakeLedger::with_handouts(vec![
        sample_handout("0x1", false),
        sample_handout("0x2", true),
    ]));
    let state = test_state(
        Arc::new(FakeBlobStore::serving(b"content")),
        ledger,
        None,
        None,
    );

    let (status, value) = get(
        test_router(state.clone()),
        "/v1/handouts?owner=0xowner",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["total"], 2);

    // Filter on the verified flag.
    let (status, value) = get(
        test_router(state.clone()),
        "/v1/handouts?owner=0xowner&verified=true",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["total"], 1);
    assert_eq!(value["handouts"][0]["id"], "0x2");

    // Missing owner without a session layer is a client error.
    let (status, _) = get(test_router(state), "/v1/handouts", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn handouts_listing_requires_valid_session_when_configured() {
    let sessions = Arc::new(SessionValidator::new(
        b"test-secret",
        "sui-echo",
        "echo-verifier",
    ));
    let ledger = Arc::new(FakeLedger::with_handouts(vec![sample_handout("0x1", false)]));
    let state = test_state(
        Arc::new(FakeBlobStore::serving(b"content")),
        ledger,
        None,
        Some(sessions.clone()),
    );

    // No token.
    let (status, _) = get(test_router(state.clone()), "/v1/handouts", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Expired token.
    let expired = sessions
        .issue(&SuiAddress::new("0xowner"), chrono::Duration::seconds(-60))
        .unwrap();
    let (status, _) = get(test_router(state.clone()), "/v1/handouts", Some(&expired)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Valid token.
    let token = sessions
        .issue(&SuiAddress::new("0xowner"), chrono::Duration::hours(1))
        .unwrap();
    let (status, value) = get(test_router(state), "/v1/handouts", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["total"], 1);
}

// ============================================================================
// POST /v1/blobs
// ============================================================================

#[tokio::test]
async fn blob_upload_returns_the_publisher_receipt_id() {
    let blob_store = Arc::new(FakeBlobStore::serving(b""));
    let state = test_state(
        blob_store.clone(),
        Arc::new(FakeLedger::succeeding("d")),
        None,
        None,
    );

    let request = Request::builder()
        .method(Method::POST)
        .uri("/v1/blobs")
        .body(Body::from("handout document bytes"))
        .unwrap();
    let response = test_router(state.clone()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(value["blobId"], "stored-blob");

    // Empty body is rejected before hitting the publisher.
    let request = Request::builder()
        .method(Method::POST)
        .uri("/v1/blobs")
        .body(Body::empty())
        .unwrap();
    let response = test_router(state).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(blob_store.store_calls.load(std::sync::atomic::Ordering::SeqCst), 1);
}

// ============================================================================
// GET /metrics
// ============================================================================

#[tokio::test]
async fn metrics_reflect_processed_verifications() {
    let state = test_state(
        Arc::new(FakeBlobStore::serving(b"Chapter 4 notes on...")),
        Arc::new(FakeLedger::succeeding("Digest123")),
        Some(Credential::generate()),
        None,
    );

    let (status, _) = post_json(
        test_router(state.clone()),
        "/verify",
        json!({ "blobId": "b1", "handoutId": "0xh" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, value) = get(test_router(state), "/metrics", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["requests"], 1);
    assert_eq!(value["verified_onchain"], 1);
    assert_eq!(value["rejected"], 0);
}
