//! API error responses.
//!
//! The wire shape is the reference worker's flat `{"error": "..."}` body; the
//! machine-readable code travels in an `x-error-code` header so the JSON
//! contract stays untouched. Unexpected processing failures collapse to the
//! reference's opaque 500 body; the detail goes to the logs, not the caller.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use crate::auth::AuthError;
use crate::chain::ChainError;
use crate::storage::StorageError;
use crate::verify::VerifyError;

/// Opaque body returned for fetch and chain failures, matching the reference.
pub const OPAQUE_PROCESSING_ERROR: &str = "TEE processing failed";

/// Stable error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// A required request field is missing or empty.
    MissingRequiredField,
    /// The content predicate rejected the blob.
    ContentRejected,
    /// A verification for this handout is already running.
    VerificationInFlight,
    /// The blob could not be fetched from storage.
    BlobFetchFailed,
    /// The attestation transaction failed to submit or execute.
    ChainSubmissionFailed,
    /// Upload to the publisher failed.
    StorageUploadFailed,
    /// The ledger read failed.
    LedgerUnavailable,
    /// No or invalid session credentials.
    AuthRequired,
    /// The session token has expired.
    SessionExpired,
    /// Anything else.
    InternalError,
}

impl ErrorCode {
    pub fn http_status(&self) -> StatusCode {
        match self {
            ErrorCode::MissingRequiredField => StatusCode::BAD_REQUEST,
            ErrorCode::ContentRejected => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::VerificationInFlight => StatusCode::CONFLICT,
            ErrorCode::BlobFetchFailed => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::ChainSubmissionFailed => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::StorageUploadFailed => StatusCode::BAD_GATEWAY,
            ErrorCode::LedgerUnavailable => StatusCode::BAD_GATEWAY,
            ErrorCode::AuthRequired => StatusCode::UNAUTHORIZED,
            ErrorCode::SessionExpired => StatusCode::UNAUTHORIZED,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::MissingRequiredField => "MISSING_REQUIRED_FIELD",
            ErrorCode::ContentRejected => "CONTENT_REJECTED",
            ErrorCode::VerificationInFlight => "VERIFICATION_IN_FLIGHT",
            ErrorCode::BlobFetchFailed => "BLOB_FETCH_FAILED",
            ErrorCode::ChainSubmissionFailed => "CHAIN_SUBMISSION_FAILED",
            ErrorCode::StorageUploadFailed => "STORAGE_UPLOAD_FAILED",
            ErrorCode::LedgerUnavailable => "LEDGER_UNAVAILABLE",
            ErrorCode::AuthRequired => "AUTH_REQUIRED",
            ErrorCode::SessionExpired => "SESSION_EXPIRED",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

/// An error response carrying a code and the caller-visible message.
#[derive(Debug)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn missing_field() -> Self {
        Self::new(ErrorCode::MissingRequiredField, "Missing blobId or handoutId")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.code.http_status();
        let body = Json(serde_json::json!({ "error": self.message }));
        let mut response = (status, body).into_response();
        if let Ok(value) = axum::http::HeaderValue::from_str(self.code.as_str()) {
            response.headers_mut().insert(
                axum::http::HeaderName::from_static("x-error-code"),
                value,
            );
        }
        response
    }
}

impl From<VerifyError> for ApiError {
    fn from(err: VerifyError) -> Self {
        match err {
            VerifyError::Fetch(cause) => {
                error!(%cause, "blob fetch failed");
                ApiError::new(ErrorCode::BlobFetchFailed, OPAQUE_PROCESSING_ERROR)
            }
            VerifyError::Submission(cause) => {
                error!(%cause, "chain submission failed");
                ApiError::new(ErrorCode::ChainSubmissionFailed, OPAQUE_PROCESSING_ERROR)
            }
            VerifyError::InFlight(handout_id) => ApiError::new(
                ErrorCode::VerificationInFlight,
                format!("Verification already in progress for handout {handout_id}"),
            ),
            VerifyError::Shutdown => {
                ApiError::new(ErrorCode::InternalError, OPAQUE_PROCESSING_ERROR)
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Expired => ApiError::new(ErrorCode::SessionExpired, "Session expired"),
            AuthError::MissingToken | AuthError::InvalidToken(_) => {
                ApiError::new(ErrorCode::AuthRequired, "Not authenticated")
            }
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        error!(cause = %err, "storage upload failed");
        ApiError::new(ErrorCode::StorageUploadFailed, "Failed to store blob")
    }
}

impl From<ChainError> for ApiError {
    fn from(err: ChainError) -> Self {
        error!(cause = %err, "ledger read failed");
        ApiError::new(ErrorCode::LedgerUnavailable, "Failed to read ledger")
    }
}
