//! Session authentication for read endpoints.
//!
//! The dashboard signs users in through zkLogin and derives a Sui address
//! client-side; its backend mints a short-lived HMAC session token carrying
//! that address. The worker validates those tokens for authenticated reads.
//! An invalid or expired session is "not authenticated", never an internal
//! error.

mod session;

pub use session::*;

/// Errors raised while authenticating a request.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,

    #[error("invalid session token: {0}")]
    InvalidToken(String),

    #[error("session expired")]
    Expired,
}
