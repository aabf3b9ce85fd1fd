//! HMAC session tokens carrying a Sui account address.

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AuthError;
use crate::domain::SuiAddress;

/// Claims carried by a session token.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: the account's Sui address.
    pub sub: String,
    /// Issuer.
    pub iss: String,
    /// Audience.
    pub aud: String,
    /// Expiration (Unix timestamp).
    pub exp: i64,
    /// Issued at (Unix timestamp).
    pub iat: i64,
    /// Token id.
    pub jti: String,
}

/// An authenticated session.
#[derive(Debug, Clone)]
pub struct Session {
    /// Account address the session was minted for.
    pub address: SuiAddress,
    /// Session expiry.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Whether the session is still within its validity window.
    pub fn is_valid(&self) -> bool {
        Utc::now() < self.expires_at
    }
}

/// Validates (and, for tests and tooling, issues) session tokens.
pub struct SessionValidator {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
}

impl SessionValidator {
    pub fn new(secret: &[u8], issuer: &str, audience: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            issuer: issuer.to_string(),
            audience: audience.to_string(),
        }
    }

    /// Mint a session token for an address.
    pub fn issue(&self, address: &SuiAddress, ttl: Duration) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: address.as_str().to_string(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    /// Validate a bearer token and return the session it represents.
    pub fn validate(&self, token: &str) -> Result<Session, AuthError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);

        let data = decode::<SessionClaims>(token, &self.decoding_key, &validation).map_err(
            |e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::InvalidToken(e.to_string()),
            },
        )?;

        let expires_at = Utc
            .timestamp_opt(data.claims.exp, 0)
            .single()
            .ok_or_else(|| AuthError::InvalidToken("bad exp claim".to_string()))?;

        Ok(Session {
            address: SuiAddress::new(data.claims.sub),
            expires_at,
        })
    }
}

/// Extract the bearer token from an `Authorization` header value.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    header
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or(AuthError::MissingToken)
}
