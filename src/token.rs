//! Construction of placeholder tokens.
//!
//! A mock token has the shape of a JWT (`header.payload.signature`) but is
//! never signed: the header is a fixed literal and the last segment is a decoy
//! string carrying the [`MARKER`] that identifies tokens made by this crate.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Base64url of `{"alg":"HS256","typ":"JWT"}`.
pub const HEADER: &str = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9";

/// Decoy third segment. Always contains [`MARKER`].
pub const TRAILER: &str = "simulated_signature_hash";

/// Substring that distinguishes a fabricated token from a real one.
pub const MARKER: &str = "simulated";

pub const DISPLAY_NAME: &str = "Postman Case Study User";
pub const SCOPE: &str = "refunds:write refunds:read";
pub const TOKEN_TTL_SECS: i64 = 3600;

const PREVIEW_LEN: usize = 20;

/// Claims embedded in the payload segment.
///
/// Field order is the serialized order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockClaims {
    /// Subject, the client identifier.
    pub sub: String,
    pub name: String,
    /// Issued at, Unix seconds.
    pub iat: i64,
    /// Expiry, Unix seconds.
    pub exp: i64,
    /// Space-delimited scopes.
    pub scope: String,
}

/// Tunables for the fabricated claims.
///
/// The default matches what the request hook has always produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MockTokenConfig {
    pub display_name: String,
    pub scope: String,
    pub ttl_secs: i64,
}

impl Default for MockTokenConfig {
    fn default() -> Self {
        Self {
            display_name: DISPLAY_NAME.to_string(),
            scope: SCOPE.to_string(),
            ttl_secs: TOKEN_TTL_SECS,
        }
    }
}

impl MockClaims {
    pub fn new(
        client_id: &str,
        issued_at: i64,
        config: &MockTokenConfig,
    ) -> Result<Self, TokenError> {
        let exp = issued_at
            .checked_add(config.ttl_secs)
            .ok_or(TokenError::TtlOverflow {
                issued_at,
                ttl_secs: config.ttl_secs,
            })?;

        Ok(Self {
            sub: client_id.to_string(),
            name: config.display_name.clone(),
            iat: issued_at,
            exp,
            scope: config.scope.clone(),
        })
    }
}

/// Builds a mock token for `client_id` issued at `issued_at` (Unix seconds).
pub fn fabricate(
    client_id: &str,
    issued_at: i64,
    config: &MockTokenConfig,
) -> Result<String, TokenError> {
    let claims = MockClaims::new(client_id, issued_at, config)?;
    let payload = serde_json::to_vec(&claims).map_err(TokenError::Encode)?;
    debug!(sub = %claims.sub, iat = claims.iat, exp = claims.exp, "Encoding mock claims.");

    Ok(format!(
        "{}.{}.{}",
        HEADER,
        URL_SAFE_NO_PAD.encode(payload),
        TRAILER
    ))
}

/// Whether `token` carries the fabrication marker.
pub fn is_fabricated(token: &str) -> bool {
    token.contains(MARKER)
}

/// Decodes the payload segment of a three-segment token.
///
/// Nothing is verified; this only reverses what [`fabricate`] does.
pub fn decode_claims(token: &str) -> Result<MockClaims, TokenError> {
    let segments: Vec<&str> = token.split('.').collect();
    let [_, payload, _] = segments[..] else {
        return Err(TokenError::Malformed {
            segments: segments.len(),
        });
    };

    let bytes = URL_SAFE_NO_PAD.decode(payload)?;
    serde_json::from_slice(&bytes).map_err(TokenError::Claims)
}

/// Short prefix of a token, safe to put in logs.
pub fn preview(token: &str) -> String {
    let head: String = token.chars().take(PREVIEW_LEN).collect();
    format!("{head}...")
}

/// An error building or reading a mock token.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The claims could not be serialized.
    #[error("could not encode claims: {0}")]
    Encode(#[source] serde_json::Error),

    /// `iat + ttl` does not fit in a Unix timestamp.
    #[error("ttl of {ttl_secs}s from {issued_at} overflows the expiry")]
    TtlOverflow { issued_at: i64, ttl_secs: i64 },

    /// The token does not have three dot-separated segments.
    #[error("expected 3 segments, found {segments}")]
    Malformed { segments: usize },

    /// The payload segment is not valid base64url.
    #[error("payload is not base64url: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The payload decoded but is not a claims object.
    #[error("payload is not a claims object: {0}")]
    Claims(#[source] serde_json::Error),
}
