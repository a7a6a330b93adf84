//! Role extraction from the bearer token.
//!
//! The token is only read, never verified: the server verifies it on every
//! request, the client uses the role claim to decide which affordances to
//! show. Any decode failure degrades to "no role".

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::{Map, Value};

pub const ROLE_CLAIM: &str = "http://schemas.microsoft.com/ws/2008/06/identity/claims/role";
pub const ROLE_CLAIM_SHORT: &str = "role";
pub const ADMIN_ROLE: &str = "Admin";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenDecodeError {
    #[error("token must have three dot-separated segments")]
    MalformedSegments,
    #[error("token payload is not valid base64url")]
    InvalidEncoding,
    #[error("token payload is not a JSON object")]
    InvalidPayload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessLevel {
    Admin,
    Restricted,
}

impl AccessLevel {
    #[must_use]
    pub fn from_role(role: Option<&str>) -> Self {
        match role {
            Some(ADMIN_ROLE) => Self::Admin,
            _ => Self::Restricted,
        }
    }

    #[must_use]
    pub fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// Decodes the claims object carried in the token payload.
pub fn decode_claims(token: &str) -> Result<Map<String, Value>, TokenDecodeError> {
    let mut segments = token.trim().split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(TokenDecodeError::MalformedSegments);
    };
    if payload.is_empty() {
        return Err(TokenDecodeError::MalformedSegments);
    }

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|_| TokenDecodeError::InvalidEncoding)?;
    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(claims)) => Ok(claims),
        _ => Err(TokenDecodeError::InvalidPayload),
    }
}

/// Returns the role claim of `token`, or `None` when the token is absent,
/// unreadable, or carries no string role.
#[must_use]
pub fn role_from_token(token: Option<&str>) -> Option<String> {
    let token = token?;
    let claims = match decode_claims(token) {
        Ok(claims) => claims,
        Err(error) => {
            tracing::debug!(%error, "access token could not be decoded, treating as restricted");
            return None;
        }
    };
    claims
        .get(ROLE_CLAIM)
        .or_else(|| claims.get(ROLE_CLAIM_SHORT))
        .and_then(Value::as_str)
        .map(str::to_string)
}
