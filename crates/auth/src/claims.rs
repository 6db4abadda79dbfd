//! Bearer-token claims: decoding and deterministic validation.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use gradebook_core::ApiError;

/// Claims carried by an identity-provider access token.
///
/// Only the claims the backend consumes are modeled; anything else in the
/// token is ignored at decode time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// External subject identifier; the durable key into the user table.
    pub oid: Option<String>,

    pub email: Option<String>,

    /// Display name, when the provider supplies one.
    pub name: Option<String>,

    pub preferred_username: Option<String>,

    /// Expiry as seconds since the Unix epoch.
    pub exp: Option<i64>,
}

impl TokenClaims {
    /// Username to mirror into the local user row.
    pub fn username(&self) -> Option<&str> {
        self.preferred_username
            .as_deref()
            .or(self.name.as_deref())
            .or(self.email.as_deref())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is null or empty")]
    Missing,

    #[error("error parsing token: {0}")]
    Malformed(String),

    #[error("token has expired")]
    Expired,

    #[error("invalid token: missing required fields")]
    MissingFields,
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        ApiError::unauthorized(format!("Error validating token: {err}"))
    }
}

/// Decode a bearer token and validate its claims.
///
/// Fails for an absent/empty/malformed/expired token, or one missing the
/// oid or email claim. The signature is not verified here; only the claim
/// set is checked, against the caller-supplied `now`.
pub fn validate_and_get_claims(token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError> {
    if token.is_empty() {
        return Err(TokenError::Missing);
    }

    let claims = decode_claims(token)?;

    if claims.oid.is_none() || claims.email.is_none() {
        return Err(TokenError::MissingFields);
    }

    if let Some(exp) = claims.exp {
        if now.timestamp() > exp {
            return Err(TokenError::Expired);
        }
    }

    Ok(claims)
}

/// Decode the claim set of a compact JWT without verifying its signature.
fn decode_claims(token: &str) -> Result<TokenClaims, TokenError> {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.algorithms.push(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    // Expiry and audience are validated deterministically by the caller.
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = jsonwebtoken::decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(&[]),
        &validation,
    )
    .map_err(|e| TokenError::Malformed(e.to_string()))?;

    Ok(data.claims)
}
