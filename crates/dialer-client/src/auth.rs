//! Access-token claims and expiry.
//!
//! The dialer never verifies token signatures (the API does that); it only
//! reads `exp` to avoid sending lookups with a token it already knows is
//! dead.

use jsonwebtoken::{DecodingKey, Validation};
use serde::Deserialize;

/// Claims the dialer reads from an access token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TokenClaims {
    /// Expiry, seconds since the Unix epoch.
    #[serde(default)]
    pub exp: Option<i64>,
    /// Subject.
    #[serde(default)]
    pub sub: Option<String>,
}

/// Decode the payload of `token` without verifying its signature.
pub fn decode_claims(token: &str) -> Result<TokenClaims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();
    jsonwebtoken::decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
}

/// Whether `token` carries an `exp` earlier than `now` (Unix seconds).
///
/// A token that cannot be decoded, or has no `exp`, is treated as not
/// expired; the server remains the authority and will answer 401.
pub fn is_expired(token: &str, now: i64) -> bool {
    match decode_claims(token) {
        Ok(TokenClaims { exp: Some(exp), .. }) => exp < now,
        Ok(_) => false,
        Err(e) => {
            tracing::warn!(error = %e, "access token is not a decodable JWT");
            false
        }
    }
}

/// Current Unix time in seconds.
pub fn now_secs() -> i64 {
    chrono::Utc::now().timestamp()
}
