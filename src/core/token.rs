// src/core/token.rs
//! Client-side inspection of the backend's bearer token.
//!
//! The signature is not checked here; the backend remains the authority.
//! Claims are only read to avoid sending requests with a token that has
//! already expired and to hide admin-only calls from regular users.

use chrono::Utc;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default, alias = "userId")]
    pub id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>,
}

impl TokenClaims {
    /// Decode claims without verifying the signature
    pub fn inspect(token: &str) -> Option<Self> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)
            .map(|data| data.claims)
            .ok()
    }

    pub fn is_expired(&self) -> bool {
        self.exp
            .map(|exp| exp <= Utc::now().timestamp())
            .unwrap_or(false)
    }

    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some("admin")
    }
}

/// A token is usable when it decodes and has not expired.
/// Opaque (non-JWT) tokens are passed through untouched.
pub fn is_token_usable(token: &str) -> bool {
    if token.trim().is_empty() {
        return false;
    }
    match TokenClaims::inspect(token) {
        Some(claims) => !claims.is_expired(),
        None => token.split('.').count() != 3,
    }
}
