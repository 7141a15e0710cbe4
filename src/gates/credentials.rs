// src/gates/credentials.rs
//! Naukri credential verification gate

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::core::ApiClient;
use crate::error::{AutomationError, AutomationResult};

/// Hex SHA-256 of a secret, so the verified password is never kept in memory
pub fn hash_secret(secret: &str) -> String {
    format!("{:x}", Sha256::digest(secret.as_bytes()))
}

/// Verification state for one Naukri identifier.
///
/// Once verified, the identifier is locked. Changing the secret afterwards
/// makes the verification stale until `verify` succeeds again; that is
/// derived on every call and never stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialGate {
    pub identifier: String,
    pub verified: bool,
    pub last_verified_secret_hash: Option<String>,
}

impl CredentialGate {
    pub fn new(identifier: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            ..Default::default()
        }
    }

    pub fn is_identifier_locked(&self) -> bool {
        self.verified
    }

    pub fn set_identifier(&mut self, identifier: &str) -> AutomationResult<()> {
        if self.is_identifier_locked() && identifier != self.identifier {
            return Err(AutomationError::IdentifierLocked);
        }
        self.identifier = identifier.to_string();
        Ok(())
    }

    pub fn needs_re_verification(&self, current_secret: &str) -> bool {
        self.verified
            && self.last_verified_secret_hash.as_deref() != Some(hash_secret(current_secret).as_str())
    }

    /// Whether automation may use these credentials right now
    pub fn is_usable(&self, identifier: &str, current_secret: &str) -> bool {
        self.verified
            && self.identifier == identifier
            && !self.needs_re_verification(current_secret)
    }

    /// Check the credentials against the backend. On rejection the previous
    /// `verified` flag is left untouched and the server message is returned.
    pub async fn verify(
        &mut self,
        api: &ApiClient,
        identifier: &str,
        secret: &str,
    ) -> AutomationResult<String> {
        if self.is_identifier_locked() && identifier != self.identifier {
            return Err(AutomationError::IdentifierLocked);
        }

        let response = api.verify_naukri_credentials(identifier, secret).await?;
        if !response.success {
            warn!("Naukri credential verification rejected: {}", response.message);
            return Err(AutomationError::VerificationFailed(response.message));
        }

        self.identifier = identifier.to_string();
        self.verified = true;
        self.last_verified_secret_hash = Some(hash_secret(secret));

        info!("Naukri credentials verified for {}", identifier);
        Ok(response.message)
    }
}
