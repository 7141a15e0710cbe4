// src/error.rs
//! Error taxonomy shared by every client-side operation

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AutomationError {
    #[error("No job configuration saved. Complete your profile first.")]
    ConfigMissing,

    #[error("Authentication required. Please log in again.")]
    AuthRequired,

    #[error("Request failed: {0}")]
    RemoteRequestFailed(String),

    #[error("Credential verification failed: {0}")]
    VerificationFailed(String),

    #[error("Payment failed: {0}")]
    PaymentFailed(String),

    #[error("Payment cancelled by user")]
    PaymentCancelled,

    #[error("Profile is only {score}% complete")]
    ProfileIncomplete { score: u8 },

    #[error("Naukri password changed since last verification. Verify again before running.")]
    ReVerificationRequired,

    #[error("Naukri username is locked after verification")]
    IdentifierLocked,

    #[error("Local storage error: {0}")]
    Storage(String),

    #[error("Export failed: {0}")]
    Export(String),
}

impl AutomationError {
    /// Stable code used by the dashboard API error envelope
    pub fn code(&self) -> &'static str {
        match self {
            AutomationError::ConfigMissing => "CONFIG_MISSING",
            AutomationError::AuthRequired => "AUTH_REQUIRED",
            AutomationError::RemoteRequestFailed(_) => "REMOTE_REQUEST_FAILED",
            AutomationError::VerificationFailed(_) => "VERIFICATION_FAILED",
            AutomationError::PaymentFailed(_) => "PAYMENT_FAILED",
            AutomationError::PaymentCancelled => "PAYMENT_CANCELLED",
            AutomationError::ProfileIncomplete { .. } => "PROFILE_INCOMPLETE",
            AutomationError::ReVerificationRequired => "REVERIFICATION_REQUIRED",
            AutomationError::IdentifierLocked => "IDENTIFIER_LOCKED",
            AutomationError::Storage(_) => "STORAGE_ERROR",
            AutomationError::Export(_) => "EXPORT_ERROR",
        }
    }
}

impl From<sqlx::Error> for AutomationError {
    fn from(err: sqlx::Error) -> Self {
        AutomationError::Storage(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for AutomationError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        AutomationError::Export(err.to_string())
    }
}

impl From<csv::Error> for AutomationError {
    fn from(err: csv::Error) -> Self {
        AutomationError::Export(err.to_string())
    }
}

pub type AutomationResult<T> = Result<T, AutomationError>;
