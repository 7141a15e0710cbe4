// src/types/job_config.rs
//! Job-search configuration and Naukri portal credentials

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

// ===== Job Configuration =====

/// Every field is optional; the completeness gate decides which ones matter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobConfig {
    pub naukri_username: Option<String>,
    pub naukri_password: Option<String>,
    pub resume_file_name: Option<String>,
    pub resume_uploaded_at: Option<String>,
    pub target_role: Option<String>,
    pub experience: Option<String>,
    pub location: Option<String>,
    pub keywords: Option<String>,
    pub current_ctc: Option<f64>,
    pub expected_ctc: Option<f64>,
    pub notice_period: Option<String>,
    pub availability: Option<String>,
    pub years_of_experience: Option<f64>,
    pub date_of_birth: Option<String>,
    pub max_applications_per_day: Option<u32>,
}

impl JobConfig {
    /// Parse a config exported as TOML (same camelCase keys as the API)
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse job configuration TOML")
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize job configuration")
    }

    /// Search keywords sent to the bot, falling back to the target role
    pub fn search_keywords(&self) -> String {
        self.keywords
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .or_else(|| self.target_role.as_deref().map(str::trim))
            .unwrap_or_default()
            .to_string()
    }

    /// Copy of this config with the portal password blanked
    pub fn redacted(&self) -> Self {
        Self {
            naukri_password: self.naukri_password.as_ref().map(|_| "********".to_string()),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml_uses_camel_case_keys() {
        let config = JobConfig::from_toml_str(
            r#"
naukriUsername = "dev@example.com"
targetRole = "Rust Engineer"
currentCtc = 12.5
maxApplicationsPerDay = 40
"#,
        )
        .unwrap();

        assert_eq!(config.naukri_username.as_deref(), Some("dev@example.com"));
        assert_eq!(config.target_role.as_deref(), Some("Rust Engineer"));
        assert_eq!(config.current_ctc, Some(12.5));
        assert_eq!(config.max_applications_per_day, Some(40));
        assert!(config.location.is_none());
    }

    #[test]
    fn test_search_keywords_fallback() {
        let mut config = JobConfig {
            target_role: Some("Backend Developer".to_string()),
            keywords: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(config.search_keywords(), "Backend Developer");

        config.keywords = Some("rust, tokio".to_string());
        assert_eq!(config.search_keywords(), "rust, tokio");
    }

    #[test]
    fn test_redacted_hides_password() {
        let config = JobConfig {
            naukri_password: Some("hunter2".to_string()),
            ..Default::default()
        };
        assert_eq!(config.redacted().naukri_password.as_deref(), Some("********"));
        assert_eq!(JobConfig::default().redacted().naukri_password, None);
    }
}
