// src/gates/completeness.rs
//! Profile completion score over the mandatory job configuration fields.
//!
//! This is an advisory gate: it decides whether save/run are offered, the
//! backend may still accept partial settings.

use crate::error::{AutomationError, AutomationResult};
use crate::types::JobConfig;

enum FieldValue<'a> {
    Text(Option<&'a str>),
    Number(Option<f64>),
}

impl FieldValue<'_> {
    fn is_filled(&self) -> bool {
        match self {
            FieldValue::Text(value) => value.is_some_and(|v| !v.trim().is_empty()),
            FieldValue::Number(value) => value.is_some_and(|v| v > 0.0),
        }
    }
}

fn mandatory_fields(config: &JobConfig) -> [(&'static str, FieldValue<'_>); 13] {
    use FieldValue::{Number, Text};

    [
        ("naukriUsername", Text(config.naukri_username.as_deref())),
        ("naukriPassword", Text(config.naukri_password.as_deref())),
        ("resumeFileName", Text(config.resume_file_name.as_deref())),
        ("targetRole", Text(config.target_role.as_deref())),
        ("experience", Text(config.experience.as_deref())),
        ("location", Text(config.location.as_deref())),
        ("keywords", Text(config.keywords.as_deref())),
        ("currentCtc", Number(config.current_ctc)),
        ("expectedCtc", Number(config.expected_ctc)),
        ("noticePeriod", Text(config.notice_period.as_deref())),
        ("availability", Text(config.availability.as_deref())),
        ("yearsOfExperience", Number(config.years_of_experience)),
        ("dateOfBirth", Text(config.date_of_birth.as_deref())),
    ]
}

/// Percentage (0..=100) of mandatory fields filled, rounded to nearest
pub fn completion_score(config: &JobConfig) -> u8 {
    let fields = mandatory_fields(config);
    let filled = fields.iter().filter(|(_, value)| value.is_filled()).count();
    (100.0 * filled as f64 / fields.len() as f64).round() as u8
}

pub fn is_complete(config: &JobConfig) -> bool {
    completion_score(config) == 100
}

/// Names (camelCase, as in the API) of the mandatory fields still empty
pub fn missing_fields(config: &JobConfig) -> Vec<&'static str> {
    mandatory_fields(config)
        .into_iter()
        .filter(|(_, value)| !value.is_filled())
        .map(|(name, _)| name)
        .collect()
}

/// The saved config, unless it is missing or has no mandatory field filled
pub fn ensure_present(config: Option<&JobConfig>) -> AutomationResult<&JobConfig> {
    config
        .filter(|config| completion_score(config) > 0)
        .ok_or(AutomationError::ConfigMissing)
}

pub fn ensure_complete(config: &JobConfig) -> AutomationResult<()> {
    match completion_score(config) {
        100 => Ok(()),
        score => Err(AutomationError::ProfileIncomplete { score }),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn complete_config() -> JobConfig {
        JobConfig {
            naukri_username: Some("dev@example.com".to_string()),
            naukri_password: Some("s3cret".to_string()),
            resume_file_name: Some("resume.pdf".to_string()),
            resume_uploaded_at: None,
            target_role: Some("Rust Engineer".to_string()),
            experience: Some("3-5 years".to_string()),
            location: Some("Bengaluru".to_string()),
            keywords: Some("rust, tokio".to_string()),
            current_ctc: Some(12.0),
            expected_ctc: Some(18.0),
            notice_period: Some("30 days".to_string()),
            availability: Some("Immediate".to_string()),
            years_of_experience: Some(4.0),
            date_of_birth: Some("1995-04-12".to_string()),
            max_applications_per_day: None,
        }
    }

    #[test]
    fn test_empty_and_complete_configs() {
        assert_eq!(completion_score(&JobConfig::default()), 0);
        assert_eq!(missing_fields(&JobConfig::default()).len(), 13);

        let config = complete_config();
        assert_eq!(completion_score(&config), 100);
        assert!(is_complete(&config));
        assert!(ensure_complete(&config).is_ok());
    }

    #[test]
    fn test_blank_config_counts_as_missing() {
        assert!(matches!(ensure_present(None), Err(AutomationError::ConfigMissing)));
        assert!(matches!(
            ensure_present(Some(&JobConfig::default())),
            Err(AutomationError::ConfigMissing)
        ));

        let partial = JobConfig {
            location: Some("Pune".to_string()),
            ..Default::default()
        };
        assert!(ensure_present(Some(&partial)).is_ok());
    }

    #[test]
    fn test_optional_fields_do_not_count() {
        let config = JobConfig {
            resume_uploaded_at: Some("2024-01-01".to_string()),
            max_applications_per_day: Some(50),
            ..Default::default()
        };
        assert_eq!(completion_score(&config), 0);
    }

    #[test]
    fn test_blank_strings_and_zero_numbers_are_not_filled() {
        let config = JobConfig {
            target_role: Some("   ".to_string()),
            current_ctc: Some(0.0),
            years_of_experience: Some(-1.0),
            location: Some("Pune".to_string()),
            ..Default::default()
        };
        // 1 of 13 -> 7.69%
        assert_eq!(completion_score(&config), 8);
        let missing = missing_fields(&config);
        assert!(missing.contains(&"targetRole"));
        assert!(missing.contains(&"currentCtc"));
        assert!(!missing.contains(&"location"));
    }

    #[test]
    fn test_score_is_monotonic_and_reaches_100_only_when_all_filled() {
        let full = complete_config();
        let mut config = JobConfig::default();
        let steps: [fn(&mut JobConfig, &JobConfig); 13] = [
            |c, f| c.naukri_username = f.naukri_username.clone(),
            |c, f| c.naukri_password = f.naukri_password.clone(),
            |c, f| c.resume_file_name = f.resume_file_name.clone(),
            |c, f| c.target_role = f.target_role.clone(),
            |c, f| c.experience = f.experience.clone(),
            |c, f| c.location = f.location.clone(),
            |c, f| c.keywords = f.keywords.clone(),
            |c, f| c.current_ctc = f.current_ctc,
            |c, f| c.expected_ctc = f.expected_ctc,
            |c, f| c.notice_period = f.notice_period.clone(),
            |c, f| c.availability = f.availability.clone(),
            |c, f| c.years_of_experience = f.years_of_experience,
            |c, f| c.date_of_birth = f.date_of_birth.clone(),
        ];

        let mut previous = completion_score(&config);
        for (i, fill) in steps.iter().enumerate() {
            fill(&mut config, &full);
            let score = completion_score(&config);
            assert!(score >= previous);
            assert_eq!(score == 100, i == steps.len() - 1);
            previous = score;
        }
    }

    #[test]
    fn test_ensure_complete_reports_score() {
        let mut config = complete_config();
        config.date_of_birth = None;
        match ensure_complete(&config) {
            Err(AutomationError::ProfileIncomplete { score }) => assert_eq!(score, 92),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
