// src/types/report.rs
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportStatus {
    Applied,
    Failed,
    External,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Applied => "Applied",
            ReportStatus::Failed => "Failed",
            ReportStatus::External => "External",
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One processed job posting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobReport {
    pub id: Uuid,
    pub date: String,
    pub job_title: String,
    pub company: String,
    pub match_score: u8,
    pub status: ReportStatus,
    pub platform: String,
}

impl JobReport {
    /// New Naukri report dated today; the score is clamped to 0..=100
    pub fn new(job_title: &str, company: &str, match_score: u8, status: ReportStatus) -> Self {
        Self {
            id: Uuid::new_v4(),
            date: Local::now().format("%Y-%m-%d").to_string(),
            job_title: job_title.to_string(),
            company: company.to_string(),
            match_score: match_score.min(100),
            status,
            platform: "Naukri".to_string(),
        }
    }

    pub fn with_date(mut self, date: &str) -> Self {
        self.date = date.to_string();
        self
    }
}
