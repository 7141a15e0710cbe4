// src/types/response.rs
use serde::{Deserialize, Serialize};

use super::job_config::JobConfig;
use super::session::{Plan, User};

// ===== Automation =====

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunBotRequest {
    pub max_pages: u32,
    pub search_keywords: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunBotResponse {
    pub success: bool,
    #[serde(default)]
    pub jobs_applied: u32,
    #[serde(default)]
    pub logs: Vec<RemoteLogLine>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationLogsResponse {
    #[serde(default)]
    pub logs: Vec<RemoteLogLine>,
    pub is_running: bool,
}

/// The bot reports either bare strings or `{message, type}` objects
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RemoteLogLine {
    Text(String),
    Structured {
        message: String,
        #[serde(default, alias = "type")]
        level: Option<String>,
    },
}

impl RemoteLogLine {
    pub fn message(&self) -> &str {
        match self {
            RemoteLogLine::Text(text) => text,
            RemoteLogLine::Structured { message, .. } => message,
        }
    }

    pub fn level(&self) -> Option<&str> {
        match self {
            RemoteLogLine::Text(_) => None,
            RemoteLogLine::Structured { level, .. } => level.as_deref(),
        }
    }
}

// ===== Auth =====

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyCredentialsRequest<'a> {
    pub naukri_username: &'a str,
    pub naukri_password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct VerifyCredentialsResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

// ===== Settings =====

#[derive(Debug, Deserialize)]
pub struct JobSettingsResponse {
    #[serde(default, alias = "settings")]
    pub data: Option<JobConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserFilters {
    pub freshness_days: Option<u32>,
    pub work_mode: Option<String>,
    pub min_salary: Option<f64>,
    pub excluded_companies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub years: Option<f64>,
}

// ===== Subscription =====

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionStatus {
    pub active: bool,
    #[serde(default)]
    pub plan: Option<Plan>,
    #[serde(default)]
    pub expires_at: Option<String>,
    #[serde(default)]
    pub applications_remaining: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest<'a> {
    pub plan_id: &'a str,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentOrder {
    pub order_id: String,
    pub amount: f64,
    pub currency: String,
    #[serde(default)]
    pub key_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest<'a> {
    pub order_id: &'a str,
    pub payment_id: &'a str,
    pub signature: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ActionResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

// ===== Admin =====

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub plan: Option<String>,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueSummary {
    pub total_revenue: f64,
    #[serde(default)]
    pub monthly_revenue: f64,
    #[serde(default)]
    pub active_subscriptions: u32,
}
