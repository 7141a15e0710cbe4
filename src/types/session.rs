// src/types/session.rs
use serde::{Deserialize, Serialize};

use super::job_config::JobConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some("admin")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: String,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub duration_days: Option<u32>,
    #[serde(default)]
    pub max_applications: Option<u32>,
}

/// Logged-in user state. `Session::default()` is the logged-out value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user: Option<User>,
    pub is_logged_in: bool,
    pub plan: Option<Plan>,
    pub config: Option<JobConfig>,
    pub onboarding_completed: bool,
    #[serde(skip)]
    pub token: Option<String>,
}

impl Session {
    pub fn username(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.username.as_str())
    }

    pub fn email(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.email.as_str())
    }

    /// Config that may drive gated actions; never set while logged out
    pub fn active_config(&self) -> Option<&JobConfig> {
        if self.is_logged_in {
            self.config.as_ref()
        } else {
            None
        }
    }

    pub fn active_plan(&self) -> Option<&Plan> {
        if self.is_logged_in {
            self.plan.as_ref()
        } else {
            None
        }
    }

    pub fn bearer_token(&self) -> Option<&str> {
        if self.is_logged_in {
            self.token.as_deref()
        } else {
            None
        }
    }
}
