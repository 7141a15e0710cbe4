// src/services/admin.rs
use crate::core::{ApiClient, TokenClaims};
use crate::error::{AutomationError, AutomationResult};
use crate::types::response::{AdminUser, RevenueSummary};
use crate::types::Plan;

pub const ADMIN_USERS_ENDPOINT: &str = "/api/admin/users";
pub const ADMIN_PLANS_ENDPOINT: &str = "/api/admin/plans";
pub const ADMIN_MONEY_ENDPOINT: &str = "/api/admin/money";

/// Admin endpoints. Only constructible from a token carrying the admin role;
/// the backend still enforces the role on every call.
pub struct AdminService {
    api: ApiClient,
}

impl AdminService {
    pub fn new(api: &ApiClient, token: &str) -> AutomationResult<Self> {
        match TokenClaims::inspect(token) {
            Some(claims) if claims.is_admin() && !claims.is_expired() => Ok(Self {
                api: api.with_token(token),
            }),
            _ => Err(AutomationError::AuthRequired),
        }
    }

    pub async fn users(&self) -> AutomationResult<Vec<AdminUser>> {
        self.api.get(ADMIN_USERS_ENDPOINT).await
    }

    pub async fn plans(&self) -> AutomationResult<Vec<Plan>> {
        self.api.get(ADMIN_PLANS_ENDPOINT).await
    }

    pub async fn revenue(&self) -> AutomationResult<RevenueSummary> {
        self.api.get(ADMIN_MONEY_ENDPOINT).await
    }
}
