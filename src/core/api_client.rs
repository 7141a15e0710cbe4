// src/core/api_client.rs
//! Bearer-authenticated JSON client for the automation backend

use reqwest::StatusCode;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::{error, trace};

use crate::error::{AutomationError, AutomationResult};
use crate::types::response::{
    AutomationLogsResponse, LoginRequest, LoginResponse, RunBotRequest, RunBotResponse,
    VerifyCredentialsRequest, VerifyCredentialsResponse,
};

pub const LOGIN_ENDPOINT: &str = "/api/auth/login";
pub const VERIFY_NAUKRI_ENDPOINT: &str = "/api/auth/verify-naukri-credentials";
pub const RUN_BOT_ENDPOINT: &str = "/api/automation/run-bot";
pub const AUTOMATION_LOGS_ENDPOINT: &str = "/api/automation/logs";
pub const AUTOMATION_STOP_ENDPOINT: &str = "/api/automation/stop";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// The run-bot request stays open for the whole server-side run
const DEFAULT_RUN_TIMEOUT_SECS: u64 = 3 * 60 * 60;

/// Cheap to clone: the underlying `reqwest::Client` is reference counted.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    run_timeout: Duration,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> AutomationResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout.unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)))
            .build()
            .map_err(|e| {
                AutomationError::RemoteRequestFailed(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            run_timeout: Duration::from_secs(DEFAULT_RUN_TIMEOUT_SECS),
        })
    }

    /// Timeout for the run-bot request only; every other call keeps the
    /// client-wide timeout
    pub fn with_run_timeout(mut self, run_timeout: Duration) -> Self {
        self.run_timeout = run_timeout;
        self
    }

    /// Same client, authenticated with the given bearer token
    pub fn with_token(&self, token: &str) -> Self {
        Self {
            token: Some(token.to_string()),
            ..self.clone()
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<R>(&self, builder: reqwest::RequestBuilder, url: &str) -> AutomationResult<R>
    where
        R: DeserializeOwned,
    {
        let response = self
            .authorized(builder)
            .send()
            .await
            .map_err(|e| AutomationError::RemoteRequestFailed(format!("{}: {}", url, e)))?;

        let status = response.status();
        trace!("Response status from {}: {}", url, status);

        if status.is_success() {
            response.json::<R>().await.map_err(|e| {
                AutomationError::RemoteRequestFailed(format!(
                    "Failed to parse JSON response from {}: {}",
                    url, e
                ))
            })
        } else {
            Err(Self::status_error(status, response).await)
        }
    }

    async fn status_error(status: StatusCode, response: reqwest::Response) -> AutomationError {
        if status == StatusCode::UNAUTHORIZED {
            return AutomationError::AuthRequired;
        }
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        error!("Backend error response {}: {}", status, error_text);
        AutomationError::RemoteRequestFailed(format!("HTTP {} error: {}", status, error_text))
    }

    /// Generic GET request
    pub async fn get<R>(&self, endpoint: &str) -> AutomationResult<R>
    where
        R: DeserializeOwned,
    {
        let url = self.url(endpoint);
        self.send(self.client.get(&url), &url).await
    }

    /// Generic POST request with JSON
    pub async fn post_json<T, R>(&self, endpoint: &str, payload: &T) -> AutomationResult<R>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.url(endpoint);
        self.send(self.client.post(&url).json(payload), &url).await
    }

    /// Generic DELETE request
    pub async fn delete<R>(&self, endpoint: &str) -> AutomationResult<R>
    where
        R: DeserializeOwned,
    {
        let url = self.url(endpoint);
        self.send(self.client.delete(&url), &url).await
    }

    pub async fn login(&self, email: &str, password: &str) -> AutomationResult<LoginResponse> {
        self.post_json(LOGIN_ENDPOINT, &LoginRequest { email, password })
            .await
    }

    /// Check Naukri credentials. A rejection is returned as `success == false`,
    /// whatever status code the backend used for it.
    pub async fn verify_naukri_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> AutomationResult<VerifyCredentialsResponse> {
        let url = self.url(VERIFY_NAUKRI_ENDPOINT);
        let payload = VerifyCredentialsRequest {
            naukri_username: username,
            naukri_password: password,
        };

        let response = self
            .authorized(self.client.post(&url).json(&payload))
            .send()
            .await
            .map_err(|e| AutomationError::RemoteRequestFailed(format!("{}: {}", url, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AutomationError::RemoteRequestFailed(e.to_string()))?;

        match serde_json::from_str::<VerifyCredentialsResponse>(&body) {
            Ok(parsed) if status.is_success() || !parsed.success => Ok(parsed),
            _ if status == StatusCode::UNAUTHORIZED => Err(AutomationError::AuthRequired),
            _ => Err(AutomationError::RemoteRequestFailed(format!(
                "HTTP {} error: {}",
                status, body
            ))),
        }
    }

    pub async fn run_bot(&self, request: &RunBotRequest) -> AutomationResult<RunBotResponse> {
        let url = self.url(RUN_BOT_ENDPOINT);
        let builder = self
            .client
            .post(&url)
            .json(request)
            .timeout(self.run_timeout);
        self.send(builder, &url).await
    }

    pub async fn automation_logs(&self) -> AutomationResult<AutomationLogsResponse> {
        self.get(AUTOMATION_LOGS_ENDPOINT).await
    }

    pub async fn stop_automation(&self) -> AutomationResult<serde_json::Value> {
        self.post_json(AUTOMATION_STOP_ENDPOINT, &serde_json::json!({}))
            .await
    }
}
