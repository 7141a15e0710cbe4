// src/services/job_settings.rs
use tracing::info;

use crate::core::ApiClient;
use crate::error::{AutomationError, AutomationResult};
use crate::types::response::{ActionResponse, JobSettingsResponse, Skill, UserFilters};
use crate::types::JobConfig;

pub const JOB_SETTINGS_ENDPOINT: &str = "/api/job-settings";
pub const USER_FILTERS_ENDPOINT: &str = "/api/filters/user";
pub const SKILLS_ENDPOINT: &str = "/api/skills";

pub struct JobSettingsService {
    api: ApiClient,
}

impl JobSettingsService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Server copy of the job config, `None` if the user never saved one
    pub async fn fetch(&self) -> AutomationResult<Option<JobConfig>> {
        let response: JobSettingsResponse = self.api.get(JOB_SETTINGS_ENDPOINT).await?;
        Ok(response.data)
    }

    pub async fn save(&self, config: &JobConfig) -> AutomationResult<()> {
        let response: ActionResponse = self.api.post_json(JOB_SETTINGS_ENDPOINT, config).await?;
        ensure_success(response, "save job settings")?;
        info!("Job settings saved to backend");
        Ok(())
    }

    pub async fn filters(&self) -> AutomationResult<UserFilters> {
        self.api.get(USER_FILTERS_ENDPOINT).await
    }

    pub async fn save_filters(&self, filters: &UserFilters) -> AutomationResult<()> {
        let response: ActionResponse = self.api.post_json(USER_FILTERS_ENDPOINT, filters).await?;
        ensure_success(response, "save filters")
    }

    pub async fn skills(&self) -> AutomationResult<Vec<Skill>> {
        self.api.get(SKILLS_ENDPOINT).await
    }

    pub async fn add_skill(&self, skill: &Skill) -> AutomationResult<Skill> {
        self.api.post_json(SKILLS_ENDPOINT, skill).await
    }

    pub async fn remove_skill(&self, id: &str) -> AutomationResult<()> {
        let response: ActionResponse = self
            .api
            .delete(&format!("{}/{}", SKILLS_ENDPOINT, id))
            .await?;
        ensure_success(response, "remove skill")
    }
}

pub(crate) fn ensure_success(response: ActionResponse, action: &str) -> AutomationResult<()> {
    if response.success {
        Ok(())
    } else {
        Err(AutomationError::RemoteRequestFailed(format!(
            "Failed to {}: {}",
            action,
            response.message.unwrap_or_else(|| "no reason given".to_string())
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn service(server: &MockServer) -> JobSettingsService {
        JobSettingsService::new(ApiClient::new(&server.uri(), None).unwrap().with_token("t"))
    }

    #[tokio::test]
    async fn test_fetch_accepts_settings_alias() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(JOB_SETTINGS_ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "settings": {"targetRole": "Backend Engineer", "currentCtc": 12.5}
            })))
            .mount(&server)
            .await;

        let config = service(&server).await.fetch().await.unwrap().unwrap();
        assert_eq!(config.target_role.as_deref(), Some("Backend Engineer"));
        assert_eq!(config.current_ctc, Some(12.5));
    }

    #[tokio::test]
    async fn test_fetch_without_saved_settings() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(JOB_SETTINGS_ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        assert!(service(&server).await.fetch().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rejected_save_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(JOB_SETTINGS_ENDPOINT))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"success": false, "message": "invalid ctc"})),
            )
            .mount(&server)
            .await;

        let err = service(&server)
            .await
            .save(&JobConfig::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("invalid ctc"));
    }

    #[tokio::test]
    async fn test_remove_skill_hits_item_path() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/skills/42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;

        service(&server).await.remove_skill("42").await.unwrap();
    }
}
