// src/app.rs
//! Application state shared by the CLI and the dashboard server

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::info;

use crate::automation::poller::PollerSettings;
use crate::automation::{
    Banner, ExportFormat, LogBuffer, RemoteJobPoller, ReportSink, RunOptions, RunPhase,
    SimulationEngine, SimulationSettings,
};
use crate::core::{ApiClient, LocalStore};
use crate::environment::ClientConfig;
use crate::error::{AutomationError, AutomationResult};
use crate::gates::{completion_score, ensure_present, missing_fields, CredentialGate};
use crate::services::{JobSettingsService, SubscriptionService};
use crate::session::SessionStore;
use crate::types::response::SubscriptionStatus;
use crate::types::{JobConfig, Plan, Session, User};

pub const DEFAULT_MAX_PAGES: u32 = 5;

/// Summary served by `GET /api/state` and printed by `status`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardState {
    pub is_logged_in: bool,
    pub user: Option<User>,
    pub plan: Option<Plan>,
    pub onboarding_completed: bool,
    pub has_config: bool,
    pub completion_score: u8,
    pub missing_fields: Vec<&'static str>,
    pub credentials_verified: bool,
    pub needs_re_verification: bool,
    pub simulation_running: bool,
    pub run: RunPhase,
    pub banner: Option<Banner>,
    pub report_count: usize,
}

pub struct AppState {
    pub config: ClientConfig,
    pub api: ApiClient,
    pub sessions: SessionStore,
    pub gate: Mutex<CredentialGate>,
    pub logs: LogBuffer,
    pub reports: ReportSink,
    pub simulation: SimulationEngine,
    pub poller: RemoteJobPoller,
}

impl AppState {
    pub async fn initialize(config: ClientConfig) -> Result<Self> {
        config.ensure_directories().await?;

        let api = ApiClient::new(&config.api_base_url, Some(config.request_timeout()))
            .context("Failed to build backend client")?
            .with_run_timeout(config.run_timeout());
        let store = LocalStore::open(&config.storage_path)
            .await
            .context("Failed to open local storage")?;
        let sessions = SessionStore::restore(store)
            .await
            .context("Failed to restore session")?;
        let gate = sessions
            .load_verification()
            .await
            .context("Failed to load credential verification")?;

        let logs = LogBuffer::new();
        let reports = ReportSink::new();
        let simulation = SimulationEngine::new(
            logs.clone(),
            reports.clone(),
            SimulationSettings::from(&config),
        );
        let poller = RemoteJobPoller::new(logs.clone(), PollerSettings::from(&config));

        info!("Backend: {}", api.base_url());
        Ok(Self {
            config,
            api,
            sessions,
            gate: Mutex::new(gate),
            logs,
            reports,
            simulation,
            poller,
        })
    }

    pub fn session(&self) -> Session {
        self.sessions.current()
    }

    pub fn authorized_api(&self) -> AutomationResult<ApiClient> {
        self.sessions.authorized_api(&self.api)
    }

    pub async fn dashboard_state(&self) -> DashboardState {
        let session = self.session();
        let gate = self.gate.lock().await;
        let config = session.active_config();
        let secret = config
            .and_then(|c| c.naukri_password.as_deref())
            .unwrap_or_default();

        DashboardState {
            is_logged_in: session.is_logged_in,
            user: session.user.clone(),
            plan: session.active_plan().cloned(),
            onboarding_completed: session.onboarding_completed,
            has_config: config.is_some(),
            completion_score: config.map(completion_score).unwrap_or(0),
            missing_fields: config.map(missing_fields).unwrap_or_default(),
            credentials_verified: gate.verified,
            needs_re_verification: gate.needs_re_verification(secret),
            simulation_running: self.simulation.is_running(),
            run: self.poller.phase(),
            banner: self.poller.banner(),
            report_count: self.reports.len(),
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> AutomationResult<Session> {
        let session = self.sessions.login(&self.api, email, password).await?;
        *self.gate.lock().await = self.sessions.load_verification().await?;
        Ok(session)
    }

    /// Stop anything running, then drop the session
    pub async fn logout(&self) -> AutomationResult<()> {
        self.simulation.stop();
        self.poller.stop();
        *self.gate.lock().await = CredentialGate::default();
        self.sessions.logout().await
    }

    /// Save a new job config. Changing the Naukri username after it was
    /// verified is refused.
    pub async fn update_config(&self, config: JobConfig) -> AutomationResult<()> {
        if !self.session().is_logged_in {
            return Err(AutomationError::AuthRequired);
        }
        if let Some(identifier) = config.naukri_username.as_deref() {
            self.gate.lock().await.set_identifier(identifier)?;
        }
        self.sessions.update_config(config).await?;
        if !self.session().onboarding_completed {
            self.sessions.complete_onboarding().await?;
        }
        Ok(())
    }

    pub async fn verify_credentials(&self) -> AutomationResult<String> {
        let api = self.authorized_api()?;
        let session = self.session();
        let config = session.active_config().ok_or(AutomationError::ConfigMissing)?;
        let identifier = config.naukri_username.as_deref().unwrap_or_default();
        let secret = config.naukri_password.as_deref().unwrap_or_default();

        let mut gate = self.gate.lock().await;
        let message = gate.verify(&api, identifier, secret).await?;
        self.sessions.save_verification(&gate).await?;
        Ok(message)
    }

    pub async fn run_automation(
        &self,
        max_pages: Option<u32>,
        keywords: Option<String>,
    ) -> AutomationResult<()> {
        let session = self.session();
        let api = self.authorized_api()?;
        let config = ensure_present(session.active_config())?;

        let mut options = RunOptions::from_config(config, max_pages.unwrap_or(DEFAULT_MAX_PAGES));
        if let Some(keywords) = keywords.filter(|k| !k.trim().is_empty()) {
            options.search_keywords = keywords;
        }

        let gate = self.gate.lock().await.clone();
        self.poller.run(api, &session, &gate, options)
    }

    pub fn start_simulation(&self) -> AutomationResult<()> {
        let session = self.session();
        self.simulation.start(session.active_config())
    }

    pub async fn push_config(&self) -> AutomationResult<()> {
        let session = self.session();
        let config = session.active_config().ok_or(AutomationError::ConfigMissing)?;
        JobSettingsService::new(self.authorized_api()?)
            .save(config)
            .await
    }

    /// Replace the local config with the server copy, if the server has one
    pub async fn pull_config(&self) -> AutomationResult<bool> {
        match JobSettingsService::new(self.authorized_api()?).fetch().await? {
            Some(config) => {
                self.update_config(config).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Fetch the subscription and keep the session plan in step with it.
    /// An inactive subscription clears the stored plan.
    pub async fn sync_plan(&self) -> AutomationResult<SubscriptionStatus> {
        let status = SubscriptionService::new(self.authorized_api()?)
            .status()
            .await?;
        let plan = status.plan.clone().filter(|_| status.active);
        self.sessions.select_plan(plan).await?;
        Ok(status)
    }

    pub fn export_reports(
        &self,
        format: ExportFormat,
        dir: Option<&Path>,
    ) -> AutomationResult<PathBuf> {
        self.reports
            .export(dir.unwrap_or(&self.config.reports_dir), format)
    }
}
