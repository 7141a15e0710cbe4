// src/automation/poller.rs
//! Remote bot run: one start request plus a status/log polling loop.
//!
//! The start request's own response is the authoritative outcome. The poll
//! loop only streams the bot's log lines while the job is in flight.

use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::log_buffer::{LogBuffer, LogColor, LogEntry};
use crate::core::{token, ApiClient};
use crate::environment::ClientConfig;
use crate::error::{AutomationError, AutomationResult};
use crate::gates::{completeness, CredentialGate};
use crate::types::response::{RemoteLogLine, RunBotRequest};
use crate::types::{JobConfig, Session};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "phase", rename_all = "camelCase")]
pub enum RunPhase {
    Idle,
    Starting,
    Running,
    #[serde(rename_all = "camelCase")]
    Succeeded { jobs_applied: u32 },
    Failed { error: String },
}

impl RunPhase {
    pub fn is_active(&self) -> bool {
        matches!(self, RunPhase::Starting | RunPhase::Running)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RunPhase::Succeeded { .. } | RunPhase::Failed { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BannerKind {
    Success,
    Error,
}

/// User-facing outcome message of the last run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Banner {
    pub kind: BannerKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub success: bool,
    pub jobs_applied: u32,
    pub error: Option<String>,
}

/// View of the current run, rebuilt on every call
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteJobRun {
    pub is_running: bool,
    pub phase: RunPhase,
    pub logs: Vec<LogEntry>,
    pub result: Option<RunResult>,
    pub banner: Option<Banner>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub max_pages: u32,
    pub search_keywords: String,
}

impl RunOptions {
    pub fn from_config(config: &JobConfig, max_pages: u32) -> Self {
        Self {
            max_pages,
            search_keywords: config.search_keywords(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PollerSettings {
    pub poll_interval: Duration,
    pub max_backoff: Duration,
    /// Consecutive failed ticks tolerated before polling gives up
    pub max_failures: u32,
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            max_backoff: Duration::from_secs(30),
            max_failures: 10,
        }
    }
}

impl From<&ClientConfig> for PollerSettings {
    fn from(config: &ClientConfig) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            max_backoff: config.max_poll_backoff(),
            max_failures: config.max_poll_failures,
        }
    }
}

impl PollerSettings {
    /// Delay before the next tick after `failures` consecutive errors
    pub fn backoff(&self, failures: u32) -> Duration {
        let factor = 2u32.saturating_pow(failures.min(16));
        self.poll_interval
            .saturating_mul(factor)
            .min(self.max_backoff.max(self.poll_interval))
    }
}

/// Everything `run` needs checked before leaving `Idle`
pub fn preflight<'a>(session: &'a Session, gate: &CredentialGate) -> AutomationResult<&'a JobConfig> {
    let token = session.bearer_token().ok_or(AutomationError::AuthRequired)?;
    if !token::is_token_usable(token) {
        return Err(AutomationError::AuthRequired);
    }

    let config = completeness::ensure_present(session.active_config())?;
    completeness::ensure_complete(config)?;

    let identifier = config.naukri_username.as_deref().unwrap_or_default();
    let secret = config.naukri_password.as_deref().unwrap_or_default();
    if !gate.is_usable(identifier, secret) {
        return Err(AutomationError::ReVerificationRequired);
    }

    Ok(config)
}

struct RunState {
    generation: u64,
    phase: RunPhase,
    banner: Option<Banner>,
    result: Option<RunResult>,
    seen_remote_lines: usize,
    last_remote_line: Option<String>,
    observed_running: bool,
    api: Option<ApiClient>,
    start_task: Option<JoinHandle<()>>,
    poll_task: Option<JoinHandle<()>>,
}

impl Default for RunState {
    fn default() -> Self {
        Self {
            generation: 0,
            phase: RunPhase::Idle,
            banner: None,
            result: None,
            seen_remote_lines: 0,
            last_remote_line: None,
            observed_running: false,
            api: None,
            start_task: None,
            poll_task: None,
        }
    }
}

impl RunState {
    /// Append the backend lines not yet mirrored into the local buffer
    fn sync_remote_lines(&mut self, lines: &[RemoteLogLine], logs: &LogBuffer) {
        let Some(newest) = lines.last() else {
            return;
        };
        // the backend list is cumulative; a shorter list has nothing new
        if lines.len() < self.seen_remote_lines {
            return;
        }

        let seen = self.seen_remote_lines;
        let last_seen = self.last_remote_line.as_deref();
        let start = if seen == 0 || Some(lines[seen - 1].message()) == last_seen {
            seen
        } else {
            // a capped backend list drops its oldest lines; resume after
            // the last line already mirrored, or take the whole window
            lines
                .iter()
                .rposition(|line| Some(line.message()) == last_seen)
                .map_or(0, |index| index + 1)
        };

        for line in &lines[start..] {
            logs.append(line.message(), LogColor::from_level(line.level()));
        }
        self.seen_remote_lines = lines.len();
        self.last_remote_line = Some(newest.message().to_string());
    }

    fn abort_tasks(&mut self) {
        for task in [self.start_task.take(), self.poll_task.take()].into_iter().flatten() {
            task.abort();
        }
    }
}

pub struct RemoteJobPoller {
    logs: LogBuffer,
    settings: PollerSettings,
    state: Arc<Mutex<RunState>>,
}

impl RemoteJobPoller {
    pub fn new(logs: LogBuffer, settings: PollerSettings) -> Self {
        Self {
            logs,
            settings,
            state: Arc::new(Mutex::new(RunState::default())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RunState> {
        lock_state(&self.state)
    }

    pub fn phase(&self) -> RunPhase {
        self.lock().phase.clone()
    }

    pub fn banner(&self) -> Option<Banner> {
        self.lock().banner.clone()
    }

    pub fn dismiss_banner(&self) {
        self.lock().banner = None;
    }

    pub fn snapshot(&self) -> RemoteJobRun {
        let state = self.lock();
        RemoteJobRun {
            is_running: state.phase.is_active(),
            phase: state.phase.clone(),
            logs: self.logs.snapshot(),
            result: state.result.clone(),
            banner: state.banner.clone(),
        }
    }

    /// Start a remote run. Must be called inside a tokio runtime.
    ///
    /// `api` must carry the session's bearer token. Rejected calls start no
    /// tasks and leave the phase untouched.
    pub fn run(
        &self,
        api: ApiClient,
        session: &Session,
        gate: &CredentialGate,
        options: RunOptions,
    ) -> AutomationResult<()> {
        let mut state = self.lock();
        if state.phase.is_active() {
            debug!("Run requested while a run is already active");
            return Ok(());
        }
        preflight(session, gate)?;
        if !api.has_token() {
            return Err(AutomationError::AuthRequired);
        }

        state.generation += 1;
        state.phase = RunPhase::Starting;
        state.banner = None;
        state.result = None;
        state.seen_remote_lines = 0;
        state.last_remote_line = None;
        state.observed_running = false;
        state.api = Some(api.clone());
        let generation = state.generation;

        self.logs.append(
            format!(
                "🚀 Starting automation: '{}' across {} page(s)",
                options.search_keywords, options.max_pages
            ),
            LogColor::Info,
        );
        info!("Starting remote automation run {}", generation);

        let request = RunBotRequest {
            max_pages: options.max_pages,
            search_keywords: options.search_keywords,
        };
        state.start_task = Some(tokio::spawn(start_request(
            api.clone(),
            request,
            Arc::clone(&self.state),
            self.logs.clone(),
            generation,
        )));
        state.poll_task = Some(tokio::spawn(poll_loop(
            api,
            Arc::clone(&self.state),
            self.logs.clone(),
            self.settings.clone(),
            generation,
        )));

        Ok(())
    }

    /// Optimistic stop: the phase is `Idle` and polling has ended when this
    /// returns. The backend stop request is sent without waiting for it.
    pub fn stop(&self) -> bool {
        let mut state = self.lock();
        if !state.phase.is_active() {
            return false;
        }

        state.generation += 1;
        state.phase = RunPhase::Idle;
        state.abort_tasks();
        self.logs.append("⏹ Stopping automation...", LogColor::Warning);
        self.logs.append("Automation stopped", LogColor::Error);

        if let Some(api) = state.api.take() {
            match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    handle.spawn(async move {
                        match api.stop_automation().await {
                            Ok(ack) if ack.get("success") == Some(&serde_json::Value::Bool(false)) => {
                                warn!("Backend refused the stop request: {}", ack)
                            }
                            Ok(_) => debug!("Backend acknowledged stop request"),
                            Err(e) => warn!("Stop request failed, bot may still be running: {}", e),
                        }
                    });
                }
                Err(_) => warn!("No runtime available to send the stop request"),
            }
        }
        true
    }
}

impl Drop for RemoteJobPoller {
    fn drop(&mut self) {
        self.lock().abort_tasks();
    }
}

fn lock_state(state: &Mutex<RunState>) -> MutexGuard<'_, RunState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

async fn start_request(
    api: ApiClient,
    request: RunBotRequest,
    state: Arc<Mutex<RunState>>,
    logs: LogBuffer,
    generation: u64,
) {
    let outcome = api.run_bot(&request).await;

    let mut state = lock_state(&state);
    if state.generation != generation {
        if let Ok(response) = &outcome {
            if response.success {
                warn!(
                    "Backend finished a run that was stopped locally ({} jobs applied)",
                    response.jobs_applied
                );
            }
        }
        return;
    }

    match outcome {
        Ok(response) => {
            state.sync_remote_lines(&response.logs, &logs);
            if response.success {
                let message = format!(
                    "Automation completed. Applied to {} job(s).",
                    response.jobs_applied
                );
                logs.append(format!("✅ {}", message), LogColor::Success);
                state.phase = RunPhase::Succeeded {
                    jobs_applied: response.jobs_applied,
                };
                state.banner = Some(Banner {
                    kind: BannerKind::Success,
                    message,
                });
            } else {
                let error = response
                    .error
                    .unwrap_or_else(|| "Automation failed".to_string());
                logs.append(format!("❌ {}", error), LogColor::Error);
                state.phase = RunPhase::Failed {
                    error: error.clone(),
                };
                state.banner = Some(Banner {
                    kind: BannerKind::Error,
                    message: error,
                });
            }
            let error = match &state.phase {
                RunPhase::Failed { error } => Some(error.clone()),
                _ => None,
            };
            state.result = Some(RunResult {
                success: response.success,
                jobs_applied: response.jobs_applied,
                error,
            });
        }
        Err(e) => {
            let error = e.to_string();
            logs.append(format!("❌ {}", error), LogColor::Error);
            state.phase = RunPhase::Failed {
                error: error.clone(),
            };
            state.banner = Some(Banner {
                kind: BannerKind::Error,
                message: error.clone(),
            });
            state.result = Some(RunResult {
                success: false,
                jobs_applied: 0,
                error: Some(error),
            });
        }
    }
    info!("Remote automation run {} ended: {:?}", generation, state.phase);
}

async fn poll_loop(
    api: ApiClient,
    state: Arc<Mutex<RunState>>,
    logs: LogBuffer,
    settings: PollerSettings,
    generation: u64,
) {
    let mut failures = 0u32;
    let mut delay = settings.poll_interval;

    loop {
        tokio::time::sleep(delay).await;
        let tick = api.automation_logs().await;

        let mut state = lock_state(&state);
        if state.generation != generation {
            return;
        }

        if state.phase.is_terminal() {
            debug!("Run {} already finished, polling stops", generation);
            return;
        }

        match tick {
            Ok(status) => {
                failures = 0;
                delay = settings.poll_interval;
                state.sync_remote_lines(&status.logs, &logs);

                if status.is_running {
                    state.observed_running = true;
                    if state.phase == RunPhase::Starting {
                        state.phase = RunPhase::Running;
                    }
                }
                if state.observed_running && !status.is_running {
                    debug!("Polling finished for run {}", generation);
                    return;
                }
            }
            Err(e) => {
                failures += 1;
                if failures >= settings.max_failures {
                    logs.append(
                        format!(
                            "⚠ Lost contact with the automation server after {} attempts; live logs paused",
                            failures
                        ),
                        LogColor::Warning,
                    );
                    warn!("Giving up polling run {}: {}", generation, e);
                    return;
                }
                delay = settings.backoff(failures);
                debug!(
                    "Poll tick {} failed ({}), retrying in {:?}",
                    failures, e, delay
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::api_client::{AUTOMATION_LOGS_ENDPOINT, AUTOMATION_STOP_ENDPOINT, RUN_BOT_ENDPOINT};
    use crate::gates::completeness::tests::complete_config;
    use crate::gates::credentials::hash_secret;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings() -> PollerSettings {
        PollerSettings {
            poll_interval: Duration::from_millis(20),
            max_backoff: Duration::from_millis(80),
            max_failures: 3,
        }
    }

    fn session() -> Session {
        Session {
            is_logged_in: true,
            token: Some("opaque-token".to_string()),
            config: Some(complete_config()),
            ..Default::default()
        }
    }

    fn verified_gate() -> CredentialGate {
        CredentialGate {
            identifier: "dev@example.com".to_string(),
            verified: true,
            last_verified_secret_hash: Some(hash_secret("s3cret")),
        }
    }

    fn options() -> RunOptions {
        RunOptions {
            max_pages: 2,
            search_keywords: "rust".to_string(),
        }
    }

    async fn wait_for(poller: &RemoteJobPoller, done: impl Fn(&RunPhase) -> bool) {
        for _ in 0..200 {
            if done(&poller.phase()) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("timed out, phase is {:?}", poller.phase());
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let s = settings();
        assert_eq!(s.backoff(1), Duration::from_millis(40));
        assert_eq!(s.backoff(2), Duration::from_millis(80));
        assert_eq!(s.backoff(10), Duration::from_millis(80));
    }

    #[test]
    fn test_preflight_errors() {
        let gate = verified_gate();

        assert!(matches!(
            preflight(&Session::default(), &gate),
            Err(AutomationError::AuthRequired)
        ));

        let no_config = Session { config: None, ..session() };
        assert!(matches!(
            preflight(&no_config, &gate),
            Err(AutomationError::ConfigMissing)
        ));

        let empty_config = Session {
            config: Some(JobConfig::default()),
            ..session()
        };
        assert!(matches!(
            preflight(&empty_config, &gate),
            Err(AutomationError::ConfigMissing)
        ));

        let mut partial = session();
        partial.config.as_mut().unwrap().location = None;
        assert!(matches!(
            preflight(&partial, &gate),
            Err(AutomationError::ProfileIncomplete { score: 92 })
        ));

        let mut edited = session();
        edited.config.as_mut().unwrap().naukri_password = Some("changed".to_string());
        assert!(matches!(
            preflight(&edited, &gate),
            Err(AutomationError::ReVerificationRequired)
        ));

        assert!(preflight(&session(), &gate).is_ok());
    }

    async fn log_polls(server: &MockServer) -> usize {
        server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .filter(|r| r.url.path() == AUTOMATION_LOGS_ENDPOINT)
            .count()
    }

    fn text_lines(lines: &[&str]) -> Vec<RemoteLogLine> {
        lines
            .iter()
            .map(|line| RemoteLogLine::Text(line.to_string()))
            .collect()
    }

    #[test]
    fn test_sync_resumes_after_backend_list_rotates() {
        let logs = LogBuffer::new();
        let mut state = RunState::default();

        state.sync_remote_lines(&text_lines(&["a", "b", "c"]), &logs);
        assert_eq!(logs.len(), 3);

        // capped list dropped "a" and gained "d"
        state.sync_remote_lines(&text_lines(&["b", "c", "d"]), &logs);
        let texts: Vec<_> = logs.snapshot().into_iter().map(|e| e.text).collect();
        assert_eq!(texts, vec!["a", "b", "c", "d"]);

        state.sync_remote_lines(&text_lines(&["b", "c", "d"]), &logs);
        assert_eq!(logs.len(), 4);

        // rotated past every known line
        state.sync_remote_lines(&text_lines(&["x", "y", "z"]), &logs);
        assert_eq!(logs.len(), 7);

        state.sync_remote_lines(&text_lines(&["z"]), &logs);
        state.sync_remote_lines(&[], &logs);
        assert_eq!(logs.len(), 7);
    }

    #[test]
    fn test_sync_appends_growth_of_cumulative_list() {
        let logs = LogBuffer::new();
        let mut state = RunState::default();

        state.sync_remote_lines(&text_lines(&["tick"]), &logs);
        state.sync_remote_lines(&text_lines(&["tick", "tick"]), &logs);
        state.sync_remote_lines(&text_lines(&["tick", "tick", "done"]), &logs);

        let texts: Vec<_> = logs.snapshot().into_iter().map(|e| e.text).collect();
        assert_eq!(texts, vec!["tick", "tick", "done"]);
    }

    #[tokio::test]
    async fn test_rejected_run_starts_nothing() {
        let server = MockServer::start().await;
        let logs = LogBuffer::new();
        let poller = RemoteJobPoller::new(logs.clone(), settings());
        let api = ApiClient::new(&server.uri(), None).unwrap().with_token("opaque-token");

        let no_config = Session { config: None, ..session() };
        let result = poller.run(api, &no_config, &verified_gate(), options());

        assert!(matches!(result, Err(AutomationError::ConfigMissing)));
        assert_eq!(poller.phase(), RunPhase::Idle);
        assert!(logs.is_empty());
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_successful_run_streams_logs_and_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(RUN_BOT_ENDPOINT))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_millis(150))
                    .set_body_json(serde_json::json!({
                        "success": true,
                        "jobsApplied": 3,
                        "logs": ["Logged in", "Applied to 3 jobs"]
                    })),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(AUTOMATION_LOGS_ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "logs": ["Logged in"],
                "isRunning": true
            })))
            .mount(&server)
            .await;

        let logs = LogBuffer::new();
        let poller = RemoteJobPoller::new(logs.clone(), settings());
        let api = ApiClient::new(&server.uri(), None).unwrap().with_token("opaque-token");
        poller.run(api, &session(), &verified_gate(), options()).unwrap();

        wait_for(&poller, |p| *p == RunPhase::Running).await;
        wait_for(&poller, RunPhase::is_terminal).await;

        assert_eq!(poller.phase(), RunPhase::Succeeded { jobs_applied: 3 });
        let banner = poller.banner().unwrap();
        assert_eq!(banner.kind, BannerKind::Success);

        let texts: Vec<_> = logs.snapshot().into_iter().map(|e| e.text).collect();
        assert_eq!(texts.iter().filter(|t| *t == "Logged in").count(), 1);
        assert!(texts.contains(&"Applied to 3 jobs".to_string()));

        let snapshot = poller.snapshot();
        assert!(!snapshot.is_running);
        assert_eq!(snapshot.result.unwrap().jobs_applied, 3);
    }

    #[tokio::test]
    async fn test_long_run_outlives_request_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(RUN_BOT_ENDPOINT))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_millis(300))
                    .set_body_json(serde_json::json!({"success": true, "jobsApplied": 4})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(AUTOMATION_LOGS_ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "logs": [],
                "isRunning": true
            })))
            .mount(&server)
            .await;

        let poller = RemoteJobPoller::new(LogBuffer::new(), settings());
        let api = ApiClient::new(&server.uri(), Some(Duration::from_millis(100)))
            .unwrap()
            .with_run_timeout(Duration::from_secs(5))
            .with_token("opaque-token");
        poller.run(api, &session(), &verified_gate(), options()).unwrap();
        wait_for(&poller, RunPhase::is_terminal).await;

        assert_eq!(poller.phase(), RunPhase::Succeeded { jobs_applied: 4 });
    }

    #[tokio::test]
    async fn test_polling_ends_when_server_reports_finished() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(RUN_BOT_ENDPOINT))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_millis(700))
                    .set_body_json(serde_json::json!({"success": true, "jobsApplied": 2})),
            )
            .mount(&server)
            .await;
        // first matching mock wins until its budget is spent
        Mock::given(method("GET"))
            .and(path(AUTOMATION_LOGS_ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "logs": ["working"],
                "isRunning": true
            })))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(AUTOMATION_LOGS_ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "logs": ["working", "wrapping up"],
                "isRunning": false
            })))
            .mount(&server)
            .await;

        let logs = LogBuffer::new();
        let poller = RemoteJobPoller::new(logs.clone(), settings());
        let api = ApiClient::new(&server.uri(), None).unwrap().with_token("opaque-token");
        poller.run(api, &session(), &verified_gate(), options()).unwrap();
        wait_for(&poller, |p| *p == RunPhase::Running).await;

        tokio::time::sleep(Duration::from_millis(250)).await;
        let polls = log_polls(&server).await;
        assert_eq!(polls, 3);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(log_polls(&server).await, polls);

        // the start request still decides the outcome
        assert_eq!(poller.phase(), RunPhase::Running);
        assert!(logs.snapshot().iter().any(|e| e.text == "wrapping up"));

        wait_for(&poller, RunPhase::is_terminal).await;
        assert_eq!(poller.phase(), RunPhase::Succeeded { jobs_applied: 2 });
    }

    #[tokio::test]
    async fn test_start_failure_marks_run_failed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(RUN_BOT_ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"success": false, "error": "Naukri login failed"}),
            ))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(AUTOMATION_LOGS_ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"logs": [], "isRunning": false}),
            ))
            .mount(&server)
            .await;

        let poller = RemoteJobPoller::new(LogBuffer::new(), settings());
        let api = ApiClient::new(&server.uri(), None).unwrap().with_token("opaque-token");
        poller.run(api, &session(), &verified_gate(), options()).unwrap();
        wait_for(&poller, RunPhase::is_terminal).await;

        assert_eq!(
            poller.phase(),
            RunPhase::Failed {
                error: "Naukri login failed".to_string()
            }
        );
        assert_eq!(poller.banner().unwrap().kind, BannerKind::Error);
    }

    #[tokio::test]
    async fn test_network_failure_on_start_is_failed_run() {
        let poller = RemoteJobPoller::new(LogBuffer::new(), settings());
        let api = ApiClient::new("http://127.0.0.1:9", Some(Duration::from_millis(200)))
            .unwrap()
            .with_token("opaque-token");
        poller.run(api, &session(), &verified_gate(), options()).unwrap();
        wait_for(&poller, RunPhase::is_terminal).await;

        assert!(matches!(poller.phase(), RunPhase::Failed { .. }));
    }

    #[tokio::test]
    async fn test_stop_is_immediate_and_silences_polling() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(RUN_BOT_ENDPOINT))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_secs(5))
                    .set_body_json(serde_json::json!({"success": true, "jobsApplied": 9})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(AUTOMATION_LOGS_ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "logs": ["tick"],
                "isRunning": true
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(AUTOMATION_STOP_ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let logs = LogBuffer::new();
        let poller = RemoteJobPoller::new(logs.clone(), settings());
        let api = ApiClient::new(&server.uri(), None).unwrap().with_token("opaque-token");
        poller.run(api, &session(), &verified_gate(), options()).unwrap();
        wait_for(&poller, |p| *p == RunPhase::Running).await;

        assert!(poller.stop());
        assert_eq!(poller.phase(), RunPhase::Idle);
        let entries_after_stop = logs.len();
        assert_eq!(logs.snapshot().last().unwrap().text, "Automation stopped");

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(logs.len(), entries_after_stop);
        assert_eq!(poller.phase(), RunPhase::Idle);
        assert!(!poller.stop());
    }

    #[tokio::test]
    async fn test_poll_failures_back_off_then_give_up() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(RUN_BOT_ENDPOINT))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_secs(5))
                    .set_body_json(serde_json::json!({"success": true, "jobsApplied": 1})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(AUTOMATION_LOGS_ENDPOINT))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let logs = LogBuffer::new();
        let poller = RemoteJobPoller::new(logs.clone(), settings());
        let api = ApiClient::new(&server.uri(), None).unwrap().with_token("opaque-token");
        poller.run(api, &session(), &verified_gate(), options()).unwrap();

        // 20ms + 40ms + 80ms of delays before the third failure
        tokio::time::sleep(Duration::from_millis(600)).await;

        assert_eq!(log_polls(&server).await, 3);
        assert!(logs
            .snapshot()
            .iter()
            .any(|e| e.text.contains("Lost contact") && e.color == LogColor::Warning));
        // the start request still decides the outcome
        assert_eq!(poller.phase(), RunPhase::Starting);
        poller.stop();
    }
}
