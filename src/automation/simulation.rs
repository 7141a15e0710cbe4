// src/automation/simulation.rs
//! Scripted, timer-driven stand-in for the backend bot.
//!
//! Nothing here talks to Naukri. The engine walks through a fixed login and
//! search script, then inspects one made-up posting per tick and records the
//! outcome in the shared log buffer and report sink.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::info;

use super::log_buffer::{LogBuffer, LogColor};
use super::report_sink::ReportSink;
use crate::environment::ClientConfig;
use crate::error::AutomationResult;
use crate::gates::completeness;
use crate::types::{JobConfig, JobReport, ReportStatus};

pub const EXTERNAL_MATCH_SCORE: u8 = 85;
pub const APPLIED_MATCH_SCORE: u8 = 95;
pub const MIN_CHECKS_TO_APPLY: u8 = 4;

const POSTINGS: [(&str, &str); 10] = [
    ("Senior Software Engineer", "Infosys"),
    ("Backend Developer", "TCS"),
    ("Full Stack Developer", "Wipro"),
    ("Rust Developer", "Zoho"),
    ("Platform Engineer", "Freshworks"),
    ("Software Development Engineer II", "Flipkart"),
    ("Cloud Engineer", "HCLTech"),
    ("Systems Programmer", "Tech Mahindra"),
    ("API Developer", "Razorpay"),
    ("DevOps Engineer", "Swiggy"),
];

const CHATBOT_QUESTIONS: [(&str, &str); 3] = [
    ("What is your notice period?", "30 days"),
    ("Are you willing to relocate?", "Yes"),
    ("How many years of experience do you have?", "5"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDecision {
    /// Poor match, nothing recorded
    Skip,
    /// Posting applies on the employer's site
    External,
    Apply { chatbot: bool },
}

/// Apply only when no red flag was raised and enough checks passed
pub fn decide(check: u8, cross: u8, external: bool, chatbot: bool) -> StepDecision {
    if cross != 0 || check < MIN_CHECKS_TO_APPLY {
        StepDecision::Skip
    } else if external {
        StepDecision::External
    } else {
        StepDecision::Apply { chatbot }
    }
}

/// Every random draw made for one inspected posting
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationStep {
    pub job_title: &'static str,
    pub company: &'static str,
    pub check: u8,
    pub cross: u8,
    pub external: bool,
    pub chatbot: bool,
}

impl SimulationStep {
    pub fn roll<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let (job_title, company) = POSTINGS[rng.gen_range(0..POSTINGS.len())];
        Self {
            job_title,
            company,
            check: rng.gen_range(2..=6),
            cross: u8::from(rng.gen_bool(0.2)),
            external: rng.gen_bool(0.2),
            chatbot: rng.gen_bool(0.5),
        }
    }

    pub fn decision(&self) -> StepDecision {
        decide(self.check, self.cross, self.external, self.chatbot)
    }

    /// Emit the log lines for this step and record its report, if any
    pub fn play(&self, logs: &LogBuffer, reports: &ReportSink) -> StepDecision {
        logs.append(
            format!("📄 Inspecting: {} at {}", self.job_title, self.company),
            LogColor::Info,
        );
        logs.append(
            format!(
                "📊 Match check: {}/6 criteria met, {} red flag(s)",
                self.check, self.cross
            ),
            LogColor::Default,
        );

        let decision = self.decision();
        match decision {
            StepDecision::Skip => {
                logs.append("⏭ Poor match, skipping", LogColor::Muted);
            }
            StepDecision::External => {
                logs.append(
                    "🔗 Applies on company website (External), skipping",
                    LogColor::Warning,
                );
                reports.add_report(JobReport::new(
                    self.job_title,
                    self.company,
                    EXTERNAL_MATCH_SCORE,
                    ReportStatus::External,
                ));
            }
            StepDecision::Apply { chatbot } => {
                logs.append("🖱 Clicking Apply...", LogColor::Default);
                if chatbot {
                    let (question, answer) =
                        CHATBOT_QUESTIONS[usize::from(self.check) % CHATBOT_QUESTIONS.len()];
                    logs.append(format!("🤖 Recruiter bot: {}", question), LogColor::Muted);
                    logs.append(format!("💬 Answered: {}", answer), LogColor::Muted);
                }
                logs.append(
                    format!("✅ Applied to {} at {}", self.job_title, self.company),
                    LogColor::Success,
                );
                reports.add_report(JobReport::new(
                    self.job_title,
                    self.company,
                    APPLIED_MATCH_SCORE,
                    ReportStatus::Applied,
                ));
            }
        }
        decision
    }
}

#[derive(Debug, Clone)]
pub struct SimulationSettings {
    pub intro_delay: Duration,
    pub step_period: Duration,
    pub seed: Option<u64>,
    /// Stop by itself after this many inspected postings
    pub max_steps: Option<u32>,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            intro_delay: Duration::from_millis(1500),
            step_period: Duration::from_secs(4),
            seed: None,
            max_steps: None,
        }
    }
}

impl From<&ClientConfig> for SimulationSettings {
    fn from(config: &ClientConfig) -> Self {
        Self {
            intro_delay: Duration::from_millis(config.simulation_intro_delay_ms),
            step_period: Duration::from_millis(config.simulation_step_ms),
            ..Self::default()
        }
    }
}

#[derive(Debug, Default)]
struct SimulationRun {
    generation: u64,
    task: Option<JoinHandle<()>>,
}

pub struct SimulationEngine {
    logs: LogBuffer,
    reports: ReportSink,
    settings: SimulationSettings,
    run: Arc<Mutex<SimulationRun>>,
}

impl SimulationEngine {
    pub fn new(logs: LogBuffer, reports: ReportSink, settings: SimulationSettings) -> Self {
        Self {
            logs,
            reports,
            settings,
            run: Arc::new(Mutex::new(SimulationRun::default())),
        }
    }

    fn state(&self) -> MutexGuard<'_, SimulationRun> {
        self.run.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn is_running(&self) -> bool {
        self.state()
            .task
            .as_ref()
            .map(|task| !task.is_finished())
            .unwrap_or(false)
    }

    /// Start the scripted run. Must be called inside a tokio runtime.
    pub fn start(&self, config: Option<&JobConfig>) -> AutomationResult<()> {
        let config = completeness::ensure_present(config)?;

        let mut state = self.state();
        if state.task.as_ref().is_some_and(|task| !task.is_finished()) {
            return Ok(());
        }
        state.generation += 1;

        let script = ScriptedRun {
            generation: state.generation,
            run: Arc::clone(&self.run),
            logs: self.logs.clone(),
            reports: self.reports.clone(),
            settings: self.settings.clone(),
            username: config
                .naukri_username
                .clone()
                .unwrap_or_else(|| "your Naukri account".to_string()),
            keywords: config.search_keywords(),
            location: config.location.clone().unwrap_or_else(|| "India".to_string()),
        };

        info!("Starting simulated automation run {}", state.generation);
        state.task = Some(tokio::spawn(script.execute()));
        Ok(())
    }

    /// Cancel the run; nothing from it is logged after this returns
    pub fn stop(&self) {
        let mut state = self.state();
        state.generation += 1;
        if let Some(task) = state.task.take() {
            if !task.is_finished() {
                self.logs.append("⏹ Automation stopped", LogColor::Error);
            }
            task.abort();
        }
    }
}

impl Drop for SimulationEngine {
    fn drop(&mut self) {
        if let Some(task) = self.state().task.take() {
            task.abort();
        }
    }
}

struct ScriptedRun {
    generation: u64,
    run: Arc<Mutex<SimulationRun>>,
    logs: LogBuffer,
    reports: ReportSink,
    settings: SimulationSettings,
    username: String,
    keywords: String,
    location: String,
}

impl ScriptedRun {
    /// Run `f` only while this run is still the current one
    fn if_current<T>(&self, f: impl FnOnce() -> T) -> Option<T> {
        let state = self.run.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        (state.generation == self.generation).then(f)
    }

    async fn execute(self) {
        let intro = [
            ("🌐 Opening Naukri login page...".to_string(), LogColor::Info),
            (format!("🔐 Logging in as {}", self.username), LogColor::Info),
            (
                format!(
                    "🔍 Opening search results for '{}' in {}",
                    self.keywords, self.location
                ),
                LogColor::Info,
            ),
        ];
        for (text, color) in intro {
            if self.if_current(|| self.logs.append(text, color)).is_none() {
                return;
            }
            tokio::time::sleep(self.settings.intro_delay).await;
        }

        let mut rng = match self.settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut ticker = tokio::time::interval(self.settings.step_period);
        ticker.tick().await;

        let mut steps = 0u32;
        loop {
            ticker.tick().await;
            let step = SimulationStep::roll(&mut rng);
            if self
                .if_current(|| step.play(&self.logs, &self.reports))
                .is_none()
            {
                return;
            }

            steps += 1;
            if self.settings.max_steps.is_some_and(|max| steps >= max) {
                self.if_current(|| {
                    self.logs
                        .append("🏁 Simulated session complete", LogColor::Success)
                });
                return;
            }
        }
    }
}
