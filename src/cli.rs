// src/cli.rs
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::app::{AppState, DEFAULT_MAX_PAGES};
use crate::automation::{
    BannerKind, ExportFormat, LogBuffer, LogEntry, RunPhase, SimulationEngine, SimulationSettings,
};
use crate::environment::ClientConfig;
use crate::services::SubscriptionService;
use crate::types::JobConfig;
use crate::web::start_dashboard_server;

const LOG_FOLLOW_INTERVAL: Duration = Duration::from_millis(250);
const PASSWORD_ENV: &str = "AUTOPILOT_PASSWORD";

#[derive(Parser)]
#[command(name = "naukri-autopilot")]
#[command(about = "Drive Naukri job-application runs from the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file with `local` and `production` sections
    #[arg(long, global = true, default_value = "config.yaml")]
    pub config: PathBuf,

    /// Also write JSON logs to this file
    #[arg(long, global = true)]
    pub log_json: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Log in to the automation backend
    Login {
        email: String,
        /// Falls back to AUTOPILOT_PASSWORD, then to a prompt on stdin
        #[arg(long)]
        password: Option<String>,
    },
    /// Drop the session and every locally stored key
    Logout,
    /// Show session, profile completeness and verification state
    Status,
    /// Inspect or edit the job configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
    /// Verify the configured Naukri credentials with the backend
    Verify,
    /// Start a backend bot run and follow its log until it finishes
    Run {
        #[arg(long, default_value_t = DEFAULT_MAX_PAGES)]
        max_pages: u32,
        /// Overrides the keywords from the job configuration
        #[arg(long)]
        keywords: Option<String>,
        #[command(flatten)]
        export: ExportArgs,
    },
    /// Run the offline simulated bot
    Simulate {
        #[arg(long)]
        seed: Option<u64>,
        /// Stop after this many postings; runs until Ctrl-C otherwise
        #[arg(long)]
        steps: Option<u32>,
        #[command(flatten)]
        export: ExportArgs,
    },
    /// Subscription information
    Subscription {
        #[command(subcommand)]
        action: SubscriptionCommand,
    },
    /// Serve the local dashboard API
    Serve,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the job configuration (password masked)
    Show,
    /// Replace the job configuration from a TOML file
    Import { file: PathBuf },
    /// Upload the local job configuration to the backend
    Push,
    /// Replace the local job configuration with the backend copy
    Pull,
}

#[derive(Subcommand)]
pub enum SubscriptionCommand {
    Status,
    /// Store the backend's active plan as the session plan
    #[command(alias = "select")]
    Sync,
    /// Create a payment order for a plan
    Order { plan_id: String },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ExportChoice {
    Xlsx,
    Csv,
}

impl From<ExportChoice> for ExportFormat {
    fn from(choice: ExportChoice) -> Self {
        match choice {
            ExportChoice::Xlsx => ExportFormat::Xlsx,
            ExportChoice::Csv => ExportFormat::Csv,
        }
    }
}

#[derive(clap::Args)]
pub struct ExportArgs {
    /// Write the session's job report when the run ends
    #[arg(long, value_enum)]
    pub export: Option<ExportChoice>,
    /// Report directory, defaults to `reports_dir` from the configuration
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub async fn handle_command(cli: Cli) -> Result<()> {
    let config = ClientConfig::load_from(&cli.config)?;
    let app = Arc::new(AppState::initialize(config).await?);

    match cli.command {
        Command::Login { email, password } => {
            let password = match password {
                Some(password) => password,
                None => match std::env::var(PASSWORD_ENV) {
                    Ok(password) if !password.is_empty() => password,
                    _ => {
                        eprint!("Password for {}: ", email);
                        std::io::stderr().flush()?;
                        read_password(std::io::stdin().lock())?
                    }
                },
            };
            let session = app.login(&email, &password).await?;
            println!(
                "✅ Logged in as {}",
                session.username().unwrap_or(email.as_str())
            );
        }

        Command::Logout => {
            app.logout().await?;
            println!("✅ Logged out, local session cleared");
        }

        Command::Status => print_status(&app).await?,

        Command::Config { action } => handle_config_command(&app, action).await?,

        Command::Verify => {
            let message = app.verify_credentials().await?;
            println!("✅ Naukri credentials verified");
            if !message.is_empty() {
                println!("   {}", message);
            }
        }

        Command::Run {
            max_pages,
            keywords,
            export,
        } => {
            app.run_automation(Some(max_pages), keywords).await?;
            follow_remote_run(&app).await;
            write_export(&app, &export)?;
        }

        Command::Simulate {
            seed,
            steps,
            export,
        } => {
            let settings = SimulationSettings {
                seed,
                max_steps: steps,
                ..SimulationSettings::from(&app.config)
            };
            let engine = SimulationEngine::new(app.logs.clone(), app.reports.clone(), settings);
            engine.start(app.session().active_config())?;
            follow_simulation(&engine, &app.logs).await;
            println!("📊 {} report(s) recorded", app.reports.len());
            write_export(&app, &export)?;
        }

        Command::Subscription { action } => handle_subscription_command(&app, action).await?,

        Command::Serve => start_dashboard_server(app).await?,
    }

    Ok(())
}

async fn handle_config_command(app: &AppState, action: ConfigCommand) -> Result<()> {
    match action {
        ConfigCommand::Show => match app.session().active_config() {
            Some(config) => print!("{}", config.redacted().to_toml_string()?),
            None => println!("❌ No job configuration saved"),
        },
        ConfigCommand::Import { file } => {
            let config = read_config_file(&file)?;
            app.update_config(config).await?;
            println!("✅ Job configuration imported from {}", file.display());
            print_completeness(app).await;
        }
        ConfigCommand::Push => {
            app.push_config().await?;
            println!("✅ Job configuration uploaded");
        }
        ConfigCommand::Pull => {
            if app.pull_config().await? {
                println!("✅ Job configuration replaced with the backend copy");
                print_completeness(app).await;
            } else {
                println!("❌ The backend has no saved job configuration");
            }
        }
    }
    Ok(())
}

async fn handle_subscription_command(app: &AppState, action: SubscriptionCommand) -> Result<()> {
    match action {
        SubscriptionCommand::Status => {
            let status = SubscriptionService::new(app.authorized_api()?)
                .status()
                .await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        SubscriptionCommand::Sync => {
            let status = app.sync_plan().await?;
            match status.plan.filter(|_| status.active) {
                Some(plan) => println!("✅ Active plan: {}", plan.name),
                None => println!("❌ No active subscription, local plan cleared"),
            }
        }
        SubscriptionCommand::Order { plan_id } => {
            let order = SubscriptionService::new(app.authorized_api()?)
                .create_order(&plan_id)
                .await?;
            println!("{}", serde_json::to_string_pretty(&order)?);
        }
    }
    Ok(())
}

/// First line of `reader`, without the line ending
fn read_password(mut reader: impl BufRead) -> Result<String> {
    let mut line = String::new();
    reader
        .read_line(&mut line)
        .context("Failed to read password")?;
    let password = line.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        bail!("A password is required");
    }
    Ok(password.to_string())
}

fn read_config_file(path: &Path) -> Result<JobConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    JobConfig::from_toml_str(&content)
}

async fn print_status(app: &AppState) -> Result<()> {
    let state = app.dashboard_state().await;

    if !state.is_logged_in {
        println!("Not logged in");
        return Ok(());
    }
    if let Some(user) = &state.user {
        println!("User:        {} <{}>", user.username, user.email);
    }
    println!(
        "Plan:        {}",
        state.plan.as_ref().map(|p| p.name.as_str()).unwrap_or("none")
    );
    println!("Onboarded:   {}", state.onboarding_completed);
    print_completeness(app).await;
    println!(
        "Credentials: {}",
        match (state.credentials_verified, state.needs_re_verification) {
            (true, false) => "verified",
            (true, true) => "password changed, verify again",
            _ => "not verified",
        }
    );
    Ok(())
}

async fn print_completeness(app: &AppState) {
    let state = app.dashboard_state().await;
    println!("Profile:     {}% complete", state.completion_score);
    if !state.missing_fields.is_empty() {
        println!("Missing:     {}", state.missing_fields.join(", "));
    }
}

fn print_entries(entries: &[LogEntry]) -> Option<u64> {
    for entry in entries {
        println!("[{}] {}", entry.timestamp, entry.text);
    }
    entries.last().map(|entry| entry.id)
}

/// Print new log lines until `done` says the producer finished
async fn follow_logs(logs: &LogBuffer, done: impl Fn() -> bool, stop: impl Fn()) {
    let mut last_id = print_entries(&logs.snapshot()).unwrap_or(0);
    let mut ticker = tokio::time::interval(LOG_FOLLOW_INTERVAL);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Some(id) = print_entries(&logs.since(last_id)) {
                    last_id = id;
                }
                if done() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping");
                stop();
                print_entries(&logs.since(last_id));
                break;
            }
        }
    }
}

async fn follow_remote_run(app: &AppState) {
    follow_logs(
        &app.logs,
        || !app.poller.phase().is_active(),
        || {
            app.poller.stop();
        },
    )
    .await;

    match app.poller.phase() {
        RunPhase::Succeeded { jobs_applied } => info!("Run finished, {} job(s) applied", jobs_applied),
        RunPhase::Failed { error } => warn!("Run failed: {}", error),
        _ => {}
    }
    if let Some(banner) = app.poller.banner() {
        let marker = match banner.kind {
            BannerKind::Success => "✅",
            BannerKind::Error => "❌",
        };
        println!("{} {}", marker, banner.message);
    }
}

async fn follow_simulation(engine: &SimulationEngine, logs: &LogBuffer) {
    follow_logs(logs, || !engine.is_running(), || engine.stop()).await;
}

fn write_export(app: &AppState, args: &ExportArgs) -> Result<()> {
    if let Some(choice) = args.export {
        let path = app.export_reports(choice.into(), args.out.as_deref())?;
        println!("📁 Report written to {}", path.display());
    }
    Ok(())
}
