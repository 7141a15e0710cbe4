//! Client for a Naukri job-application automation backend: session and
//! job-config storage, credential and profile gates, remote bot runs with
//! log streaming, an offline simulated bot, and report export.

pub mod app;
pub mod automation;
pub mod cli;
pub mod core;
pub mod environment;
pub mod error;
pub mod gates;
pub mod services;
pub mod session;
pub mod types;
pub mod web;

pub use app::AppState;
pub use environment::ClientConfig;
pub use error::{AutomationError, AutomationResult};
