// src/automation/mod.rs
//! Automation runs (simulated and remote) and the sinks they write to

pub mod log_buffer;
pub mod poller;
pub mod report_sink;
pub mod simulation;

pub use log_buffer::{LogBuffer, LogColor, LogEntry};
pub use poller::{Banner, BannerKind, RemoteJobPoller, RunOptions, RunPhase};
pub use report_sink::{ExportFormat, ReportSink};
pub use simulation::{SimulationEngine, SimulationSettings};
