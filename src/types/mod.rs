// src/types/mod.rs
pub mod job_config;
pub mod report;
pub mod response;
pub mod session;

pub use job_config::JobConfig;
pub use report::{JobReport, ReportStatus};
pub use session::{Plan, Session, User};
