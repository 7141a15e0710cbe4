// src/services/mod.rs
//! Typed wrappers over the backend's settings, billing and admin endpoints

pub mod admin;
pub mod job_settings;
pub mod subscription;

pub use admin::AdminService;
pub use job_settings::JobSettingsService;
pub use subscription::{PaymentOutcome, SubscriptionService};
