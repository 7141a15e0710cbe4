// src/web/handlers/system_handlers.rs
use rocket::serde::json::Json;
use rocket::State;
use std::sync::Arc;

use crate::app::{AppState, DashboardState};
use crate::web::types::*;

pub async fn health_handler() -> Json<DataResponse<HealthInfo>> {
    DataResponse::success(HealthInfo {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn state_handler(app: &State<Arc<AppState>>) -> Json<DataResponse<DashboardState>> {
    DataResponse::success(app.dashboard_state().await)
}
