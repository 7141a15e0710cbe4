// src/web/handlers/automation_handlers.rs
use rocket::serde::json::Json;
use rocket::State;
use std::sync::Arc;
use tracing::{info, warn};

use crate::app::AppState;
use crate::automation::LogEntry;
use crate::web::types::*;

pub async fn logs_handler(
    after: Option<u64>,
    app: &State<Arc<AppState>>,
) -> Json<DataResponse<Vec<LogEntry>>> {
    let entries = match after {
        Some(after_id) => app.logs.since(after_id),
        None => app.logs.snapshot(),
    };
    DataResponse::success(entries)
}

pub async fn start_simulation_handler(app: &State<Arc<AppState>>) -> ApiResult<ToggleResult> {
    app.start_simulation().map_err(|e| {
        warn!("Simulation refused: {}", e);
        api_error(e)
    })?;

    Ok(DataResponse::success(ToggleResult {
        running: true,
        message: "Simulation started".to_string(),
    }))
}

pub async fn stop_simulation_handler(app: &State<Arc<AppState>>) -> Json<DataResponse<ToggleResult>> {
    let was_running = app.simulation.is_running();
    app.simulation.stop();

    DataResponse::success(ToggleResult {
        running: false,
        message: if was_running {
            "Simulation stopped".to_string()
        } else {
            "Simulation was not running".to_string()
        },
    })
}

pub async fn run_automation_handler(
    request: Option<Json<RunRequest>>,
    app: &State<Arc<AppState>>,
) -> ApiResult<ToggleResult> {
    let request = request.map(|r| r.into_inner()).unwrap_or_default();

    app.run_automation(request.max_pages, request.search_keywords)
        .await
        .map_err(|e| {
            warn!("Automation run refused: {}", e);
            api_error(e)
        })?;

    info!("Automation run requested from dashboard");
    Ok(DataResponse::success(ToggleResult {
        running: app.poller.phase().is_active(),
        message: "Automation started".to_string(),
    }))
}

pub async fn stop_automation_handler(app: &State<Arc<AppState>>) -> Json<DataResponse<ToggleResult>> {
    let stopped = app.poller.stop();

    DataResponse::success(ToggleResult {
        running: false,
        message: if stopped {
            "Automation stopped".to_string()
        } else {
            "No automation run in progress".to_string()
        },
    })
}
