// src/web/mod.rs
//! Local dashboard API over the shared application state

pub mod handlers;
pub mod types;

pub use types::*;

use anyhow::Result;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{Header, Status};
use rocket::serde::json::Json;
use rocket::{catchers, get, options, post, routes, Build, Request, Response, Rocket, State};
use std::sync::Arc;
use tracing::info;

use crate::app::{AppState, DashboardState};
use crate::automation::LogEntry;
use crate::types::JobReport;

pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, GET, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
    }
}

#[get("/health")]
pub async fn health() -> Json<DataResponse<HealthInfo>> {
    handlers::health_handler().await
}

#[get("/state")]
pub async fn state(app: &State<Arc<AppState>>) -> Json<DataResponse<DashboardState>> {
    handlers::state_handler(app).await
}

#[get("/logs?<after>")]
pub async fn logs(after: Option<u64>, app: &State<Arc<AppState>>) -> Json<DataResponse<Vec<LogEntry>>> {
    handlers::logs_handler(after, app).await
}

#[get("/reports")]
pub async fn reports(app: &State<Arc<AppState>>) -> Json<DataResponse<Vec<JobReport>>> {
    handlers::reports_handler(app).await
}

#[get("/reports/export")]
pub async fn export_reports(app: &State<Arc<AppState>>) -> Result<XlsxResponse, ApiError> {
    handlers::export_reports_handler(app).await
}

#[post("/simulation/start")]
pub async fn start_simulation(app: &State<Arc<AppState>>) -> ApiResult<ToggleResult> {
    handlers::start_simulation_handler(app).await
}

#[post("/simulation/stop")]
pub async fn stop_simulation(app: &State<Arc<AppState>>) -> Json<DataResponse<ToggleResult>> {
    handlers::stop_simulation_handler(app).await
}

#[post("/automation/run", data = "<request>")]
pub async fn run_automation(
    request: Option<Json<RunRequest>>,
    app: &State<Arc<AppState>>,
) -> ApiResult<ToggleResult> {
    handlers::run_automation_handler(request, app).await
}

#[post("/automation/stop")]
pub async fn stop_automation(app: &State<Arc<AppState>>) -> Json<DataResponse<ToggleResult>> {
    handlers::stop_automation_handler(app).await
}

#[options("/<_..>")]
pub async fn options() -> Status {
    Status::Ok
}

#[rocket::catch(404)]
pub fn not_found() -> Json<ErrorResponse> {
    Json(ErrorResponse::new("Endpoint not found", "NOT_FOUND"))
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<ErrorResponse> {
    Json(ErrorResponse::new("Internal server error", "INTERNAL_ERROR"))
}

pub fn build_rocket(app: Arc<AppState>) -> Rocket<Build> {
    let figment = rocket::Config::figment()
        .merge(("port", app.config.dashboard_port))
        .merge(("address", "127.0.0.1"));

    rocket::custom(figment)
        .attach(Cors)
        .manage(app)
        .register("/api", catchers![not_found, internal_error])
        .mount(
            "/api",
            routes![
                health,
                state,
                logs,
                reports,
                export_reports,
                start_simulation,
                stop_simulation,
                run_automation,
                stop_automation,
                options,
            ],
        )
}

pub async fn start_dashboard_server(app: Arc<AppState>) -> Result<()> {
    info!(
        "Starting dashboard API on http://127.0.0.1:{}/api",
        app.config.dashboard_port
    );

    let _rocket = build_rocket(app).launch().await?;
    Ok(())
}
