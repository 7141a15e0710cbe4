// src/web/handlers/report_handlers.rs
use rocket::serde::json::Json;
use rocket::State;
use std::sync::Arc;
use tracing::{error, info};

use crate::app::AppState;
use crate::automation::{ExportFormat, ReportSink};
use crate::types::JobReport;
use crate::web::types::*;

pub async fn reports_handler(app: &State<Arc<AppState>>) -> Json<DataResponse<Vec<JobReport>>> {
    DataResponse::success(app.reports.reports())
}

pub async fn export_reports_handler(app: &State<Arc<AppState>>) -> Result<XlsxResponse, ApiError> {
    match app.reports.to_xlsx_bytes() {
        Ok(data) => {
            info!("Exporting {} report(s) as xlsx", app.reports.len());
            Ok(XlsxResponse {
                data,
                filename: ReportSink::export_file_name(ExportFormat::Xlsx),
            })
        }
        Err(e) => {
            error!("Report export failed: {}", e);
            Err(api_error(e))
        }
    }
}
