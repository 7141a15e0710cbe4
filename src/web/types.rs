// src/web/types.rs
use rocket::http::{ContentType, Status};
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use rocket::{Request, Response};

use crate::error::AutomationError;

pub struct XlsxResponse {
    pub data: Vec<u8>,
    pub filename: String,
}

impl<'r> Responder<'r, 'static> for XlsxResponse {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        Response::build()
            .header(ContentType::new(
                "application",
                "vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            ))
            .raw_header(
                "Content-Disposition",
                format!("attachment; filename=\"{}\"", self.filename),
            )
            .sized_body(self.data.len(), std::io::Cursor::new(self.data))
            .ok()
    }
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct DataResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn success(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub error_code: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, error_code: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            error_code: error_code.into(),
        }
    }
}

pub type ApiError = (Status, Json<ErrorResponse>);
pub type ApiResult<T> = Result<Json<DataResponse<T>>, ApiError>;

pub fn api_error(err: AutomationError) -> ApiError {
    let status = match &err {
        AutomationError::AuthRequired => Status::Unauthorized,
        AutomationError::ConfigMissing
        | AutomationError::ProfileIncomplete { .. }
        | AutomationError::ReVerificationRequired
        | AutomationError::IdentifierLocked
        | AutomationError::VerificationFailed(_) => Status::UnprocessableEntity,
        AutomationError::PaymentFailed(_) | AutomationError::PaymentCancelled => {
            Status::PaymentRequired
        }
        AutomationError::RemoteRequestFailed(_) => Status::BadGateway,
        AutomationError::Storage(_) | AutomationError::Export(_) => Status::InternalServerError,
    };
    (status, Json(ErrorResponse::new(err.to_string(), err.code())))
}

#[derive(Debug, Default, Deserialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct RunRequest {
    pub max_pages: Option<u32>,
    pub search_keywords: Option<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct HealthInfo {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct ToggleResult {
    pub running: bool,
    pub message: String,
}
