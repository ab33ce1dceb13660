use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::recruiting::{ExportError, GatewayError, ServiceError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Recruiting(ServiceError),
    Export(ExportError),
    /// Request could not be understood before reaching the service.
    InvalidRequest(String),
    UnknownCollection(String),
    /// Seed snapshot could not be read or parsed.
    Seed(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Recruiting(err) => write!(f, "{}", err),
            AppError::Export(err) => write!(f, "export error: {}", err),
            AppError::InvalidRequest(detail) => write!(f, "invalid request: {}", detail),
            AppError::UnknownCollection(kind) => write!(f, "unknown collection '{}'", kind),
            AppError::Seed(detail) => write!(f, "snapshot seed error: {}", detail),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Recruiting(err) => Some(err),
            AppError::Export(err) => Some(err),
            AppError::InvalidRequest(_) | AppError::UnknownCollection(_) | AppError::Seed(_) => None,
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::UnknownCollection(_) => StatusCode::NOT_FOUND,
            AppError::Recruiting(err) => service_status(err),
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Export(_)
            | AppError::Seed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn service_status(err: &ServiceError) -> StatusCode {
    if err.is_validation() {
        return StatusCode::BAD_REQUEST;
    }
    match err {
        ServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
        ServiceError::Pipeline(_) | ServiceError::InvalidTransition { .. } | ServiceError::Busy(_) => {
            StatusCode::CONFLICT
        }
        ServiceError::Gateway(GatewayError::Rejected(_)) => StatusCode::CONFLICT,
        ServiceError::Gateway(GatewayError::Unavailable(_)) | ServiceError::PartialFailure(_) => {
            StatusCode::BAD_GATEWAY
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            AppError::Recruiting(ServiceError::PartialFailure(report)) => json!({
                "error": self.to_string(),
                "report": report,
            }),
            _ => json!({ "error": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<ServiceError> for AppError {
    fn from(value: ServiceError) -> Self {
        Self::Recruiting(value)
    }
}

impl From<ExportError> for AppError {
    fn from(value: ExportError) -> Self {
        Self::Export(value)
    }
}
