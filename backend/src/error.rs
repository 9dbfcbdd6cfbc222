//! Error handling for the forecast service
//!
//! Provides consistent error responses in English and Traditional Chinese

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Input errors
    #[error("Unknown region: {0}")]
    UnknownRegion(String),

    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    // Query results
    #[error("No forecast data for region {0}")]
    NoDataForRegion(String),

    #[error("No location in {region} matches \"{filter}\"")]
    NoMatchingLocation { region: String, filter: String },

    // Upstream provider errors
    #[error("Malformed upstream response: {0}")]
    MalformedUpstreamResponse(String),

    #[error("Upstream unavailable: {detail}")]
    UpstreamUnavailable { status: Option<u16>, detail: String },

    // Storage errors
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    // Internal errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable machine-readable code, also used in batch ingestion outcomes
    pub fn code(&self) -> &'static str {
        match self {
            AppError::UnknownRegion(_) => "UNKNOWN_REGION",
            AppError::Validation { .. } => "VALIDATION_ERROR",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::NoDataForRegion(_) => "NO_DATA_FOR_REGION",
            AppError::NoMatchingLocation { .. } => "NO_MATCHING_LOCATION",
            AppError::MalformedUpstreamResponse(_) => "MALFORMED_UPSTREAM_RESPONSE",
            AppError::UpstreamUnavailable { .. } => "UPSTREAM_UNAVAILABLE",
            AppError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether a caller may reasonably retry the same request later
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            AppError::UpstreamUnavailable { .. } | AppError::StoreUnavailable(_)
        )
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::UnknownRegion(_) | AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NoDataForRegion(_) | AppError::NoMatchingLocation { .. } => {
                StatusCode::NOT_FOUND
            }
            AppError::MalformedUpstreamResponse(_) => StatusCode::BAD_GATEWAY,
            AppError::UpstreamUnavailable { .. } | AppError::StoreUnavailable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Configuration(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<shared::UnknownRegion> for AppError {
    fn from(err: shared::UnknownRegion) -> Self {
        AppError::UnknownRegion(err.0)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::StoreUnavailable(err.to_string())
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_zh: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl AppError {
    fn detail(&self) -> ErrorDetail {
        let code = self.code().to_string();
        match self {
            AppError::UnknownRegion(region) => ErrorDetail {
                code,
                message_en: format!("Unknown region: {}", region),
                message_zh: format!("不支援的城市: {}", region),
                field: Some("region".to_string()),
                detail: None,
            },
            AppError::Validation { field, message } => ErrorDetail {
                code,
                message_en: message.clone(),
                message_zh: format!("參數錯誤: {}", message),
                field: Some(field.clone()),
                detail: None,
            },
            AppError::Unauthorized(message) => ErrorDetail {
                code,
                message_en: message.clone(),
                message_zh: "無效的 API Key".to_string(),
                field: None,
                detail: None,
            },
            AppError::NoDataForRegion(region) => ErrorDetail {
                code,
                message_en: format!("No forecast data stored for {}", region),
                message_zh: format!("找不到 {} 的預報資料", region),
                field: None,
                detail: None,
            },
            AppError::NoMatchingLocation { region, filter } => ErrorDetail {
                code,
                message_en: format!("No location in {} matches \"{}\"", region, filter),
                message_zh: format!("在 {} 中找不到包含 \"{}\" 的預報資料", region, filter),
                field: Some("district".to_string()),
                detail: None,
            },
            AppError::MalformedUpstreamResponse(detail) => ErrorDetail {
                code,
                message_en: "The weather provider returned an unexpected response".to_string(),
                message_zh: "CWA API 回應格式異常或無資料".to_string(),
                field: None,
                detail: Some(detail.clone()),
            },
            AppError::UpstreamUnavailable { status, detail } => ErrorDetail {
                code,
                message_en: "The weather provider is temporarily unavailable".to_string(),
                message_zh: "CWA API 暫時無法使用".to_string(),
                field: None,
                detail: Some(match status {
                    Some(status) => format!("upstream status {}: {}", status, detail),
                    None => detail.clone(),
                }),
            },
            AppError::StoreUnavailable(detail) => ErrorDetail {
                code,
                message_en: "Forecast storage is temporarily unavailable".to_string(),
                message_zh: "資料庫暫時無法使用".to_string(),
                field: None,
                detail: Some(detail.clone()),
            },
            AppError::Configuration(msg) => ErrorDetail {
                code,
                message_en: format!("Configuration error: {}", msg),
                message_zh: "伺服器設定錯誤".to_string(),
                field: None,
                detail: None,
            },
            AppError::Internal(msg) => ErrorDetail {
                code,
                message_en: msg.clone(),
                message_zh: "伺服器內部錯誤".to_string(),
                field: None,
                detail: None,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_detail = self.detail();

        // Log the error with the full upstream/store detail
        if status.is_server_error() {
            tracing::error!(code = error_detail.code.as_str(), "Error: {:?}", self);
        } else {
            tracing::debug!(code = error_detail.code.as_str(), "Request rejected: {}", self);
        }

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers and services
pub type AppResult<T> = Result<T, AppError>;
