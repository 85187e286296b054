//! Response types for the Payroll Import Engine API.
//!
//! This module defines the error response structures and the mapping from
//! engine errors to HTTP status codes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
#[derive(Debug)]
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        let (status, code) = match &error {
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR")
            }
            EngineError::ReportError { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "REPORT_ERROR")
            }
            EngineError::UnreadableWorkbook { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "UNREADABLE_WORKBOOK")
            }
            EngineError::HeaderRowNotFound { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "HEADER_ROW_NOT_FOUND")
            }
            EngineError::LayoutError { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "LAYOUT_ERROR"),
            EngineError::InvalidExchangeRate { .. } => {
                (StatusCode::BAD_REQUEST, "INVALID_EXCHANGE_RATE")
            }
            EngineError::InvalidPeriod { .. } => (StatusCode::BAD_REQUEST, "INVALID_PERIOD"),
            EngineError::Cancelled { .. } => (StatusCode::CONFLICT, "IMPORT_CANCELLED"),
        };

        ApiErrorResponse {
            status,
            error: ApiError::new(code, message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_api_error_serialization() {
        let error = ApiError::new("TEST_ERROR", "Test message");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"code\":\"TEST_ERROR\""));
        assert!(json.contains("\"message\":\"Test message\""));
        assert!(!json.contains("details"));
    }

    #[test]
    fn test_api_error_with_details_serialization() {
        let error = ApiError::with_details("TEST_ERROR", "Test message", "Some details");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"details\":\"Some details\""));
    }

    #[test]
    fn test_layout_errors_are_unprocessable() {
        let api_error: ApiErrorResponse = EngineError::HeaderRowNotFound {
            sheets_scanned: 2,
            message: "no candidate row".to_string(),
        }
        .into();
        assert_eq!(api_error.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(api_error.error.code, "HEADER_ROW_NOT_FOUND");
        assert!(api_error.error.message.contains("2 sheet(s)"));
    }

    #[test]
    fn test_input_errors_are_bad_request() {
        let api_error: ApiErrorResponse = EngineError::InvalidExchangeRate {
            rate: Decimal::ZERO,
        }
        .into();
        assert_eq!(api_error.status, StatusCode::BAD_REQUEST);
        assert_eq!(api_error.error.code, "INVALID_EXCHANGE_RATE");
    }

    #[test]
    fn test_config_errors_are_internal() {
        let api_error: ApiErrorResponse = EngineError::ConfigNotFound {
            path: "config/payroll/import.yaml".to_string(),
        }
        .into();
        assert_eq!(api_error.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api_error.error.code, "CONFIG_ERROR");
    }

    #[test]
    fn test_into_response_carries_status_and_json_body() {
        let response = ApiErrorResponse::from(EngineError::Cancelled { rows_processed: 3 })
            .into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(
            response.headers().get(axum::http::header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }
}
