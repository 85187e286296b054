//! HTTP request handlers for the Payroll Import Engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::calculate_payroll;
use crate::error::{EngineResult, RowError};
use crate::import::{ImportRequest, PayrollImporter};
use crate::models::{EmployeeRecord, PayrollInputs};

use super::request::{CalculationRequest, ImportRequestBody};
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/calculate", post(calculate_handler))
        .route("/import/preview", post(preview_handler))
        .route("/import/commit", post(commit_handler))
        .with_state(state)
}

/// Handler for POST /calculate endpoint.
///
/// Computes the dual-currency payroll for one set of inputs.
async fn calculate_handler(
    payload: Result<Json<CalculationRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing calculation request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    if let Some(field) = first_negative_field(&request.inputs) {
        warn!(
            correlation_id = %correlation_id,
            field = field,
            "Negative input amount"
        );
        return ApiErrorResponse {
            status: StatusCode::BAD_REQUEST,
            error: ApiError::validation_error(format!("Field '{}' must not be negative", field)),
        }
        .into_response();
    }

    let start_time = Instant::now();
    match calculate_payroll(&request.inputs, request.exchange_rate) {
        Ok(result) => {
            info!(
                correlation_id = %correlation_id,
                employee_no = %request.inputs.employee_no,
                net_salary_usd = %result.usd.net_salary,
                duration_us = start_time.elapsed().as_micros(),
                "Calculation completed successfully"
            );
            json_response(StatusCode::OK, &result)
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Calculation failed"
            );
            let (status, code) = match err {
                RowError::InvalidExchangeRate { .. } => {
                    (StatusCode::BAD_REQUEST, "INVALID_EXCHANGE_RATE")
                }
                _ => (StatusCode::UNPROCESSABLE_ENTITY, "CALCULATION_ERROR"),
            };
            ApiErrorResponse {
                status,
                error: ApiError::new(code, err.to_string()),
            }
            .into_response()
        }
    }
}

/// Handler for POST /import/preview endpoint.
///
/// Runs a dry-run import and returns the first rows with the full summary.
async fn preview_handler(
    State(state): State<AppState>,
    payload: Result<Json<ImportRequestBody>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing import preview request");

    run_import(correlation_id, state, payload, |importer, request, existing| {
        importer.preview(request, existing)
    })
    .await
}

/// Handler for POST /import/commit endpoint.
///
/// Runs the import and returns the report together with the storage writes.
async fn commit_handler(
    State(state): State<AppState>,
    payload: Result<Json<ImportRequestBody>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing import commit request");

    run_import(correlation_id, state, payload, |importer, request, existing| {
        importer.import(request, existing, None)
    })
    .await
}

async fn run_import<T, F>(
    correlation_id: Uuid,
    state: AppState,
    payload: Result<Json<ImportRequestBody>, JsonRejection>,
    operation: F,
) -> Response
where
    T: Serialize + Send + 'static,
    F: FnOnce(&PayrollImporter, &ImportRequest, &[EmployeeRecord]) -> EngineResult<T>
        + Send
        + 'static,
{
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let (request, existing) = match body.decode() {
        Ok(parts) => parts,
        Err(api_error) => {
            warn!(
                correlation_id = %correlation_id,
                code = %api_error.error.code,
                "Invalid import request"
            );
            return api_error.into_response();
        }
    };

    let importer = state.importer();
    let start_time = Instant::now();
    let joined =
        tokio::task::spawn_blocking(move || operation(&*importer, &request, &existing[..])).await;

    match joined {
        Ok(Ok(result)) => {
            info!(
                correlation_id = %correlation_id,
                duration_ms = start_time.elapsed().as_millis(),
                "Import request completed successfully"
            );
            json_response(StatusCode::OK, &result)
        }
        Ok(Err(err)) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Import failed"
            );
            ApiErrorResponse::from(err).into_response()
        }
        Err(join_error) => {
            warn!(
                correlation_id = %correlation_id,
                error = %join_error,
                "Import task failed"
            );
            ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::new("INTERNAL_ERROR", "Import task failed"),
            }
            .into_response()
        }
    }
}

fn first_negative_field(inputs: &PayrollInputs) -> Option<&'static str> {
    let scalars = [
        ("base_salary_usd", inputs.base_salary_usd),
        ("overtime_hours", inputs.overtime_hours),
        ("hourly_rate_usd", inputs.hourly_rate_usd),
        ("eos_accrual_usd", inputs.eos_accrual_usd),
        ("exceptional_additions_usd", inputs.exceptional_additions_usd),
    ];
    scalars
        .into_iter()
        .chain(inputs.allowances.components())
        .chain(inputs.deductions.components())
        .find(|(_, amount)| *amount < Decimal::ZERO)
        .map(|(field, _)| field)
}

fn rejection_response(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    ApiErrorResponse {
        status: StatusCode::BAD_REQUEST,
        error,
    }
    .into_response()
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    (status, [(header::CONTENT_TYPE, "application/json")], Json(body)).into_response()
}
