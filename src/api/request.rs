//! Request types for the Payroll Import Engine API.
//!
//! These types are deserialized from incoming JSON requests and converted
//! into the library's domain types.

use axum::http::StatusCode;
use base64::Engine;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::import::ImportRequest;
use crate::models::{EmployeeRecord, PayrollInputs, PayrollPeriod};

use super::response::{ApiError, ApiErrorResponse};

/// Request body for the calculate endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationRequest {
    /// The employee's payroll inputs in USD.
    pub inputs: PayrollInputs,
    /// TRY per USD.
    pub exchange_rate: Decimal,
}

/// Request body for the import preview and commit endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRequestBody {
    /// The workbook file, base64-encoded.
    pub workbook_base64: String,
    /// The month being imported, `YYYY-MM`.
    pub period: String,
    /// TRY per USD.
    pub exchange_rate: Decimal,
    /// Re-assert identical payrolls as `updated`.
    #[serde(default)]
    pub overwrite_existing: bool,
    /// Snapshot of the employees already stored.
    #[serde(default)]
    pub existing: Vec<EmployeeRecord>,
}

impl ImportRequestBody {
    /// Decodes the workbook and parses the period.
    ///
    /// # Errors
    ///
    /// - `INVALID_WORKBOOK_ENCODING` if `workbook_base64` is not valid base64
    /// - `INVALID_PERIOD` if `period` is not `YYYY-MM`
    pub fn decode(self) -> Result<(ImportRequest, Vec<EmployeeRecord>), ApiErrorResponse> {
        let period: PayrollPeriod = self.period.parse()?;

        let workbook = base64::engine::general_purpose::STANDARD
            .decode(self.workbook_base64.trim())
            .map_err(|e| ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details(
                    "INVALID_WORKBOOK_ENCODING",
                    "Workbook is not valid base64",
                    e.to_string(),
                ),
            })?;

        let request = ImportRequest {
            workbook,
            period,
            exchange_rate: self.exchange_rate,
            overwrite_existing: self.overwrite_existing,
        };
        Ok((request, self.existing))
    }
}
