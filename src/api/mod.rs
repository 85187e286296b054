//! HTTP API module for the Payroll Import Engine.
//!
//! This module provides the REST API endpoints for calculating a single
//! payroll and for previewing and committing workbook imports.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{CalculationRequest, ImportRequestBody};
pub use response::{ApiError, ApiErrorResponse};
pub use state::AppState;
