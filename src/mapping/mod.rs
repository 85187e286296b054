//! Row mapping for the Payroll Import Engine.
//!
//! This module coerces raw cells into typed values and turns each data row of
//! the payroll sheet into a validated [`PayrollInputs`](crate::models::PayrollInputs)
//! record or a row-level error.

mod coerce;
mod row;

pub use coerce::{Numeric, coerce_identifier, coerce_name, coerce_numeric, coerce_positive_int};
pub use row::{RowIdentity, data_row_indices, map_row, read_identity};
