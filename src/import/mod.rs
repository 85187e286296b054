//! Import orchestration for the Payroll Import Engine.
//!
//! This module runs the whole pipeline over one workbook and reconciles the
//! computed rows against the caller's employee snapshot, producing the import
//! report, the preview, the CSV error report and the storage writes.

mod pipeline;
mod reconcile;
mod report;

pub use pipeline::{CancellationFlag, ImportRequest, PayrollImporter};
pub use reconcile::{
    ImportRow, NO_SALARY_REASON, ReconcileOptions, Reconciliation, RowOutcome, UNCHANGED_REASON,
    reconcile,
};
pub use report::error_report;
