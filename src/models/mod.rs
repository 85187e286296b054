//! Core data models for the Payroll Import Engine.
//!
//! This module contains all the domain models used throughout the engine.

mod grid;
mod import;
mod layout;
mod payroll;
mod period;

pub use grid::{Cell, RawGrid, Sheet};
pub use import::{
    EmployeeRecord, EnhancedPreviewEmployee, ImportOutcome, ImportResult, ImportRowResult,
    ImportSummary, PayrollUpsert, PreviewData, RowStatus, StoredPayroll, UpsertAction,
};
pub use layout::{HeaderMap, LogicalField, SalaryScale, ScaleLookup};
pub use payroll::{
    Allowances, AuditStep, BaseSalarySource, Deductions, MONEY_DECIMAL_PLACES,
    PayrollCalculation, PayrollInputs, PayrollOutput,
};
pub use period::PayrollPeriod;
