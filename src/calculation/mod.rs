//! Calculation logic for the Payroll Import Engine.
//!
//! This module contains the pure payroll calculation: allowance and deduction
//! totals, overtime, gross and net salary in USD, and the element-wise TRY
//! conversion, each recorded as an audit step.

mod payroll;

pub use payroll::calculate_payroll;
