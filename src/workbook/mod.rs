//! Workbook reading for the Payroll Import Engine.
//!
//! Turns raw workbook bytes into named sheets of raw cell values. No business
//! interpretation happens here.

mod reader;

pub use reader::read_workbook;
