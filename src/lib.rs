//! Payroll Import & Computation Engine
//!
//! This crate reads HR payroll workbooks whose layout is only loosely fixed
//! (Arabic or English headers, title rows above the table, an optional
//! grade × step salary scale), maps each row to typed payroll inputs,
//! computes the USD payroll with its TRY equivalent, and reconciles the
//! batch against the employees already on record.
//!
//! The pipeline is: [`workbook`] → [`layout`] → [`mapping`] →
//! [`calculation`] → [`import`].

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod import;
pub mod layout;
pub mod mapping;
pub mod models;
pub mod workbook;
