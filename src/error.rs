//! Error types for the Payroll Import Engine.
//!
//! Two families of errors exist. [`EngineError`] is fatal: the whole import is
//! abandoned and nothing is reconciled. [`RowError`] belongs to a single
//! spreadsheet row; it is carried as data in the import result so that the
//! remaining rows are still processed.

use rust_decimal::Decimal;
use thiserror::Error;

/// The main error type for the Payroll Import Engine.
///
/// # Example
///
/// ```
/// use payroll_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/import.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/import.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// The byte stream is not a recognized spreadsheet container or is corrupted.
    #[error("Unreadable workbook: {message}")]
    UnreadableWorkbook {
        /// A description of why the workbook could not be read.
        message: String,
    },

    /// No sheet in the workbook contains a recognizable header row.
    #[error("Header row not found in any of {sheets_scanned} sheet(s): {message}")]
    HeaderRowNotFound {
        /// Number of sheets that were scanned.
        sheets_scanned: usize,
        /// Details about the closest candidate, if any.
        message: String,
    },

    /// A header row was found but its columns do not satisfy the required fields.
    #[error("Layout error on sheet '{sheet}': {message}")]
    LayoutError {
        /// The sheet on which the layout problem was found.
        sheet: String,
        /// A description of the layout problem.
        message: String,
    },

    /// The exchange rate supplied for the import is not a positive number.
    #[error("Invalid exchange rate {rate}: must be greater than zero")]
    InvalidExchangeRate {
        /// The rejected rate.
        rate: Decimal,
    },

    /// The import period is not a valid `YYYY-MM` month.
    #[error("Invalid payroll period '{value}': expected YYYY-MM")]
    InvalidPeriod {
        /// The rejected period text.
        value: String,
    },

    /// The CSV error report could not be written.
    #[error("Failed to write error report: {message}")]
    ReportError {
        /// A description of the write failure.
        message: String,
    },

    /// The import was cancelled between rows; partial results were discarded.
    #[error("Import cancelled after {rows_processed} row(s)")]
    Cancelled {
        /// Number of rows processed before cancellation was observed.
        rows_processed: usize,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

/// A failure confined to one spreadsheet row.
///
/// The `Display` output is the message shown to the user in the import table
/// and written to the CSV error report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    /// The row has no employee number.
    #[error("Missing employee number")]
    MissingEmployeeNo,

    /// The row has no employee name.
    #[error("Missing employee name")]
    MissingFullName,

    /// A monetary or numeric field holds a negative value.
    #[error("Negative value {value} in field '{field}'")]
    NegativeAmount {
        /// The logical field name.
        field: String,
        /// The offending value as read from the cell.
        value: String,
    },

    /// Base salary is blank and the workbook has no salary scale to fall back on.
    #[error("Base salary is blank and no salary scale was found")]
    MissingBaseSalary,

    /// Base salary is blank and the grade/step could not be resolved in the salary scale.
    #[error("Base salary could not be resolved from salary scale: {reason}")]
    UnresolvedBaseSalary {
        /// Why the lookup failed.
        reason: String,
    },

    /// The calculation overflowed decimal precision.
    #[error("Calculation overflow while computing {step}")]
    CalculationOverflow {
        /// The calculation step that overflowed.
        step: String,
    },

    /// The exchange rate is not a positive number.
    #[error("Invalid exchange rate {rate}")]
    InvalidExchangeRate {
        /// The rejected rate.
        rate: Decimal,
    },

    /// The employee number already appeared on an earlier row of the same import.
    #[error("Duplicate employee number '{employee_no}', first seen on row {first_row}")]
    DuplicateEmployee {
        /// The repeated employee number.
        employee_no: String,
        /// The 1-based row number of the first occurrence.
        first_row: usize,
    },
}
