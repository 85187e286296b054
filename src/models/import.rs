//! Import result models exchanged with the caller and the storage layer.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{BaseSalarySource, PayrollOutput, PayrollPeriod};

/// Payroll already stored for an employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredPayroll {
    /// The month the payroll applies to.
    pub period: PayrollPeriod,
    /// The stored USD breakdown (2 decimal places).
    pub usd: PayrollOutput,
    /// The exchange rate stored with it.
    pub rate_used: Decimal,
}

/// Read-only snapshot of an existing employee, supplied by the storage layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    /// Storage identifier.
    pub id: String,
    /// Employee number used to match workbook rows.
    pub employee_no: String,
    /// Employee full name.
    #[serde(default)]
    pub full_name: String,
    /// Payroll stored for the employee, if any.
    #[serde(default)]
    pub existing_payroll: Option<StoredPayroll>,
}

/// The reconciliation decision for one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowStatus {
    /// New employee payroll record.
    Added,
    /// Existing employee whose payroll is (re)written.
    Updated,
    /// Row mapping or calculation failed.
    Error,
    /// Valid row that needs no write.
    Skipped,
}

/// The outcome for one workbook row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRowResult {
    /// Employee number as read (may be empty for failed rows).
    pub employee_no: String,
    /// Employee name as read (may be empty for failed rows).
    pub full_name: String,
    /// 1-based sheet row number.
    pub row_number: usize,
    /// The reconciliation decision.
    pub status: RowStatus,
    /// Error or skip reason, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Counts of row outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    /// Number of data rows considered.
    pub total_rows: usize,
    /// Rows with status `added`.
    pub added: usize,
    /// Rows with status `updated`.
    pub updated: usize,
    /// Rows with status `error`.
    pub errors: usize,
    /// Rows with status `skipped`.
    pub skipped: usize,
}

impl ImportSummary {
    /// Tallies a list of row results.
    pub fn from_rows(rows: &[ImportRowResult]) -> Self {
        let mut summary = Self {
            total_rows: rows.len(),
            ..Self::default()
        };
        for row in rows {
            match row.status {
                RowStatus::Added => summary.added += 1,
                RowStatus::Updated => summary.updated += 1,
                RowStatus::Error => summary.errors += 1,
                RowStatus::Skipped => summary.skipped += 1,
            }
        }
        summary
    }
}

/// The complete, immutable result of an import run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    /// Outcome counts.
    pub summary: ImportSummary,
    /// One entry per data row, in sheet order.
    pub employees: Vec<ImportRowResult>,
    /// Layout-level warnings.
    pub errors: Vec<String>,
    /// Whether a salary scale was located.
    pub salary_scale_found: bool,
    /// CSV report of failed rows, present only when there are errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_report: Option<String>,
}

/// Whether a storage write creates or updates a payroll record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertAction {
    /// The employee does not exist yet.
    Create,
    /// The employee exists; its payroll for the period is written.
    Update,
}

/// A normalized payroll write for the storage layer to apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollUpsert {
    /// Create or update.
    pub action: UpsertAction,
    /// Storage id of an existing employee; `None` for new employees.
    pub employee_id: Option<String>,
    /// Employee number.
    pub employee_no: String,
    /// Employee name.
    pub full_name: String,
    /// 1-based sheet row the payload came from.
    pub row_number: usize,
    /// The month the payroll applies to.
    pub period: PayrollPeriod,
    /// USD breakdown rounded to 2 decimal places.
    pub usd: PayrollOutput,
    /// TRY breakdown rounded to 2 decimal places.
    #[serde(rename = "try")]
    pub try_: PayrollOutput,
    /// Exchange rate used, verbatim.
    pub rate_used: Decimal,
}

/// One previewed row with its computed values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedPreviewEmployee {
    /// The row outcome.
    #[serde(flatten)]
    pub row: ImportRowResult,
    /// Rounded USD breakdown, when the row computed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usd: Option<PayrollOutput>,
    /// Rounded TRY breakdown, when the row computed.
    #[serde(rename = "try", skip_serializing_if = "Option::is_none")]
    pub try_: Option<PayrollOutput>,
    /// Origin of the base salary, when the row computed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_salary_source: Option<BaseSalarySource>,
}

/// Dry-run preview returned before an import is committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewData {
    /// The first rows of the import.
    pub preview: Vec<EnhancedPreviewEmployee>,
    /// Outcome counts over the whole workbook.
    pub summary: ImportSummary,
    /// Layout-level warnings.
    pub errors: Vec<String>,
    /// Whether a salary scale was located.
    pub salary_scale_found: bool,
}

/// Everything a committed import hands back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOutcome {
    /// The import report.
    pub result: ImportResult,
    /// Writes for the storage layer, one per added or updated row.
    pub upserts: Vec<PayrollUpsert>,
}
