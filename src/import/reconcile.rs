//! Import reconciliation functionality.
//!
//! Compares computed rows against the existing employee snapshot and decides
//! per row whether the import adds, updates, skips or rejects it. Nothing is
//! written here; the decisions come back as data for the storage layer to
//! apply in one transaction.

use std::collections::HashMap;

use crate::error::{EngineResult, RowError};
use crate::models::{
    EmployeeRecord, EnhancedPreviewEmployee, ImportResult, ImportRowResult, ImportSummary,
    PayrollCalculation, PayrollInputs, PayrollPeriod, PayrollUpsert, RowStatus, UpsertAction,
};

use super::report::error_report;

/// Skip reason for rows whose stored payroll already matches.
pub const UNCHANGED_REASON: &str = "Unchanged: stored payroll for this period is identical";

/// Skip reason for rows without a payable base salary.
pub const NO_SALARY_REASON: &str = "No payable base salary";

/// What happened to a row before reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    /// The row mapped and calculated successfully.
    Computed {
        /// The mapped inputs.
        inputs: PayrollInputs,
        /// The calculated payroll, full precision.
        calculation: PayrollCalculation,
    },
    /// The row failed mapping or calculation.
    Failed(RowError),
}

/// One data row ready for reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRow {
    /// 1-based sheet row number.
    pub row_number: usize,
    /// Employee number as read, empty if blank.
    pub employee_no: String,
    /// Employee name as read, empty if blank.
    pub full_name: String,
    /// Mapping and calculation outcome.
    pub outcome: RowOutcome,
}

/// Caller choices that affect reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// The month being imported.
    pub period: PayrollPeriod,
    /// Re-assert identical payrolls as `updated` instead of skipping them.
    pub overwrite_existing: bool,
    /// Maximum number of preview rows.
    pub preview_limit: usize,
}

/// The full set of reconciliation decisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// The import report. Layout warnings and the scale flag are left empty
    /// for the caller to fill in.
    pub result: ImportResult,
    /// One write per added or updated row, in row order.
    pub upserts: Vec<PayrollUpsert>,
    /// The first rows with their rounded values.
    pub preview: Vec<EnhancedPreviewEmployee>,
}

/// Reconciles computed rows against the existing employee snapshot.
///
/// Rows are decided in the order given, which must be sheet order:
///
/// 1. failed rows are `error`, with the row error message;
/// 2. an employee number already seen on an earlier computed row is `error`;
/// 3. a base salary that is not positive is `skipped`;
/// 4. an employee not in `existing` is `added`;
/// 5. an employee whose stored payroll for the period differs, or who has none,
///    is `updated`;
/// 6. an identical stored payroll is `updated` with `overwrite_existing`,
///    otherwise `skipped`.
///
/// Stored payrolls are compared on the rounded USD breakdown and the rate.
pub fn reconcile(
    rows: &[ImportRow],
    existing: &[EmployeeRecord],
    options: &ReconcileOptions,
) -> EngineResult<Reconciliation> {
    let mut by_employee_no: HashMap<&str, &EmployeeRecord> = HashMap::with_capacity(existing.len());
    for record in existing {
        by_employee_no.entry(record.employee_no.as_str()).or_insert(record);
    }

    let mut first_seen: HashMap<&str, usize> = HashMap::new();
    let mut employees = Vec::with_capacity(rows.len());
    let mut upserts = Vec::new();
    let mut preview = Vec::new();

    for row in rows {
        let decision = decide(row, &by_employee_no, &mut first_seen, options);

        let result = ImportRowResult {
            employee_no: row.employee_no.clone(),
            full_name: row.full_name.clone(),
            row_number: row.row_number,
            status: decision.status,
            error: decision.message,
        };

        let rounded = match &row.outcome {
            RowOutcome::Computed { inputs, calculation } => Some((
                calculation.usd.rounded(),
                calculation.try_.rounded(),
                calculation.rate_used,
                inputs.base_salary_source,
            )),
            RowOutcome::Failed(_) => None,
        };

        if let (Some(action), Some((usd, try_, rate_used, _))) = (decision.action, rounded) {
            upserts.push(PayrollUpsert {
                action,
                employee_id: decision.employee_id,
                employee_no: row.employee_no.clone(),
                full_name: row.full_name.clone(),
                row_number: row.row_number,
                period: options.period,
                usd,
                try_,
                rate_used,
            });
        }

        if preview.len() < options.preview_limit {
            preview.push(EnhancedPreviewEmployee {
                row: result.clone(),
                usd: rounded.map(|(usd, ..)| usd),
                try_: rounded.map(|(_, try_, ..)| try_),
                base_salary_source: rounded.map(|(.., source)| source),
            });
        }

        employees.push(result);
    }

    let summary = ImportSummary::from_rows(&employees);
    let error_report = error_report(&employees)?;

    Ok(Reconciliation {
        result: ImportResult {
            summary,
            employees,
            errors: Vec::new(),
            salary_scale_found: false,
            error_report,
        },
        upserts,
        preview,
    })
}

struct Decision {
    status: RowStatus,
    message: Option<String>,
    action: Option<UpsertAction>,
    employee_id: Option<String>,
}

impl Decision {
    fn error(message: String) -> Self {
        Self {
            status: RowStatus::Error,
            message: Some(message),
            action: None,
            employee_id: None,
        }
    }

    fn skipped(reason: &str) -> Self {
        Self {
            status: RowStatus::Skipped,
            message: Some(reason.to_string()),
            action: None,
            employee_id: None,
        }
    }

    fn write(status: RowStatus, action: UpsertAction, employee_id: Option<String>) -> Self {
        Self {
            status,
            message: None,
            action: Some(action),
            employee_id,
        }
    }
}

fn decide<'a>(
    row: &'a ImportRow,
    existing: &HashMap<&str, &EmployeeRecord>,
    first_seen: &mut HashMap<&'a str, usize>,
    options: &ReconcileOptions,
) -> Decision {
    let (inputs, calculation) = match &row.outcome {
        RowOutcome::Failed(err) => return Decision::error(err.to_string()),
        RowOutcome::Computed { inputs, calculation } => (inputs, calculation),
    };

    if let Some(first_row) = first_seen.get(row.employee_no.as_str()) {
        let err = RowError::DuplicateEmployee {
            employee_no: row.employee_no.clone(),
            first_row: *first_row,
        };
        return Decision::error(err.to_string());
    }
    first_seen.insert(row.employee_no.as_str(), row.row_number);

    if !inputs.has_payable_salary() {
        return Decision::skipped(NO_SALARY_REASON);
    }

    let Some(record) = existing.get(row.employee_no.as_str()) else {
        return Decision::write(RowStatus::Added, UpsertAction::Create, None);
    };

    let unchanged = record.existing_payroll.as_ref().is_some_and(|stored| {
        stored.period == options.period
            && stored.rate_used == calculation.rate_used
            && stored.usd == calculation.usd.rounded()
    });

    if unchanged && !options.overwrite_existing {
        Decision::skipped(UNCHANGED_REASON)
    } else {
        Decision::write(
            RowStatus::Updated,
            UpsertAction::Update,
            Some(record.id.clone()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::calculate_payroll;
    use crate::models::StoredPayroll;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn period() -> PayrollPeriod {
        PayrollPeriod::from_str("2025-03").unwrap()
    }

    fn options(overwrite_existing: bool) -> ReconcileOptions {
        ReconcileOptions {
            period: period(),
            overwrite_existing,
            preview_limit: 10,
        }
    }

    fn computed(row_number: usize, employee_no: &str, base: &str) -> ImportRow {
        let inputs = PayrollInputs {
            employee_no: employee_no.to_string(),
            full_name: format!("Employee {}", employee_no),
            base_salary_usd: dec(base),
            ..PayrollInputs::default()
        };
        let calculation = calculate_payroll(&inputs, dec("32.5")).unwrap();
        ImportRow {
            row_number,
            employee_no: employee_no.to_string(),
            full_name: inputs.full_name.clone(),
            outcome: RowOutcome::Computed { inputs, calculation },
        }
    }

    fn failed(row_number: usize, employee_no: &str, err: RowError) -> ImportRow {
        ImportRow {
            row_number,
            employee_no: employee_no.to_string(),
            full_name: String::new(),
            outcome: RowOutcome::Failed(err),
        }
    }

    fn record(id: &str, employee_no: &str, stored: Option<StoredPayroll>) -> EmployeeRecord {
        EmployeeRecord {
            id: id.to_string(),
            employee_no: employee_no.to_string(),
            full_name: String::new(),
            existing_payroll: stored,
        }
    }

    fn stored_from(row: &ImportRow) -> StoredPayroll {
        let RowOutcome::Computed { calculation, .. } = &row.outcome else {
            panic!("Expected computed row");
        };
        StoredPayroll {
            period: period(),
            usd: calculation.usd.rounded(),
            rate_used: calculation.rate_used,
        }
    }

    fn statuses(reconciliation: &Reconciliation) -> Vec<RowStatus> {
        reconciliation
            .result
            .employees
            .iter()
            .map(|e| e.status)
            .collect()
    }

    #[test]
    fn test_new_employee_is_added() {
        let rows = vec![computed(2, "001", "1000")];
        let result = reconcile(&rows, &[], &options(false)).unwrap();

        assert_eq!(statuses(&result), vec![RowStatus::Added]);
        assert_eq!(result.upserts.len(), 1);
        assert_eq!(result.upserts[0].action, UpsertAction::Create);
        assert_eq!(result.upserts[0].employee_id, None);
        assert_eq!(result.upserts[0].usd.gross_salary, dec("1000.00"));
        assert_eq!(result.upserts[0].try_.gross_salary, dec("32500.00"));
        assert_eq!(result.upserts[0].period, period());
        assert_eq!(result.result.error_report, None);
    }

    #[test]
    fn test_existing_without_payroll_is_updated() {
        let rows = vec![computed(2, "001", "1000")];
        let existing = vec![record("emp-1", "001", None)];
        let result = reconcile(&rows, &existing, &options(false)).unwrap();

        assert_eq!(statuses(&result), vec![RowStatus::Updated]);
        assert_eq!(result.upserts[0].action, UpsertAction::Update);
        assert_eq!(result.upserts[0].employee_id.as_deref(), Some("emp-1"));
    }

    #[test]
    fn test_changed_payroll_is_updated() {
        let rows = vec![computed(2, "001", "1000")];
        let stored = stored_from(&computed(2, "001", "900"));
        let existing = vec![record("emp-1", "001", Some(stored))];
        let result = reconcile(&rows, &existing, &options(false)).unwrap();

        assert_eq!(statuses(&result), vec![RowStatus::Updated]);
    }

    #[test]
    fn test_other_period_is_updated() {
        let rows = vec![computed(2, "001", "1000")];
        let mut stored = stored_from(&rows[0]);
        stored.period = PayrollPeriod::from_str("2025-02").unwrap();
        let existing = vec![record("emp-1", "001", Some(stored))];
        let result = reconcile(&rows, &existing, &options(false)).unwrap();

        assert_eq!(statuses(&result), vec![RowStatus::Updated]);
    }

    #[test]
    fn test_identical_payroll_skipped_without_overwrite() {
        let rows = vec![computed(2, "001", "1000")];
        let existing = vec![record("emp-1", "001", Some(stored_from(&rows[0])))];

        let result = reconcile(&rows, &existing, &options(false)).unwrap();
        assert_eq!(statuses(&result), vec![RowStatus::Skipped]);
        assert_eq!(
            result.result.employees[0].error.as_deref(),
            Some(UNCHANGED_REASON)
        );
        assert!(result.upserts.is_empty());

        let result = reconcile(&rows, &existing, &options(true)).unwrap();
        assert_eq!(statuses(&result), vec![RowStatus::Updated]);
        assert_eq!(result.upserts.len(), 1);
    }

    #[test]
    fn test_zero_base_is_skipped() {
        let rows = vec![computed(2, "001", "0")];
        let result = reconcile(&rows, &[], &options(true)).unwrap();

        assert_eq!(statuses(&result), vec![RowStatus::Skipped]);
        assert_eq!(
            result.result.employees[0].error.as_deref(),
            Some(NO_SALARY_REASON)
        );
        assert!(result.upserts.is_empty());
    }

    #[test]
    fn test_failed_rows_are_errors_and_batch_continues() {
        let rows = vec![
            failed(2, "", RowError::MissingEmployeeNo),
            computed(3, "002", "800"),
            failed(4, "003", RowError::MissingBaseSalary),
        ];
        let result = reconcile(&rows, &[], &options(false)).unwrap();

        assert_eq!(
            statuses(&result),
            vec![RowStatus::Error, RowStatus::Added, RowStatus::Error]
        );
        assert_eq!(
            result.result.summary,
            ImportSummary {
                total_rows: 3,
                added: 1,
                updated: 0,
                errors: 2,
                skipped: 0,
            }
        );
        let report = result.result.error_report.unwrap();
        assert_eq!(report.lines().count(), 3);
        assert!(report.contains("2,,,Missing employee number"));
    }

    #[test]
    fn test_duplicate_employee_no_is_error() {
        let rows = vec![computed(2, "001", "1000"), computed(5, "001", "1200")];
        let result = reconcile(&rows, &[], &options(false)).unwrap();

        assert_eq!(statuses(&result), vec![RowStatus::Added, RowStatus::Error]);
        assert_eq!(
            result.result.employees[1].error.as_deref(),
            Some("Duplicate employee number '001', first seen on row 2")
        );
        assert_eq!(result.upserts.len(), 1);
    }

    #[test]
    fn test_preview_is_limited_and_rounded() {
        let rows: Vec<ImportRow> = (0..12)
            .map(|i| computed(i + 2, &format!("{:03}", i), "1000.005"))
            .collect();
        let mut opts = options(false);
        opts.preview_limit = 10;

        let result = reconcile(&rows, &[], &opts).unwrap();
        assert_eq!(result.preview.len(), 10);
        assert_eq!(result.result.employees.len(), 12);
        let first = &result.preview[0];
        assert_eq!(first.usd.unwrap().base_salary, dec("1000.01"));
        assert!(first.try_.is_some());
        assert_eq!(first.row.row_number, 2);
    }
}
