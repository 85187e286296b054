//! The end-to-end import pipeline.
//!
//! Workbook bytes flow through the reader, the layout locator, the row mapper
//! and the calculator (one row at a time, in sheet order) into the reconciler.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::calculation::calculate_payroll;
use crate::config::ImportConfig;
use crate::error::{EngineError, EngineResult};
use crate::layout::{LabelSet, WorkbookLayout, locate_layout};
use crate::mapping::{data_row_indices, map_row, read_identity};
use crate::models::{EmployeeRecord, ImportOutcome, PayrollPeriod, PreviewData};
use crate::workbook::read_workbook;

use super::reconcile::{ImportRow, ReconcileOptions, Reconciliation, RowOutcome, reconcile};

/// A single import request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRequest {
    /// Raw workbook bytes (`.xlsx`, `.xlsm`, `.xls`, ...).
    pub workbook: Vec<u8>,
    /// The month being imported.
    pub period: PayrollPeriod,
    /// TRY per USD.
    pub exchange_rate: Decimal,
    /// Re-assert identical payrolls as `updated`.
    pub overwrite_existing: bool,
}

/// A handle for cancelling a running import from another thread.
///
/// The pipeline checks the flag between rows. Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    /// Creates a flag that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns true once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Runs payroll imports with a fixed configuration.
///
/// # Example
///
/// ```
/// use payroll_engine::config::ImportConfig;
/// use payroll_engine::error::EngineError;
/// use payroll_engine::import::{ImportRequest, PayrollImporter};
/// use rust_decimal::Decimal;
///
/// let importer = PayrollImporter::new(ImportConfig::default());
/// let request = ImportRequest {
///     workbook: b"not a workbook".to_vec(),
///     period: "2025-03".parse().unwrap(),
///     exchange_rate: Decimal::from(32),
///     overwrite_existing: false,
/// };
///
/// let result = importer.import(&request, &[], None);
/// assert!(matches!(result, Err(EngineError::UnreadableWorkbook { .. })));
/// ```
#[derive(Debug, Clone)]
pub struct PayrollImporter {
    config: ImportConfig,
    total_markers: LabelSet,
}

impl PayrollImporter {
    /// Creates an importer for the given configuration.
    pub fn new(config: ImportConfig) -> Self {
        let total_markers = LabelSet::new(&config.total_markers);
        Self {
            config,
            total_markers,
        }
    }

    /// Returns the importer's configuration.
    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// Runs a dry-run import and returns the first rows with the full summary.
    pub fn preview(
        &self,
        request: &ImportRequest,
        existing: &[EmployeeRecord],
    ) -> EngineResult<PreviewData> {
        let (reconciliation, layout) = self.run(request, existing, None)?;
        Ok(PreviewData {
            preview: reconciliation.preview,
            summary: reconciliation.result.summary,
            errors: layout.warnings,
            salary_scale_found: layout.scale.is_found(),
        })
    }

    /// Runs an import and returns the report with the writes to apply.
    ///
    /// # Errors
    ///
    /// Any fatal [`EngineError`]; row problems are reported inside the
    /// result instead. A cancelled import returns `Cancelled` and no partial
    /// result.
    pub fn import(
        &self,
        request: &ImportRequest,
        existing: &[EmployeeRecord],
        cancel: Option<&CancellationFlag>,
    ) -> EngineResult<ImportOutcome> {
        let (reconciliation, layout) = self.run(request, existing, cancel)?;
        let mut result = reconciliation.result;
        result.errors = layout.warnings;
        result.salary_scale_found = layout.scale.is_found();

        Ok(ImportOutcome {
            result,
            upserts: reconciliation.upserts,
        })
    }

    fn run(
        &self,
        request: &ImportRequest,
        existing: &[EmployeeRecord],
        cancel: Option<&CancellationFlag>,
    ) -> EngineResult<(Reconciliation, WorkbookLayout)> {
        if request.exchange_rate <= Decimal::ZERO {
            return Err(EngineError::InvalidExchangeRate {
                rate: request.exchange_rate,
            });
        }

        info!(
            period = %request.period,
            exchange_rate = %request.exchange_rate,
            bytes = request.workbook.len(),
            "Starting payroll import"
        );

        let sheets = read_workbook(&request.workbook).inspect_err(|e| {
            warn!(error = %e, "Payroll import failed");
        })?;
        let layout = locate_layout(&sheets, &self.config).inspect_err(|e| {
            warn!(error = %e, "Payroll import failed");
        })?;
        let grid = sheets
            .get(layout.sheet_index)
            .map(|sheet| &sheet.grid)
            .ok_or_else(|| EngineError::LayoutError {
                sheet: layout.header.sheet.clone(),
                message: "payroll sheet index out of range".to_string(),
            })?;

        let indices = data_row_indices(grid, &layout.header, &self.total_markers);
        let mut rows = Vec::with_capacity(indices.len());
        for (processed, index) in indices.into_iter().enumerate() {
            if cancel.is_some_and(CancellationFlag::is_cancelled) {
                warn!(rows_processed = processed, "Payroll import cancelled");
                return Err(EngineError::Cancelled {
                    rows_processed: processed,
                });
            }

            let identity = read_identity(grid, index, &layout.header);
            let outcome = map_row(grid, index, &layout.header, &layout.scale)
                .and_then(|inputs| {
                    calculate_payroll(&inputs, request.exchange_rate)
                        .map(|calculation| RowOutcome::Computed { inputs, calculation })
                })
                .unwrap_or_else(RowOutcome::Failed);

            rows.push(ImportRow {
                row_number: index + 1,
                employee_no: identity.employee_no,
                full_name: identity.full_name,
                outcome,
            });
        }

        let options = ReconcileOptions {
            period: request.period,
            overwrite_existing: request.overwrite_existing,
            preview_limit: self.config.preview_limit,
        };
        let reconciliation = reconcile(&rows, existing, &options)?;

        let summary = &reconciliation.result.summary;
        info!(
            sheet = %layout.header.sheet,
            total_rows = summary.total_rows,
            added = summary.added,
            updated = summary.updated,
            errors = summary.errors,
            skipped = summary.skipped,
            salary_scale_found = layout.scale.is_found(),
            "Payroll import completed"
        );

        Ok((reconciliation, layout))
    }
}
