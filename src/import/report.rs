//! CSV error report generation.

use serde::Serialize;

use crate::error::{EngineError, EngineResult};
use crate::models::{ImportRowResult, RowStatus};

#[derive(Serialize)]
struct ReportLine<'a> {
    row_number: usize,
    employee_no: &'a str,
    full_name: &'a str,
    error: &'a str,
}

/// Writes the failed rows as CSV text with a
/// `row_number,employee_no,full_name,error` header.
///
/// Returns `Ok(None)` when no row failed.
pub fn error_report(rows: &[ImportRowResult]) -> EngineResult<Option<String>> {
    let failed: Vec<&ImportRowResult> = rows
        .iter()
        .filter(|row| row.status == RowStatus::Error)
        .collect();
    if failed.is_empty() {
        return Ok(None);
    }

    let mut buf = Vec::new();
    {
        let mut wtr = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(&mut buf);
        for row in failed {
            wtr.serialize(ReportLine {
                row_number: row.row_number,
                employee_no: &row.employee_no,
                full_name: &row.full_name,
                error: row.error.as_deref().unwrap_or_default(),
            })
            .map_err(report_error)?;
        }
        wtr.flush().map_err(report_error)?;
    }

    String::from_utf8(buf).map(Some).map_err(report_error)
}

fn report_error(err: impl std::fmt::Display) -> EngineError {
    EngineError::ReportError {
        message: err.to_string(),
    }
}
