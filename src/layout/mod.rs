//! Layout location for payroll workbooks.
//!
//! This module finds the header row of the payroll table and the optional
//! grade × step salary scale, producing everything the row mapper needs.

mod header;
mod labels;
mod scale;

pub use header::{HeaderLocation, locate_header};
pub use labels::{LabelMatcher, LabelSet, MatchScore, normalize_label};
pub use scale::locate_salary_scale;

use tracing::warn;

use crate::config::ImportConfig;
use crate::error::EngineResult;
use crate::models::{HeaderMap, ScaleLookup, Sheet};

/// Warning recorded when the workbook carries no salary scale.
pub const SCALE_ABSENT_WARNING: &str =
    "Salary scale not found; rows must provide an explicit base salary";

/// The complete located layout of a workbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkbookLayout {
    /// Index of the payroll sheet.
    pub sheet_index: usize,
    /// Header row and column map.
    pub header: HeaderMap,
    /// The salary scale, if one exists.
    pub scale: ScaleLookup,
    /// Advisory layout messages.
    pub warnings: Vec<String>,
}

/// Locates the header (fatal if missing) and the salary scale (advisory if
/// missing).
pub fn locate_layout(sheets: &[Sheet], config: &ImportConfig) -> EngineResult<WorkbookLayout> {
    let HeaderLocation {
        sheet_index,
        header,
        mut warnings,
    } = locate_header(sheets, config)?;

    let markers = LabelSet::new(&config.scale_markers);
    let scale = locate_salary_scale(sheets, sheet_index, &markers);
    if !scale.is_found() {
        warn!(sheet = %header.sheet, "{}", SCALE_ABSENT_WARNING);
        warnings.push(SCALE_ABSENT_WARNING.to_string());
    }

    Ok(WorkbookLayout {
        sheet_index,
        header,
        scale,
        warnings,
    })
}
