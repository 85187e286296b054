//! Salary scale location.
//!
//! A salary scale is a block whose top-left cell carries a grade/step marker,
//! with step numbers running right along the marker row, grade numbers running
//! down the marker column, and base salaries in between.

use rust_decimal::Decimal;
use tracing::debug;

use crate::mapping::{Numeric, coerce_numeric, coerce_positive_int};
use crate::models::{Cell, RawGrid, SalaryScale, ScaleLookup, Sheet};

use super::labels::LabelSet;

/// Searches the workbook for a salary scale.
///
/// The sheet at `preferred` (normally the payroll sheet) is searched first,
/// then the remaining sheets in workbook order. The first marker that anchors
/// a non-empty block wins.
pub fn locate_salary_scale(sheets: &[Sheet], preferred: usize, markers: &LabelSet) -> ScaleLookup {
    let order = std::iter::once(preferred)
        .chain((0..sheets.len()).filter(|i| *i != preferred))
        .filter(|i| *i < sheets.len());

    for index in order {
        let sheet = &sheets[index];
        if let Some(scale) = scan_sheet(sheet, markers) {
            debug!(
                sheet = %sheet.name,
                row = scale.origin.0,
                column = scale.origin.1,
                entries = scale.len(),
                "Located salary scale"
            );
            return ScaleLookup::Found(scale);
        }
    }

    ScaleLookup::Absent
}

fn scan_sheet(sheet: &Sheet, markers: &LabelSet) -> Option<SalaryScale> {
    let grid = &sheet.grid;
    for row in 0..grid.height() {
        for (col, cell) in grid.row(row).iter().enumerate() {
            let Cell::Text(text) = cell else {
                continue;
            };
            if !markers.score(text).is_match() {
                continue;
            }
            if let Some(scale) = read_block(&sheet.name, grid, row, col) {
                return Some(scale);
            }
        }
    }
    None
}

fn read_block(sheet: &str, grid: &RawGrid, row: usize, col: usize) -> Option<SalaryScale> {
    let steps: Vec<(usize, u32)> = (col + 1..grid.width())
        .map(|c| (c, coerce_positive_int(grid.get(row, c))))
        .take_while(|(_, step)| step.is_some())
        .filter_map(|(c, step)| step.map(|s| (c, s)))
        .collect();
    let grades: Vec<(usize, u32)> = (row + 1..grid.height())
        .map(|r| (r, coerce_positive_int(grid.get(r, col))))
        .take_while(|(_, grade)| grade.is_some())
        .filter_map(|(r, grade)| grade.map(|g| (r, g)))
        .collect();

    if steps.is_empty() || grades.is_empty() {
        return None;
    }

    let mut scale = SalaryScale::new(sheet, (row, col));
    for (r, grade) in &grades {
        for (c, step) in &steps {
            if let Numeric::Value(amount) = coerce_numeric(grid.get(*r, *c)) {
                if amount > Decimal::ZERO {
                    scale.insert(*grade, *step, amount);
                }
            }
        }
    }

    (!scale.is_empty()).then_some(scale)
}
