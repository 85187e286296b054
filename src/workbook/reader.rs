//! Workbook reading functionality.
//!
//! Opens any container `calamine` can sniff (`.xlsx`, `.xlsm`, `.xlsb`, `.xls`,
//! `.ods`) from memory and flattens each worksheet into a [`RawGrid`].

use std::io::Cursor;

use calamine::{Data, Range, Reader, open_workbook_auto_from_rs};
use tracing::{debug, warn};

use crate::error::{EngineError, EngineResult};
use crate::models::{Cell, RawGrid, Sheet};

/// Reads every worksheet of a workbook held in memory.
///
/// # Errors
///
/// Returns `UnreadableWorkbook` if the bytes are not a recognized spreadsheet
/// container, are corrupted, or contain no readable worksheet. A single sheet
/// that fails to decode is skipped with a warning.
///
/// # Example
///
/// ```
/// use payroll_engine::workbook::read_workbook;
/// use payroll_engine::error::EngineError;
///
/// let result = read_workbook(b"not a spreadsheet");
/// assert!(matches!(result, Err(EngineError::UnreadableWorkbook { .. })));
/// ```
pub fn read_workbook(bytes: &[u8]) -> EngineResult<Vec<Sheet>> {
    if bytes.is_empty() {
        return Err(EngineError::UnreadableWorkbook {
            message: "empty input".to_string(),
        });
    }

    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook =
        open_workbook_auto_from_rs(cursor).map_err(|e| EngineError::UnreadableWorkbook {
            message: e.to_string(),
        })?;

    let sheet_names = workbook.sheet_names();
    if sheet_names.is_empty() {
        return Err(EngineError::UnreadableWorkbook {
            message: "workbook contains no sheets".to_string(),
        });
    }

    let mut sheets = Vec::with_capacity(sheet_names.len());
    let mut last_error = None;
    for name in sheet_names {
        match workbook.worksheet_range(&name) {
            Ok(range) => {
                let grid = range_to_grid(&range);
                debug!(
                    sheet = %name,
                    rows = grid.height(),
                    columns = grid.width(),
                    "Read worksheet"
                );
                sheets.push(Sheet { name, grid });
            }
            Err(e) => {
                warn!(sheet = %name, error = %e, "Skipping unreadable worksheet");
                last_error = Some(e.to_string());
            }
        }
    }

    if sheets.is_empty() {
        return Err(EngineError::UnreadableWorkbook {
            message: last_error.unwrap_or_else(|| "no readable worksheets".to_string()),
        });
    }

    Ok(sheets)
}

/// Converts a calamine range into an absolutely-addressed grid.
///
/// calamine trims leading blank rows and columns from the used range, so the
/// range's start offset is re-applied here.
fn range_to_grid(range: &Range<Data>) -> RawGrid {
    let Some((start_row, start_col)) = range.start() else {
        return RawGrid::default();
    };
    let start_row = start_row as usize;
    let start_col = start_col as usize;

    let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); start_row];
    for source_row in range.rows() {
        let mut row = Vec::with_capacity(start_col + source_row.len());
        row.resize(start_col, Cell::Empty);
        row.extend(source_row.iter().map(convert_cell));
        rows.push(row);
    }

    RawGrid::from_rows(rows)
}

/// Maps a calamine cell to its literal value.
fn convert_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        // i64 values in payroll sheets fit f64 exactly.
        #[allow(clippy::cast_precision_loss)]
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}
