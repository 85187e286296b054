//! Raw sheet grid model.
//!
//! A [`RawGrid`] is the format-neutral view of one worksheet: a rectangular,
//! 0-indexed array of [`Cell`] values addressed by absolute sheet coordinates.

use serde::{Deserialize, Serialize};

/// A single raw cell value as stored in the workbook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "value")]
pub enum Cell {
    /// Blank cell, error cell, or a coordinate outside the used range.
    Empty,
    /// Text cell.
    Text(String),
    /// Numeric cell (integers, floats and date serials).
    Number(f64),
}

impl Cell {
    /// Returns true for blank cells and whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) => false,
        }
    }

    /// Returns the text content, if this is a text cell.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

static EMPTY_CELL: Cell = Cell::Empty;

/// A rectangular grid of raw cell values for one sheet.
///
/// Row and column indices are absolute: row 0 is the first row of the sheet
/// even when the sheet's used range starts further down. Reads outside the
/// stored area return [`Cell::Empty`].
///
/// # Example
///
/// ```
/// use payroll_engine::models::{Cell, RawGrid};
///
/// let grid = RawGrid::from_rows(vec![
///     vec![Cell::Text("name".to_string()), Cell::Number(1.0)],
/// ]);
/// assert_eq!(grid.get(0, 1), &Cell::Number(1.0));
/// assert_eq!(grid.get(5, 5), &Cell::Empty);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawGrid {
    rows: Vec<Vec<Cell>>,
    width: usize,
}

impl RawGrid {
    /// Builds a grid from rows, padding short rows with empty cells.
    pub fn from_rows(mut rows: Vec<Vec<Cell>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, Cell::Empty);
        }
        Self { rows, width }
    }

    /// Number of rows, including leading rows that are blank.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the cell at `(row, col)`, or [`Cell::Empty`] when out of range.
    pub fn get(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }

    /// Returns a whole row, or an empty slice when out of range.
    pub fn row(&self, row: usize) -> &[Cell] {
        self.rows.get(row).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns true if every cell of the row is blank.
    pub fn is_blank_row(&self, row: usize) -> bool {
        self.row(row).iter().all(Cell::is_blank)
    }
}

/// A named worksheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    /// The sheet name as shown on its tab.
    pub name: String,
    /// The sheet's cell values.
    pub grid: RawGrid,
}
