//! Header row location.
//!
//! Payroll workbooks open with an unpredictable number of title, logo and date
//! rows. The header is the first row in which enough required fields have a
//! recognizable label.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::config::ImportConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{Cell, HeaderMap, LogicalField, RawGrid, Sheet};

use super::labels::{LabelMatcher, MatchScore, normalize_label};

/// A located header together with non-fatal layout warnings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderLocation {
    /// Index of the payroll sheet within the workbook.
    pub sheet_index: usize,
    /// Field-to-column map of the header row.
    pub header: HeaderMap,
    /// Advisory messages, such as ambiguous optional columns.
    pub warnings: Vec<String>,
}

/// Every field match found in one row: (field, column, score).
type RowMatches = Vec<(LogicalField, usize, MatchScore)>;

/// Finds the header row across all sheets, in workbook order.
///
/// # Errors
///
/// - `LayoutError` if the first qualifying row of every candidate sheet fails
///   to resolve each required field to exactly one column.
/// - `HeaderRowNotFound` if no row of any sheet qualifies.
pub fn locate_header(sheets: &[Sheet], config: &ImportConfig) -> EngineResult<HeaderLocation> {
    let matcher = LabelMatcher::new(&config.labels, &config.computed_markers);
    let threshold = config.header.threshold();

    let mut first_layout_error = None;
    // (required matched, sheet name, row)
    let mut best_candidate: Option<(usize, &str, usize)> = None;

    for (sheet_index, sheet) in sheets.iter().enumerate() {
        let scan_rows = sheet.grid.height().min(config.header.max_scan_rows);

        for row in 0..scan_rows {
            let matches = match_row(&sheet.grid, row, &matcher);
            let required_matched = required_fields_matched(&matches);

            if best_candidate.is_none_or(|(best, _, _)| required_matched > best) {
                best_candidate = Some((required_matched, &sheet.name, row));
            }
            if required_matched < threshold {
                continue;
            }

            match resolve_columns(&sheet.name, &matches) {
                Ok((columns, warnings)) => {
                    debug!(
                        sheet = %sheet.name,
                        header_row = row,
                        fields = columns.len(),
                        "Located header row"
                    );
                    return Ok(HeaderLocation {
                        sheet_index,
                        header: HeaderMap::new(sheet.name.clone(), row, columns),
                        warnings,
                    });
                }
                Err(err) => {
                    debug!(sheet = %sheet.name, row, error = %err, "Header row rejected");
                    if first_layout_error.is_none() {
                        first_layout_error = Some(err);
                    }
                    break;
                }
            }
        }
    }

    if let Some(err) = first_layout_error {
        return Err(err);
    }

    let message = match best_candidate {
        Some((matched, sheet, row)) if matched > 0 => format!(
            "best candidate was row {} of sheet '{}' with {} of {} required columns (need {})",
            row + 1,
            sheet,
            matched,
            LogicalField::REQUIRED.len(),
            threshold
        ),
        _ => "no row contains a recognizable payroll column label".to_string(),
    };
    Err(EngineError::HeaderRowNotFound {
        sheets_scanned: sheets.len(),
        message,
    })
}

fn match_row(grid: &RawGrid, row: usize, matcher: &LabelMatcher) -> RowMatches {
    let mut matches = Vec::new();
    for (col, cell) in grid.row(row).iter().enumerate() {
        let Cell::Text(text) = cell else {
            continue;
        };
        let normalized = normalize_label(text);
        for (field, score) in matcher.matches(&normalized) {
            matches.push((field, col, score));
        }
    }
    matches
}

fn required_fields_matched(matches: &RowMatches) -> usize {
    matches
        .iter()
        .filter(|(field, _, _)| field.is_required())
        .map(|(field, _, _)| *field)
        .collect::<BTreeSet<_>>()
        .len()
}

/// Assigns one column per field: exact matches first, then containment
/// matches on columns not yet claimed.
fn resolve_columns(
    sheet: &str,
    matches: &RowMatches,
) -> EngineResult<(BTreeMap<LogicalField, usize>, Vec<String>)> {
    let mut columns: BTreeMap<LogicalField, usize> = BTreeMap::new();
    let mut claimed: BTreeSet<usize> = BTreeSet::new();
    let mut warnings = Vec::new();

    for score in [MatchScore::Exact, MatchScore::Contains] {
        for field in LogicalField::ALL {
            if columns.contains_key(&field) {
                continue;
            }
            let candidates: Vec<usize> = matches
                .iter()
                .filter(|(f, col, s)| *f == field && *s == score && !claimed.contains(col))
                .map(|(_, col, _)| *col)
                .collect();

            let Some(&first) = candidates.first() else {
                continue;
            };
            if candidates.len() > 1 {
                let listed = column_list(&candidates);
                if field.is_required() {
                    return Err(EngineError::LayoutError {
                        sheet: sheet.to_string(),
                        message: format!(
                            "required column '{}' matches several columns ({})",
                            field, listed
                        ),
                    });
                }
                warnings.push(format!(
                    "Column '{}' matches several columns ({}) on sheet '{}'; using column {}",
                    field,
                    listed,
                    sheet,
                    first + 1
                ));
            }
            columns.insert(field, first);
            claimed.insert(first);
        }
    }

    let missing: Vec<&str> = LogicalField::REQUIRED
        .iter()
        .filter(|field| !columns.contains_key(*field))
        .map(LogicalField::as_str)
        .collect();
    if !missing.is_empty() {
        return Err(EngineError::LayoutError {
            sheet: sheet.to_string(),
            message: format!("header row is missing required column(s): {}", missing.join(", ")),
        });
    }

    Ok((columns, warnings))
}

fn column_list(columns: &[usize]) -> String {
    columns
        .iter()
        .map(|c| (c + 1).to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn sheet(name: &str, rows: Vec<Vec<Cell>>) -> Sheet {
        Sheet {
            name: name.to_string(),
            grid: RawGrid::from_rows(rows),
        }
    }

    fn arabic_header() -> Vec<Cell> {
        vec![
            text("م"),
            text("الرقم الوظيفي"),
            text("الاسم الكامل"),
            text("الراتب الأساسي"),
            text("بدل سكن"),
            text("بدل نقل"),
            text("خصومات أخرى"),
        ]
    }

    #[test]
    fn test_header_found_below_title_rows() {
        let sheets = vec![sheet(
            "رواتب",
            vec![
                vec![text("شركة المثال للتجارة")],
                vec![],
                vec![text("كشف رواتب شهر آذار 2025")],
                arabic_header(),
                vec![Cell::Number(1.0), text("0012"), text("سامي")],
            ],
        )];

        let location = locate_header(&sheets, &ImportConfig::default()).unwrap();
        assert_eq!(location.sheet_index, 0);
        assert_eq!(location.header.header_row, 3);
        assert_eq!(location.header.column(LogicalField::EmployeeNo), Some(1));
        assert_eq!(location.header.column(LogicalField::FullName), Some(2));
        assert_eq!(location.header.column(LogicalField::BaseSalaryUsd), Some(3));
        assert_eq!(location.header.column(LogicalField::HousingAllowance), Some(4));
        assert_eq!(location.header.column(LogicalField::TransportAllowance), Some(5));
        assert_eq!(location.header.column(LogicalField::OtherDeduction), Some(6));
        assert!(location.warnings.is_empty());
    }

    #[test]
    fn test_header_found_on_second_sheet() {
        let sheets = vec![
            sheet("Cover", vec![vec![text("Payroll March")]]),
            sheet(
                "Data",
                vec![vec![text("Employee No"), text("Name"), text("Base Salary")]],
            ),
        ];

        let location = locate_header(&sheets, &ImportConfig::default()).unwrap();
        assert_eq!(location.sheet_index, 1);
        assert_eq!(location.header.sheet, "Data");
        assert_eq!(location.header.header_row, 0);
    }

    #[test]
    fn test_no_header_is_fatal() {
        let sheets = vec![sheet("Notes", vec![vec![text("hello")], vec![text("world")]])];

        match locate_header(&sheets, &ImportConfig::default()) {
            Err(EngineError::HeaderRowNotFound {
                sheets_scanned,
                message,
            }) => {
                assert_eq!(sheets_scanned, 1);
                assert!(message.contains("no row"));
            }
            other => panic!("Expected HeaderRowNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_below_threshold_reports_best_candidate() {
        let sheets = vec![sheet(
            "Data",
            vec![vec![text("Employee No"), text("Department")]],
        )];

        match locate_header(&sheets, &ImportConfig::default()) {
            Err(EngineError::HeaderRowNotFound { message, .. }) => {
                assert!(message.contains("row 1"), "{}", message);
                assert!(message.contains("1 of 3"), "{}", message);
            }
            other => panic!("Expected HeaderRowNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_required_column_is_layout_error() {
        let sheets = vec![sheet(
            "Data",
            vec![vec![text("Employee No"), text("Name"), text("Housing allowance")]],
        )];

        match locate_header(&sheets, &ImportConfig::default()) {
            Err(EngineError::LayoutError { sheet, message }) => {
                assert_eq!(sheet, "Data");
                assert!(message.contains("base_salary_usd"), "{}", message);
            }
            other => panic!("Expected LayoutError, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_required_column_is_layout_error() {
        let sheets = vec![sheet(
            "Data",
            vec![vec![
                text("Employee No"),
                text("Name"),
                text("Base Salary"),
                text("Base Salary"),
            ]],
        )];

        match locate_header(&sheets, &ImportConfig::default()) {
            Err(EngineError::LayoutError { message, .. }) => {
                assert!(message.contains("several columns (3, 4)"), "{}", message);
            }
            other => panic!("Expected LayoutError, got {:?}", other),
        }
    }

    #[test]
    fn test_ambiguous_optional_column_warns_and_takes_leftmost() {
        let sheets = vec![sheet(
            "Data",
            vec![vec![
                text("Employee No"),
                text("Name"),
                text("Base Salary"),
                text("Fuel allowance"),
                text("Fuel allowance"),
            ]],
        )];

        let location = locate_header(&sheets, &ImportConfig::default()).unwrap();
        assert_eq!(location.header.column(LogicalField::FuelAllowance), Some(3));
        assert_eq!(location.warnings.len(), 1);
        assert!(location.warnings[0].contains("fuel_allowance"));
    }

    #[test]
    fn test_exact_match_claims_column_before_containment() {
        // "الدرجة الوظيفية" is an exact grade label and also contains the step label "الدرجة".
        let sheets = vec![sheet(
            "Data",
            vec![vec![
                text("Employee No"),
                text("Name"),
                text("Base Salary"),
                text("الدرجة الوظيفية"),
                text("المرحلة"),
            ]],
        )];

        let location = locate_header(&sheets, &ImportConfig::default()).unwrap();
        assert_eq!(location.header.column(LogicalField::Grade), Some(3));
        assert_eq!(location.header.column(LogicalField::Step), Some(4));
    }

    #[test]
    fn test_custom_threshold_requires_all_fields() {
        let mut config = ImportConfig::default();
        config.header.match_threshold = Some(3);
        let sheets = vec![sheet(
            "Data",
            vec![vec![text("Employee No"), text("Name")]],
        )];

        assert!(matches!(
            locate_header(&sheets, &config),
            Err(EngineError::HeaderRowNotFound { .. })
        ));
    }

    #[test]
    fn test_rows_beyond_scan_limit_are_ignored() {
        let mut config = ImportConfig::default();
        config.header.max_scan_rows = 2;
        let sheets = vec![sheet(
            "Data",
            vec![
                vec![text("title")],
                vec![text("subtitle")],
                vec![text("Employee No"), text("Name"), text("Base Salary")],
            ],
        )];

        assert!(matches!(
            locate_header(&sheets, &config),
            Err(EngineError::HeaderRowNotFound { .. })
        ));
    }

    #[test]
    fn test_computed_columns_are_left_unmapped() {
        let sheets = vec![sheet(
            "Data",
            vec![vec![
                text("Employee No"),
                text("Name"),
                text("Base Salary"),
                text("Net Payment"),
                text("Total additions"),
                text("Loan balance"),
            ]],
        )];

        let location = locate_header(&sheets, &ImportConfig::default()).unwrap();
        assert_eq!(location.header.column(LogicalField::PaymentDeduction), None);
        assert_eq!(location.header.column(LogicalField::ExceptionalAdditionsUsd), None);
        assert_eq!(location.header.column(LogicalField::LoanPenaltyDeduction), None);
        assert_eq!(location.header.columns().len(), 3);
    }

    #[test]
    fn test_payment_column_beside_net_payment() {
        let sheets = vec![sheet(
            "Data",
            vec![vec![
                text("Employee No"),
                text("Name"),
                text("Base Salary"),
                text("Net Payment"),
                text("Advance payment"),
            ]],
        )];

        let location = locate_header(&sheets, &ImportConfig::default()).unwrap();
        assert_eq!(location.header.column(LogicalField::PaymentDeduction), Some(4));
        assert!(location.warnings.is_empty());
    }
}
