//! Row mapping functionality.
//!
//! Converts one raw sheet row into [`PayrollInputs`] using the located header
//! columns and, when the base salary cell is blank, the salary scale.

use rust_decimal::Decimal;

use crate::error::RowError;
use crate::layout::LabelSet;
use crate::models::{
    Allowances, BaseSalarySource, Cell, Deductions, HeaderMap, LogicalField, PayrollInputs,
    RawGrid, ScaleLookup,
};

use super::coerce::{Numeric, coerce_identifier, coerce_name, coerce_numeric, coerce_positive_int};

/// The identity cells of a row, read leniently for reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowIdentity {
    /// Employee number, or empty when blank.
    pub employee_no: String,
    /// Employee name, or empty when blank.
    pub full_name: String,
}

/// Reads the employee number and name without validating them.
pub fn read_identity(grid: &RawGrid, row: usize, header: &HeaderMap) -> RowIdentity {
    let cell = |field| {
        header
            .column(field)
            .map_or(&Cell::Empty, |col| grid.get(row, col))
    };
    RowIdentity {
        employee_no: coerce_identifier(cell(LogicalField::EmployeeNo)).unwrap_or_default(),
        full_name: coerce_name(cell(LogicalField::FullName)).unwrap_or_default(),
    }
}

/// Maps one sheet row to payroll inputs.
///
/// Checks run in a fixed order so that the reported error is stable: employee
/// number, name, non-negative amounts, then base salary resolution.
///
/// # Errors
///
/// - `MissingEmployeeNo` / `MissingFullName` for blank identity cells
/// - `NegativeAmount` for any negative monetary or numeric field
/// - `MissingBaseSalary` when the base salary is blank and there is no scale
/// - `UnresolvedBaseSalary` when the scale lookup fails
///
/// Blank or non-numeric text in any other numeric field reads as zero.
pub fn map_row(
    grid: &RawGrid,
    row: usize,
    header: &HeaderMap,
    scale: &ScaleLookup,
) -> Result<PayrollInputs, RowError> {
    let cell = |field: LogicalField| {
        header
            .column(field)
            .map_or(&Cell::Empty, |col| grid.get(row, col))
    };

    let employee_no =
        coerce_identifier(cell(LogicalField::EmployeeNo)).ok_or(RowError::MissingEmployeeNo)?;
    let full_name = coerce_name(cell(LogicalField::FullName)).ok_or(RowError::MissingFullName)?;

    let amount = |field: LogicalField| -> Result<Decimal, RowError> {
        match coerce_numeric(cell(field)) {
            Numeric::Value(value) if value < Decimal::ZERO => Err(RowError::NegativeAmount {
                field: field.to_string(),
                value: value.to_string(),
            }),
            Numeric::Value(value) => Ok(value),
            Numeric::Blank | Numeric::NotNumeric => Ok(Decimal::ZERO),
        }
    };

    let allowances = Allowances {
        admin: amount(LogicalField::AdminAllowance)?,
        education: amount(LogicalField::EducationAllowance)?,
        housing: amount(LogicalField::HousingAllowance)?,
        transport: amount(LogicalField::TransportAllowance)?,
        cost_of_living: amount(LogicalField::CostOfLivingAllowance)?,
        children: amount(LogicalField::ChildrenAllowance)?,
        special: amount(LogicalField::SpecialAllowance)?,
        fuel: amount(LogicalField::FuelAllowance)?,
    };
    let deductions = Deductions {
        loan_penalty: amount(LogicalField::LoanPenaltyDeduction)?,
        payment: amount(LogicalField::PaymentDeduction)?,
        other: amount(LogicalField::OtherDeduction)?,
    };
    let overtime_hours = amount(LogicalField::OvertimeHours)?;
    let hourly_rate_usd = amount(LogicalField::HourlyRateUsd)?;
    let eos_accrual_usd = amount(LogicalField::EosAccrualUsd)?;
    let exceptional_additions_usd = amount(LogicalField::ExceptionalAdditionsUsd)?;

    let (base_salary_usd, base_salary_source) = match coerce_numeric(cell(LogicalField::BaseSalaryUsd)) {
        Numeric::Value(value) if value < Decimal::ZERO => {
            return Err(RowError::NegativeAmount {
                field: LogicalField::BaseSalaryUsd.to_string(),
                value: value.to_string(),
            });
        }
        Numeric::Value(value) => (value, BaseSalarySource::Explicit),
        // Placeholder text such as "-" in the base column means "look it up".
        Numeric::Blank | Numeric::NotNumeric => resolve_from_scale(
            scale,
            cell(LogicalField::Grade),
            cell(LogicalField::Step),
        )?,
    };

    Ok(PayrollInputs {
        employee_no,
        full_name,
        base_salary_usd,
        allowances,
        overtime_hours,
        hourly_rate_usd,
        eos_accrual_usd,
        exceptional_additions_usd,
        deductions,
        base_salary_source,
    })
}

fn resolve_from_scale(
    scale: &ScaleLookup,
    grade_cell: &Cell,
    step_cell: &Cell,
) -> Result<(Decimal, BaseSalarySource), RowError> {
    let scale = match scale {
        ScaleLookup::Found(scale) => scale,
        ScaleLookup::Absent => return Err(RowError::MissingBaseSalary),
    };

    let (grade, step) = match (coerce_positive_int(grade_cell), coerce_positive_int(step_cell)) {
        (Some(grade), Some(step)) => (grade, step),
        _ => {
            return Err(RowError::UnresolvedBaseSalary {
                reason: "row has no valid grade/step".to_string(),
            });
        }
    };

    scale
        .lookup(grade, step)
        .map(|amount| (amount, BaseSalarySource::Scale { grade, step }))
        .ok_or_else(|| RowError::UnresolvedBaseSalary {
            reason: format!("grade {} step {} is not in the salary scale", grade, step),
        })
}

/// Returns the 0-based indices of data rows below the header.
///
/// Blank rows are not data rows. A row without an employee number whose text
/// matches a total marker ends the data region.
pub fn data_row_indices(grid: &RawGrid, header: &HeaderMap, total_markers: &LabelSet) -> Vec<usize> {
    let employee_col = header.column(LogicalField::EmployeeNo);
    let mut rows = Vec::new();

    for row in header.header_row + 1..grid.height() {
        if grid.is_blank_row(row) {
            continue;
        }
        let has_employee_no = employee_col.is_some_and(|col| !grid.get(row, col).is_blank());
        let is_footer = !has_employee_no
            && grid
                .row(row)
                .iter()
                .filter_map(Cell::as_text)
                .any(|text| total_markers.score(text).is_match());
        if is_footer {
            break;
        }
        rows.push(row);
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SalaryScale;
    use std::collections::BTreeMap;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn num(n: f64) -> Cell {
        Cell::Number(n)
    }

    /// Columns: 0 employee_no, 1 full_name, 2 grade, 3 step, 4 base,
    /// 5 housing, 6 overtime hours, 7 hourly rate, 8 loan/penalty.
    fn header() -> HeaderMap {
        let columns: BTreeMap<LogicalField, usize> = [
            (LogicalField::EmployeeNo, 0),
            (LogicalField::FullName, 1),
            (LogicalField::Grade, 2),
            (LogicalField::Step, 3),
            (LogicalField::BaseSalaryUsd, 4),
            (LogicalField::HousingAllowance, 5),
            (LogicalField::OvertimeHours, 6),
            (LogicalField::HourlyRateUsd, 7),
            (LogicalField::LoanPenaltyDeduction, 8),
        ]
        .into_iter()
        .collect();
        HeaderMap::new("Data", 0, columns)
    }

    fn scale() -> ScaleLookup {
        let mut scale = SalaryScale::new("Scale", (0, 0));
        scale.insert(2, 3, dec("812.50"));
        ScaleLookup::Found(scale)
    }

    fn grid(row: Vec<Cell>) -> RawGrid {
        RawGrid::from_rows(vec![vec![text("header")], row])
    }

    #[test]
    fn test_maps_full_row() {
        let grid = grid(vec![
            text("00017"),
            text(" ليلى  حداد "),
            Cell::Empty,
            Cell::Empty,
            num(1200.0),
            text("150,5"),
            num(4.0),
            text("12.5"),
            num(100.0),
        ]);

        let inputs = map_row(&grid, 1, &header(), &ScaleLookup::Absent).unwrap();
        assert_eq!(inputs.employee_no, "00017");
        assert_eq!(inputs.full_name, "ليلى حداد");
        assert_eq!(inputs.base_salary_usd, dec("1200"));
        assert_eq!(inputs.base_salary_source, BaseSalarySource::Explicit);
        assert_eq!(inputs.allowances.housing, dec("150.5"));
        assert_eq!(inputs.allowances.fuel, Decimal::ZERO);
        assert_eq!(inputs.overtime_hours, dec("4"));
        assert_eq!(inputs.hourly_rate_usd, dec("12.5"));
        assert_eq!(inputs.deductions.loan_penalty, dec("100"));
    }

    #[test]
    fn test_missing_employee_no_is_error_even_if_rest_valid() {
        let grid = grid(vec![text(""), text("Omar"), Cell::Empty, Cell::Empty, num(900.0)]);
        assert_eq!(
            map_row(&grid, 1, &header(), &ScaleLookup::Absent),
            Err(RowError::MissingEmployeeNo)
        );
    }

    #[test]
    fn test_missing_name_is_error() {
        let grid = grid(vec![num(5.0), Cell::Empty, Cell::Empty, Cell::Empty, num(900.0)]);
        assert_eq!(
            map_row(&grid, 1, &header(), &ScaleLookup::Absent),
            Err(RowError::MissingFullName)
        );
    }

    #[test]
    fn test_non_numeric_text_reads_as_zero() {
        let grid = grid(vec![
            text("7"),
            text("Omar"),
            Cell::Empty,
            Cell::Empty,
            num(900.0),
            text("لا يوجد"),
        ]);
        let inputs = map_row(&grid, 1, &header(), &ScaleLookup::Absent).unwrap();
        assert_eq!(inputs.allowances.housing, Decimal::ZERO);
    }

    #[test]
    fn test_negative_amount_is_error() {
        let grid = grid(vec![
            text("7"),
            text("Omar"),
            Cell::Empty,
            Cell::Empty,
            num(900.0),
            text("(25)"),
        ]);
        assert_eq!(
            map_row(&grid, 1, &header(), &ScaleLookup::Absent),
            Err(RowError::NegativeAmount {
                field: "housing_allowance".to_string(),
                value: "-25".to_string(),
            })
        );
    }

    #[test]
    fn test_blank_base_without_scale_is_error() {
        let grid = grid(vec![text("7"), text("Omar"), num(2.0), num(3.0), Cell::Empty]);
        assert_eq!(
            map_row(&grid, 1, &header(), &ScaleLookup::Absent),
            Err(RowError::MissingBaseSalary)
        );
    }

    #[test]
    fn test_blank_base_resolved_from_scale() {
        let grid = grid(vec![text("7"), text("Omar"), num(2.0), text("3"), Cell::Empty]);
        let inputs = map_row(&grid, 1, &header(), &scale()).unwrap();
        assert_eq!(inputs.base_salary_usd, dec("812.50"));
        assert_eq!(
            inputs.base_salary_source,
            BaseSalarySource::Scale { grade: 2, step: 3 }
        );
    }

    #[test]
    fn test_explicit_base_wins_over_scale() {
        let grid = grid(vec![text("7"), text("Omar"), num(2.0), num(3.0), num(1000.0)]);
        let inputs = map_row(&grid, 1, &header(), &scale()).unwrap();
        assert_eq!(inputs.base_salary_usd, dec("1000"));
        assert_eq!(inputs.base_salary_source, BaseSalarySource::Explicit);
    }

    #[test]
    fn test_unknown_grade_step_is_error() {
        let grid = grid(vec![text("7"), text("Omar"), num(9.0), num(9.0), Cell::Empty]);
        match map_row(&grid, 1, &header(), &scale()) {
            Err(RowError::UnresolvedBaseSalary { reason }) => {
                assert!(reason.contains("grade 9 step 9"), "{}", reason);
            }
            other => panic!("Expected UnresolvedBaseSalary, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_grade_step_with_scale_is_error() {
        let grid = grid(vec![text("7"), text("Omar"), Cell::Empty, Cell::Empty, Cell::Empty]);
        assert!(matches!(
            map_row(&grid, 1, &header(), &scale()),
            Err(RowError::UnresolvedBaseSalary { .. })
        ));
    }

    #[test]
    fn test_zero_base_maps_but_is_not_payable() {
        let grid = grid(vec![text("7"), text("Omar"), Cell::Empty, Cell::Empty, num(0.0)]);
        let inputs = map_row(&grid, 1, &header(), &ScaleLookup::Absent).unwrap();
        assert!(!inputs.has_payable_salary());
    }

    #[test]
    fn test_read_identity_is_lenient() {
        let grid = grid(vec![Cell::Empty, text("Omar")]);
        let identity = read_identity(&grid, 1, &header());
        assert_eq!(identity.employee_no, "");
        assert_eq!(identity.full_name, "Omar");
    }

    #[test]
    fn test_data_rows_skip_blanks_and_stop_at_footer() {
        let grid = RawGrid::from_rows(vec![
            vec![text("header")],
            vec![text("1"), text("A")],
            vec![],
            vec![text("2"), text("B")],
            vec![Cell::Empty, text("المجموع"), Cell::Empty, Cell::Empty, num(3000.0)],
            vec![text("3"), text("C")],
        ]);
        let markers = LabelSet::new(["total", "المجموع"]);

        assert_eq!(data_row_indices(&grid, &header(), &markers), vec![1, 3]);
    }

    #[test]
    fn test_row_without_employee_no_and_no_marker_is_data() {
        let grid = RawGrid::from_rows(vec![
            vec![text("header")],
            vec![Cell::Empty, text("Nameless")],
        ]);
        let markers = LabelSet::new(["total"]);
        assert_eq!(data_row_indices(&grid, &header(), &markers), vec![1]);
    }
}
