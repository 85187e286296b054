//! Sheet layout models: logical fields, header maps and the salary scale.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A logical payroll column, independent of how a given workbook labels it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalField {
    /// Employee identifier.
    EmployeeNo,
    /// Employee full name.
    FullName,
    /// Job grade used for salary scale lookup.
    Grade,
    /// Step within the grade used for salary scale lookup.
    Step,
    /// Explicit base salary in USD.
    BaseSalaryUsd,
    /// Administrative allowance.
    AdminAllowance,
    /// Education allowance.
    EducationAllowance,
    /// Housing allowance.
    HousingAllowance,
    /// Transport allowance.
    TransportAllowance,
    /// Cost-of-living allowance.
    CostOfLivingAllowance,
    /// Children allowance.
    ChildrenAllowance,
    /// Special allowance.
    SpecialAllowance,
    /// Fuel allowance.
    FuelAllowance,
    /// Overtime hours worked in the period.
    OvertimeHours,
    /// Hourly rate applied to overtime hours, in USD.
    HourlyRateUsd,
    /// End-of-service accrual for the period, in USD.
    EosAccrualUsd,
    /// Exceptional additions, in USD.
    ExceptionalAdditionsUsd,
    /// Loan repayment or penalty deduction.
    LoanPenaltyDeduction,
    /// Payment (advance) deduction.
    PaymentDeduction,
    /// Other deductions.
    OtherDeduction,
}

impl LogicalField {
    /// Every logical field, in canonical column order.
    pub const ALL: [LogicalField; 20] = [
        LogicalField::EmployeeNo,
        LogicalField::FullName,
        LogicalField::Grade,
        LogicalField::Step,
        LogicalField::BaseSalaryUsd,
        LogicalField::AdminAllowance,
        LogicalField::EducationAllowance,
        LogicalField::HousingAllowance,
        LogicalField::TransportAllowance,
        LogicalField::CostOfLivingAllowance,
        LogicalField::ChildrenAllowance,
        LogicalField::SpecialAllowance,
        LogicalField::FuelAllowance,
        LogicalField::OvertimeHours,
        LogicalField::HourlyRateUsd,
        LogicalField::EosAccrualUsd,
        LogicalField::ExceptionalAdditionsUsd,
        LogicalField::LoanPenaltyDeduction,
        LogicalField::PaymentDeduction,
        LogicalField::OtherDeduction,
    ];

    /// Fields that must resolve to a column for a sheet to be importable.
    pub const REQUIRED: [LogicalField; 3] = [
        LogicalField::EmployeeNo,
        LogicalField::FullName,
        LogicalField::BaseSalaryUsd,
    ];

    /// Returns the snake_case name used in messages and configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalField::EmployeeNo => "employee_no",
            LogicalField::FullName => "full_name",
            LogicalField::Grade => "grade",
            LogicalField::Step => "step",
            LogicalField::BaseSalaryUsd => "base_salary_usd",
            LogicalField::AdminAllowance => "admin_allowance",
            LogicalField::EducationAllowance => "education_allowance",
            LogicalField::HousingAllowance => "housing_allowance",
            LogicalField::TransportAllowance => "transport_allowance",
            LogicalField::CostOfLivingAllowance => "cost_of_living_allowance",
            LogicalField::ChildrenAllowance => "children_allowance",
            LogicalField::SpecialAllowance => "special_allowance",
            LogicalField::FuelAllowance => "fuel_allowance",
            LogicalField::OvertimeHours => "overtime_hours",
            LogicalField::HourlyRateUsd => "hourly_rate_usd",
            LogicalField::EosAccrualUsd => "eos_accrual_usd",
            LogicalField::ExceptionalAdditionsUsd => "exceptional_additions_usd",
            LogicalField::LoanPenaltyDeduction => "loan_penalty_deduction",
            LogicalField::PaymentDeduction => "payment_deduction",
            LogicalField::OtherDeduction => "other_deduction",
        }
    }

    /// Returns true if the field must be present in the header row.
    pub fn is_required(&self) -> bool {
        Self::REQUIRED.contains(self)
    }
}

impl fmt::Display for LogicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The located header row and the column of every matched logical field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderMap {
    /// Name of the sheet holding the payroll table.
    pub sheet: String,
    /// 0-based index of the header row.
    pub header_row: usize,
    columns: BTreeMap<LogicalField, usize>,
}

impl HeaderMap {
    /// Creates a header map from matched columns.
    pub fn new(
        sheet: impl Into<String>,
        header_row: usize,
        columns: BTreeMap<LogicalField, usize>,
    ) -> Self {
        Self {
            sheet: sheet.into(),
            header_row,
            columns,
        }
    }

    /// Returns the column index of a field, if it was found in the header.
    pub fn column(&self, field: LogicalField) -> Option<usize> {
        self.columns.get(&field).copied()
    }

    /// Returns all matched fields with their columns.
    pub fn columns(&self) -> &BTreeMap<LogicalField, usize> {
        &self.columns
    }
}

/// A grade × step → base salary lookup table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SalaryScale {
    /// Sheet on which the scale was found.
    pub sheet: String,
    /// 0-based (row, column) of the grade/step marker cell.
    pub origin: (usize, usize),
    entries: HashMap<(u32, u32), Decimal>,
}

impl SalaryScale {
    /// Creates an empty scale anchored at a marker cell.
    pub fn new(sheet: impl Into<String>, origin: (usize, usize)) -> Self {
        Self {
            sheet: sheet.into(),
            origin,
            entries: HashMap::new(),
        }
    }

    /// Adds or replaces the base salary for a grade and step.
    pub fn insert(&mut self, grade: u32, step: u32, base_salary: Decimal) {
        self.entries.insert((grade, step), base_salary);
    }

    /// Looks up the base salary for a grade and step.
    pub fn lookup(&self, grade: u32, step: u32) -> Option<Decimal> {
        self.entries.get(&(grade, step)).copied()
    }

    /// Number of populated cells.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the scale has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Outcome of the salary scale search.
///
/// The absent case is an expected condition, so it is modelled as a variant
/// rather than an `Option` the row mapper could forget to check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScaleLookup {
    /// A scale was located in the workbook.
    Found(SalaryScale),
    /// No scale exists; rows must carry an explicit base salary.
    Absent,
}

impl ScaleLookup {
    /// Returns true if a scale was found.
    pub fn is_found(&self) -> bool {
        matches!(self, ScaleLookup::Found(_))
    }
}
