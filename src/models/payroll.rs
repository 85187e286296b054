//! Payroll input and output models.
//!
//! [`PayrollInputs`] holds one employee's raw compensation facts for a month as
//! read from the workbook. [`PayrollOutput`] is the computed breakdown in one
//! currency, and [`PayrollCalculation`] pairs the USD and TRY outputs with the
//! rate used and an audit trail.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Number of decimal places used when presenting or persisting money.
pub const MONEY_DECIMAL_PLACES: u32 = 2;

/// The eight fixed allowance components.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allowances {
    /// Administrative allowance.
    #[serde(default)]
    pub admin: Decimal,
    /// Education allowance.
    #[serde(default)]
    pub education: Decimal,
    /// Housing allowance.
    #[serde(default)]
    pub housing: Decimal,
    /// Transport allowance.
    #[serde(default)]
    pub transport: Decimal,
    /// Cost-of-living allowance.
    #[serde(default)]
    pub cost_of_living: Decimal,
    /// Children allowance.
    #[serde(default)]
    pub children: Decimal,
    /// Special allowance.
    #[serde(default)]
    pub special: Decimal,
    /// Fuel allowance.
    #[serde(default)]
    pub fuel: Decimal,
}

impl Allowances {
    /// Returns every component with its name, in a fixed order.
    pub fn components(&self) -> [(&'static str, Decimal); 8] {
        [
            ("admin", self.admin),
            ("education", self.education),
            ("housing", self.housing),
            ("transport", self.transport),
            ("cost_of_living", self.cost_of_living),
            ("children", self.children),
            ("special", self.special),
            ("fuel", self.fuel),
        ]
    }

    fn try_map(&self, f: &impl Fn(Decimal) -> Option<Decimal>) -> Option<Self> {
        Some(Self {
            admin: f(self.admin)?,
            education: f(self.education)?,
            housing: f(self.housing)?,
            transport: f(self.transport)?,
            cost_of_living: f(self.cost_of_living)?,
            children: f(self.children)?,
            special: f(self.special)?,
            fuel: f(self.fuel)?,
        })
    }
}

/// The three deduction components.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deductions {
    /// Loan repayment or penalty.
    #[serde(default)]
    pub loan_penalty: Decimal,
    /// Payment (advance) already made.
    #[serde(default)]
    pub payment: Decimal,
    /// Other deductions.
    #[serde(default)]
    pub other: Decimal,
}

impl Deductions {
    /// Returns every component with its name, in a fixed order.
    pub fn components(&self) -> [(&'static str, Decimal); 3] {
        [
            ("loan_penalty", self.loan_penalty),
            ("payment", self.payment),
            ("other", self.other),
        ]
    }

    fn try_map(&self, f: &impl Fn(Decimal) -> Option<Decimal>) -> Option<Self> {
        Some(Self {
            loan_penalty: f(self.loan_penalty)?,
            payment: f(self.payment)?,
            other: f(self.other)?,
        })
    }
}

/// Where a row's base salary came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "source")]
pub enum BaseSalarySource {
    /// Read from the row's own base salary cell.
    #[default]
    Explicit,
    /// Resolved from the salary scale.
    Scale {
        /// The row's grade.
        grade: u32,
        /// The row's step.
        step: u32,
    },
}

/// One employee's compensation facts for one import month.
///
/// All monetary amounts are USD and non-negative.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollInputs {
    /// Employee identifier, leading zeros preserved.
    pub employee_no: String,
    /// Employee full name.
    pub full_name: String,
    /// Monthly base salary.
    pub base_salary_usd: Decimal,
    /// Allowance components.
    #[serde(default)]
    pub allowances: Allowances,
    /// Overtime hours worked.
    #[serde(default)]
    pub overtime_hours: Decimal,
    /// Hourly rate applied to overtime.
    #[serde(default)]
    pub hourly_rate_usd: Decimal,
    /// End-of-service accrual for the period.
    #[serde(default)]
    pub eos_accrual_usd: Decimal,
    /// Exceptional additions.
    #[serde(default)]
    pub exceptional_additions_usd: Decimal,
    /// Deduction components.
    #[serde(default)]
    pub deductions: Deductions,
    /// Origin of `base_salary_usd`.
    #[serde(default)]
    pub base_salary_source: BaseSalarySource,
}

impl PayrollInputs {
    /// Returns false for structurally valid rows that carry no payable salary,
    /// such as unpaid-leave placeholders.
    pub fn has_payable_salary(&self) -> bool {
        self.base_salary_usd > Decimal::ZERO
    }
}

/// The computed payroll breakdown in one currency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollOutput {
    /// Base salary.
    pub base_salary: Decimal,
    /// Allowance breakdown.
    pub allowances: Allowances,
    /// Sum of all allowances.
    pub total_allowances: Decimal,
    /// Overtime hours × hourly rate.
    pub overtime_amount: Decimal,
    /// End-of-service accrual.
    pub eos_accrual: Decimal,
    /// Exceptional additions.
    pub exceptional_additions: Decimal,
    /// Base + allowances + overtime + accrual + additions.
    pub gross_salary: Decimal,
    /// Deduction breakdown.
    pub deductions: Deductions,
    /// Sum of all deductions.
    pub total_deductions: Decimal,
    /// Gross minus deductions. May be negative.
    pub net_salary: Decimal,
}

impl PayrollOutput {
    /// Applies `f` to every amount, failing if any application fails.
    pub fn try_map(&self, f: impl Fn(Decimal) -> Option<Decimal>) -> Option<Self> {
        Some(Self {
            base_salary: f(self.base_salary)?,
            allowances: self.allowances.try_map(&f)?,
            total_allowances: f(self.total_allowances)?,
            overtime_amount: f(self.overtime_amount)?,
            eos_accrual: f(self.eos_accrual)?,
            exceptional_additions: f(self.exceptional_additions)?,
            gross_salary: f(self.gross_salary)?,
            deductions: self.deductions.try_map(&f)?,
            total_deductions: f(self.total_deductions)?,
            net_salary: f(self.net_salary)?,
        })
    }

    /// Returns a copy with every amount rounded to 2 decimal places,
    /// midpoint away from zero.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::PayrollOutput;
    /// use rust_decimal::Decimal;
    /// use std::str::FromStr;
    ///
    /// let output = PayrollOutput {
    ///     net_salary: Decimal::from_str("10.005").unwrap(),
    ///     ..PayrollOutput::default()
    /// };
    /// assert_eq!(output.rounded().net_salary, Decimal::from_str("10.01").unwrap());
    /// ```
    pub fn rounded(&self) -> Self {
        let round = |d: Decimal| {
            Some(d.round_dp_with_strategy(
                MONEY_DECIMAL_PLACES,
                RoundingStrategy::MidpointAwayFromZero,
            ))
        };
        // Rounding never fails, so the fallback is unreachable.
        self.try_map(round).unwrap_or(*self)
    }
}

/// A single step in the audit trail of a payroll calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The identifier of the formula that was applied.
    pub rule_id: String,
    /// The human-readable name of the formula.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the computation.
    pub reasoning: String,
}

/// The complete dual-currency result of one payroll calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollCalculation {
    /// Breakdown in USD, full precision.
    pub usd: PayrollOutput,
    /// Breakdown in TRY (USD × `rate_used`), full precision.
    #[serde(rename = "try")]
    pub try_: PayrollOutput,
    /// TRY per USD exchange rate, verbatim.
    pub rate_used: Decimal,
    /// Every formula applied, in order.
    pub audit_steps: Vec<AuditStep>,
}
