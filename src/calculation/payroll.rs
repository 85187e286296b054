//! Payroll calculation functionality.
//!
//! Computes the USD breakdown of one employee's monthly payroll and converts
//! it element-wise to TRY. Arithmetic keeps full decimal precision; rounding to
//! 2 decimal places happens only when values are presented or stored.
//!
//! ## Formulas
//!
//! ```text
//! total_allowances = admin + education + housing + transport
//!                  + cost_of_living + children + special + fuel
//! overtime_amount  = overtime_hours × hourly_rate_usd
//! gross_salary     = base_salary + total_allowances + overtime_amount
//!                  + eos_accrual + exceptional_additions
//! total_deductions = loan_penalty + payment + other
//! net_salary       = gross_salary − total_deductions
//! try.*            = usd.* × rate
//! ```

use rust_decimal::Decimal;
use serde_json::json;

use crate::error::RowError;
use crate::models::{AuditStep, PayrollCalculation, PayrollInputs, PayrollOutput};

/// Calculates the dual-currency payroll for one employee.
///
/// `exchange_rate` is TRY per USD and must be positive. A negative net salary
/// is a valid result and is returned as-is.
///
/// # Errors
///
/// - [`RowError::InvalidExchangeRate`] if `exchange_rate <= 0`
/// - [`RowError::CalculationOverflow`] if any step exceeds decimal precision
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::calculate_payroll;
/// use payroll_engine::models::PayrollInputs;
/// use rust_decimal::Decimal;
///
/// let inputs = PayrollInputs {
///     employee_no: "001".to_string(),
///     full_name: "Sami Khalil".to_string(),
///     base_salary_usd: Decimal::from(1000),
///     overtime_hours: Decimal::from(10),
///     hourly_rate_usd: Decimal::from(5),
///     ..PayrollInputs::default()
/// };
///
/// let result = calculate_payroll(&inputs, Decimal::from(30)).unwrap();
/// assert_eq!(result.usd.gross_salary, Decimal::from(1050));
/// assert_eq!(result.usd.net_salary, Decimal::from(1050));
/// assert_eq!(result.try_.net_salary, Decimal::from(31500));
/// ```
pub fn calculate_payroll(
    inputs: &PayrollInputs,
    exchange_rate: Decimal,
) -> Result<PayrollCalculation, RowError> {
    if exchange_rate <= Decimal::ZERO {
        return Err(RowError::InvalidExchangeRate {
            rate: exchange_rate,
        });
    }

    let mut audit_steps = Vec::with_capacity(6);

    let total_allowances = checked_sum(
        inputs.allowances.components().iter().map(|(_, amount)| *amount),
        "total_allowances",
    )?;
    audit_steps.push(AuditStep {
        step_number: 1,
        rule_id: "total_allowances".to_string(),
        rule_name: "Total Allowances".to_string(),
        input: json!(components_json(&inputs.allowances.components())),
        output: json!({ "total_allowances": total_allowances.normalize().to_string() }),
        reasoning: format!(
            "Sum of {} allowance components = ${}",
            inputs.allowances.components().len(),
            total_allowances.normalize()
        ),
    });

    let overtime_amount = inputs
        .overtime_hours
        .checked_mul(inputs.hourly_rate_usd)
        .ok_or_else(|| overflow("overtime_amount"))?;
    audit_steps.push(AuditStep {
        step_number: 2,
        rule_id: "overtime_amount".to_string(),
        rule_name: "Overtime Amount".to_string(),
        input: json!({
            "overtime_hours": inputs.overtime_hours.normalize().to_string(),
            "hourly_rate_usd": inputs.hourly_rate_usd.normalize().to_string()
        }),
        output: json!({ "overtime_amount": overtime_amount.normalize().to_string() }),
        reasoning: format!(
            "{} hours × ${} = ${}",
            inputs.overtime_hours.normalize(),
            inputs.hourly_rate_usd.normalize(),
            overtime_amount.normalize()
        ),
    });

    let gross_salary = checked_sum(
        [
            inputs.base_salary_usd,
            total_allowances,
            overtime_amount,
            inputs.eos_accrual_usd,
            inputs.exceptional_additions_usd,
        ],
        "gross_salary",
    )?;
    audit_steps.push(AuditStep {
        step_number: 3,
        rule_id: "gross_salary".to_string(),
        rule_name: "Gross Salary".to_string(),
        input: json!({
            "base_salary": inputs.base_salary_usd.normalize().to_string(),
            "total_allowances": total_allowances.normalize().to_string(),
            "overtime_amount": overtime_amount.normalize().to_string(),
            "eos_accrual": inputs.eos_accrual_usd.normalize().to_string(),
            "exceptional_additions": inputs.exceptional_additions_usd.normalize().to_string()
        }),
        output: json!({ "gross_salary": gross_salary.normalize().to_string() }),
        reasoning: format!(
            "${} base + ${} allowances + ${} overtime + ${} EOS accrual + ${} exceptional = ${}",
            inputs.base_salary_usd.normalize(),
            total_allowances.normalize(),
            overtime_amount.normalize(),
            inputs.eos_accrual_usd.normalize(),
            inputs.exceptional_additions_usd.normalize(),
            gross_salary.normalize()
        ),
    });

    let total_deductions = checked_sum(
        inputs.deductions.components().iter().map(|(_, amount)| *amount),
        "total_deductions",
    )?;
    audit_steps.push(AuditStep {
        step_number: 4,
        rule_id: "total_deductions".to_string(),
        rule_name: "Total Deductions".to_string(),
        input: json!(components_json(&inputs.deductions.components())),
        output: json!({ "total_deductions": total_deductions.normalize().to_string() }),
        reasoning: format!(
            "Sum of {} deduction components = ${}",
            inputs.deductions.components().len(),
            total_deductions.normalize()
        ),
    });

    let net_salary = gross_salary
        .checked_sub(total_deductions)
        .ok_or_else(|| overflow("net_salary"))?;
    let net_reasoning = if net_salary < Decimal::ZERO {
        format!(
            "${} gross − ${} deductions = ${} (negative net salary, review required)",
            gross_salary.normalize(),
            total_deductions.normalize(),
            net_salary.normalize()
        )
    } else {
        format!(
            "${} gross − ${} deductions = ${}",
            gross_salary.normalize(),
            total_deductions.normalize(),
            net_salary.normalize()
        )
    };
    audit_steps.push(AuditStep {
        step_number: 5,
        rule_id: "net_salary".to_string(),
        rule_name: "Net Salary".to_string(),
        input: json!({
            "gross_salary": gross_salary.normalize().to_string(),
            "total_deductions": total_deductions.normalize().to_string()
        }),
        output: json!({ "net_salary": net_salary.normalize().to_string() }),
        reasoning: net_reasoning,
    });

    let usd = PayrollOutput {
        base_salary: inputs.base_salary_usd,
        allowances: inputs.allowances,
        total_allowances,
        overtime_amount,
        eos_accrual: inputs.eos_accrual_usd,
        exceptional_additions: inputs.exceptional_additions_usd,
        gross_salary,
        deductions: inputs.deductions,
        total_deductions,
        net_salary,
    };

    let try_ = usd
        .try_map(|amount| amount.checked_mul(exchange_rate))
        .ok_or_else(|| overflow("currency_conversion"))?;
    audit_steps.push(AuditStep {
        step_number: 6,
        rule_id: "currency_conversion".to_string(),
        rule_name: "Currency Conversion".to_string(),
        input: json!({
            "net_salary_usd": net_salary.normalize().to_string(),
            "rate": exchange_rate.normalize().to_string()
        }),
        output: json!({ "net_salary_try": try_.net_salary.normalize().to_string() }),
        reasoning: format!(
            "Every USD amount × {} TRY/USD; net ${} = ₺{}",
            exchange_rate.normalize(),
            net_salary.normalize(),
            try_.net_salary.normalize()
        ),
    });

    Ok(PayrollCalculation {
        usd,
        try_,
        rate_used: exchange_rate,
        audit_steps,
    })
}

fn checked_sum(
    values: impl IntoIterator<Item = Decimal>,
    step: &str,
) -> Result<Decimal, RowError> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, value| acc.checked_add(value))
        .ok_or_else(|| overflow(step))
}

fn overflow(step: &str) -> RowError {
    RowError::CalculationOverflow {
        step: step.to_string(),
    }
}

fn components_json(components: &[(&'static str, Decimal)]) -> serde_json::Map<String, serde_json::Value> {
    components
        .iter()
        .map(|(name, amount)| (name.to_string(), json!(amount.normalize().to_string())))
        .collect()
}
