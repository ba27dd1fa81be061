//! The statutory deduction calculator.
//!
//! Combines the four statutory lines into a [`DeductionResult`]. Pension,
//! health and levy are computed on gross; whichever of them the ruleset marks
//! deductible are subtracted (unrounded) from gross to form the taxable base,
//! which then goes through the progressive tax schedule.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::config::Ruleset;
use crate::models::{AuditStep, DeductionBreakdown, DeductionResult};

use super::health_levy::calculate_health;
use super::housing_levy::calculate_housing_levy;
use super::pension::calculate_pension;
use super::progressive_tax::calculate_tax;

/// Calculates every statutory deduction on `gross` under `ruleset`.
///
/// Negative gross income is treated as zero and net pay never goes below
/// zero.
///
/// # Examples
///
/// ```no_run
/// use payroll_ingest::calculation::calculate;
/// use payroll_ingest::config::ConfigLoader;
/// use rust_decimal::Decimal;
///
/// let loader = ConfigLoader::load("config/ke").unwrap();
/// let ruleset = loader.ruleset("2024-12-27").unwrap();
///
/// let result = calculate(Decimal::from(100_000), ruleset);
/// assert_eq!(result.pension, Decimal::from(2160));
/// assert_eq!(result.net, result.gross - result.total_deductions);
/// ```
pub fn calculate(gross: Decimal, ruleset: &Ruleset) -> DeductionResult {
    calculate_with_audit(gross, ruleset).result
}

/// Calculates every statutory deduction on `gross`, recording one audit step
/// per statutory line followed by the net pay step.
pub fn calculate_with_audit(gross: Decimal, ruleset: &Ruleset) -> DeductionBreakdown {
    let gross = gross.max(Decimal::ZERO);
    let mut audit_steps: Vec<AuditStep> = Vec::with_capacity(5);

    let pension = calculate_pension(gross, &ruleset.pension, 1);
    audit_steps.push(pension.audit_step);

    let health = calculate_health(gross, &ruleset.health, 2);
    audit_steps.push(health.audit_step);

    let levy = calculate_housing_levy(gross, &ruleset.levy, 3);
    audit_steps.push(levy.audit_step);

    let deductible = &ruleset.tax.deductible;
    let mut pre_tax = Decimal::ZERO;
    if deductible.pension {
        pre_tax += pension.exact;
    }
    if deductible.health {
        pre_tax += health.exact;
    }
    if deductible.levy {
        pre_tax += levy.exact;
    }
    let taxable_base = (gross - pre_tax).max(Decimal::ZERO);

    let tax = calculate_tax(taxable_base, &ruleset.tax, 4);
    audit_steps.push(tax.audit_step);

    let total_deductions = tax.tax + pension.amount + health.amount + levy.amount;
    let net = (gross - total_deductions).max(Decimal::ZERO);

    audit_steps.push(AuditStep {
        step_number: 5,
        rule_id: "net_pay".to_string(),
        rule_name: "Net Pay".to_string(),
        input: serde_json::json!({
            "gross": gross.normalize().to_string(),
            "tax": tax.tax.normalize().to_string(),
            "pension": pension.amount.normalize().to_string(),
            "health": health.amount.normalize().to_string(),
            "levy": levy.amount.normalize().to_string()
        }),
        output: serde_json::json!({
            "total_deductions": total_deductions.normalize().to_string(),
            "net": net.normalize().to_string()
        }),
        reasoning: if gross - total_deductions < Decimal::ZERO {
            format!(
                "Deductions {} exceed gross {}, net pay floored at 0",
                total_deductions.normalize(),
                gross.normalize()
            )
        } else {
            format!(
                "{} - {} = {}",
                gross.normalize(),
                total_deductions.normalize(),
                net.normalize()
            )
        },
    });

    DeductionBreakdown {
        result: DeductionResult {
            ruleset_version: ruleset.version.clone(),
            gross,
            taxable_base,
            tax: tax.tax,
            pension: pension.amount,
            health: health.amount,
            levy: levy.amount,
            total_deductions,
            net,
        },
        audit_steps,
    }
}

/// Gross pay for a partial month: `monthly_salary / standard_hours *
/// worked_hours`, rounded to cents.
///
/// Non-positive standard hours or negative worked hours give zero. Returns
/// `None` when the arithmetic overflows.
pub fn checked_prorated_gross(
    monthly_salary: Decimal,
    standard_hours: Decimal,
    worked_hours: Decimal,
) -> Option<Decimal> {
    if standard_hours <= Decimal::ZERO || worked_hours < Decimal::ZERO {
        return Some(Decimal::ZERO);
    }
    monthly_salary
        .checked_div(standard_hours)?
        .checked_mul(worked_hours)
        .map(|gross| gross.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

/// Like [`checked_prorated_gross`], clamping an overflowing result to zero.
pub fn prorated_gross(monthly_salary: Decimal, standard_hours: Decimal, worked_hours: Decimal) -> Decimal {
    checked_prorated_gross(monthly_salary, standard_hours, worked_hours).unwrap_or(Decimal::ZERO)
}

/// Calculates deductions on the attendance-prorated gross of a monthly
/// salary.
pub fn calculate_prorated(
    monthly_salary: Decimal,
    standard_hours: Decimal,
    worked_hours: Decimal,
    ruleset: &Ruleset,
) -> DeductionResult {
    calculate(prorated_gross(monthly_salary, standard_hours, worked_hours), ruleset)
}
