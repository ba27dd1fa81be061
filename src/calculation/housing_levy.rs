//! Housing levy.

use rust_decimal::Decimal;

use crate::config::LevySchedule;
use crate::models::AuditStep;

use super::round_to_whole_unit;

/// The housing levy on a gross income, with its audit step.
#[derive(Debug, Clone)]
pub struct LevyResult {
    /// Levy in whole currency units.
    pub amount: Decimal,
    /// Levy before rounding.
    pub exact: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates the housing levy as a flat percentage of `gross`.
pub fn calculate_housing_levy(gross: Decimal, schedule: &LevySchedule, step_number: u32) -> LevyResult {
    let base = gross.max(Decimal::ZERO);
    let exact = base * schedule.rate;
    let amount = round_to_whole_unit(exact);

    let audit_step = AuditStep {
        step_number,
        rule_id: "housing_levy".to_string(),
        rule_name: "Housing Levy".to_string(),
        input: serde_json::json!({
            "gross": gross.normalize().to_string(),
            "rate": schedule.rate.normalize().to_string()
        }),
        output: serde_json::json!({
            "amount": amount.normalize().to_string()
        }),
        reasoning: format!(
            "{} x {} = {}, rounded to {}",
            base.normalize(),
            schedule.rate.normalize(),
            exact.normalize(),
            amount.normalize()
        ),
    };

    LevyResult {
        amount,
        exact,
        audit_step,
    }
}
