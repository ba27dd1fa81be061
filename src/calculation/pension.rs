//! Tiered pension contribution.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::config::PensionSchedule;
use crate::models::AuditStep;

/// The pension contribution on a gross income, with its audit step.
#[derive(Debug, Clone)]
pub struct PensionResult {
    /// Contribution rounded to cents.
    pub amount: Decimal,
    /// Contribution before rounding.
    pub exact: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates the pension contribution on `gross`.
///
/// Each tier covers the next `width` of pensionable pay at its own rate.
/// Pay beyond the last tier attracts no contribution, so the amount is capped
/// at the sum of the tier maxima.
///
/// # Examples
///
/// ```
/// use payroll_ingest::calculation::calculate_pension;
/// use payroll_ingest::config::{PensionSchedule, PensionTier};
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let dec = |s: &str| Decimal::from_str(s).unwrap();
/// let schedule = PensionSchedule {
///     tiers: vec![
///         PensionTier { width: dec("6000"), rate: dec("0.06") },
///         PensionTier { width: dec("12000"), rate: dec("0.06") },
///     ],
/// };
///
/// assert_eq!(calculate_pension(dec("20000"), &schedule, 1).amount, dec("1080"));
/// ```
pub fn calculate_pension(gross: Decimal, schedule: &PensionSchedule, step_number: u32) -> PensionResult {
    let mut remaining = gross.max(Decimal::ZERO);
    let mut exact = Decimal::ZERO;
    let mut tiers = Vec::new();

    for tier in &schedule.tiers {
        let pensionable = remaining.min(tier.width);
        let contribution = pensionable * tier.rate;
        exact += contribution;
        remaining -= pensionable;
        tiers.push(serde_json::json!({
            "pensionable": pensionable.normalize().to_string(),
            "rate": tier.rate.normalize().to_string(),
            "contribution": contribution.normalize().to_string()
        }));
    }

    let amount = exact.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let tier_amounts: Vec<String> = tiers
        .iter()
        .filter_map(|tier| tier["contribution"].as_str().map(str::to_string))
        .collect();

    let audit_step = AuditStep {
        step_number,
        rule_id: "pension_contribution".to_string(),
        rule_name: "Tiered Pension Contribution".to_string(),
        input: serde_json::json!({
            "gross": gross.normalize().to_string()
        }),
        output: serde_json::json!({
            "tiers": tiers,
            "amount": amount.normalize().to_string()
        }),
        reasoning: format!(
            "Tier contributions {} = {}",
            tier_amounts.join(" + "),
            amount.normalize()
        ),
    };

    PensionResult {
        amount,
        exact,
        audit_step,
    }
}
