//! Health insurance contribution.
//!
//! Two schedule shapes exist: a flat percentage of gross with an optional
//! minimum, and a flat fee looked up by gross income band.

use rust_decimal::Decimal;

use crate::config::{HealthBand, HealthSchedule};
use crate::models::AuditStep;

use super::round_to_whole_unit;

/// The health contribution on a gross income, with its audit step.
#[derive(Debug, Clone)]
pub struct HealthResult {
    /// Contribution in whole currency units.
    pub amount: Decimal,
    /// Contribution before rounding.
    pub exact: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates the health contribution on `gross`.
///
/// Non-positive gross income contributes nothing; a percentage schedule's
/// minimum applies only to positive gross.
///
/// # Examples
///
/// ```
/// use payroll_ingest::calculation::calculate_health;
/// use payroll_ingest::config::HealthSchedule;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let dec = |s: &str| Decimal::from_str(s).unwrap();
/// let schedule = HealthSchedule::Percentage { rate: dec("0.0275"), minimum: Some(dec("300")) };
///
/// assert_eq!(calculate_health(dec("50000"), &schedule, 1).amount, dec("1375"));
/// assert_eq!(calculate_health(dec("5000"), &schedule, 1).amount, dec("300"));
/// ```
pub fn calculate_health(gross: Decimal, schedule: &HealthSchedule, step_number: u32) -> HealthResult {
    let (exact, amount, reasoning) = if gross <= Decimal::ZERO {
        (
            Decimal::ZERO,
            Decimal::ZERO,
            "No health contribution on non-positive gross".to_string(),
        )
    } else {
        match schedule {
            HealthSchedule::Percentage { rate, minimum } => {
                let floor = minimum.unwrap_or(Decimal::ZERO);
                let raw = gross * rate;
                let exact = raw.max(floor);
                let amount = round_to_whole_unit(raw).max(floor);
                let reasoning = if raw < floor {
                    format!(
                        "{} x {} = {} is below the minimum, charged {}",
                        gross.normalize(),
                        rate.normalize(),
                        raw.normalize(),
                        amount.normalize()
                    )
                } else {
                    format!(
                        "{} x {} = {}, rounded to {}",
                        gross.normalize(),
                        rate.normalize(),
                        raw.normalize(),
                        amount.normalize()
                    )
                };
                (exact, amount, reasoning)
            }
            HealthSchedule::Banded { bands } => {
                let fee = band_fee(gross, bands);
                let reasoning = format!(
                    "Gross {} falls in the band charging {}",
                    gross.normalize(),
                    fee.normalize()
                );
                (fee, fee, reasoning)
            }
        }
    };

    let schedule_type = match schedule {
        HealthSchedule::Percentage { .. } => "percentage",
        HealthSchedule::Banded { .. } => "banded",
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "health_contribution".to_string(),
        rule_name: "Health Insurance Contribution".to_string(),
        input: serde_json::json!({
            "gross": gross.normalize().to_string(),
            "schedule": schedule_type
        }),
        output: serde_json::json!({
            "amount": amount.normalize().to_string()
        }),
        reasoning,
    };

    HealthResult {
        amount,
        exact,
        audit_step,
    }
}

/// The fee of the first band whose upper bound covers `gross`. Gross above
/// every bound pays the last band's fee.
fn band_fee(gross: Decimal, bands: &[HealthBand]) -> Decimal {
    bands
        .iter()
        .find(|band| band.up_to.is_none_or(|up_to| gross <= up_to))
        .or(bands.last())
        .map(|band| band.amount)
        .unwrap_or(Decimal::ZERO)
}
