//! Progressive income tax.
//!
//! Taxable income is sliced across marginal bands from the lowest upward, each
//! slice taxed at its band's rate. Personal relief is subtracted from the sum
//! and the result floored at zero before rounding to a whole unit.

use rust_decimal::Decimal;

use crate::config::TaxSchedule;
use crate::models::AuditStep;

use super::round_to_whole_unit;

/// The income tax due on a taxable base, with its audit step.
#[derive(Debug, Clone)]
pub struct TaxResult {
    /// Tax due after relief, rounded to a whole unit.
    pub tax: Decimal,
    /// Tax before relief, unrounded.
    pub charged: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates income tax on `taxable_income`.
///
/// A negative taxable income is treated as zero.
///
/// # Examples
///
/// ```
/// use payroll_ingest::calculation::calculate_tax;
/// use payroll_ingest::config::{TaxBand, TaxSchedule, TaxableDeductions};
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let dec = |s: &str| Decimal::from_str(s).unwrap();
/// let schedule = TaxSchedule {
///     personal_relief: dec("2400"),
///     bands: vec![
///         TaxBand { width: Some(dec("24000")), rate: dec("0.10") },
///         TaxBand { width: Some(dec("8333")), rate: dec("0.25") },
///         TaxBand { width: None, rate: dec("0.30") },
///     ],
///     deductible: TaxableDeductions::default(),
/// };
///
/// let result = calculate_tax(dec("30000"), &schedule, 1);
/// assert_eq!(result.tax, dec("1500"));
/// ```
pub fn calculate_tax(taxable_income: Decimal, schedule: &TaxSchedule, step_number: u32) -> TaxResult {
    let taxable = taxable_income.max(Decimal::ZERO);
    let mut remaining = taxable;
    let mut charged = Decimal::ZERO;
    let mut slices = Vec::new();

    for band in &schedule.bands {
        if remaining <= Decimal::ZERO {
            break;
        }
        let slice = match band.width {
            Some(width) => remaining.min(width),
            None => remaining,
        };
        let slice_tax = slice * band.rate;
        charged += slice_tax;
        remaining -= slice;
        slices.push(serde_json::json!({
            "amount": slice.normalize().to_string(),
            "rate": band.rate.normalize().to_string(),
            "tax": slice_tax.normalize().to_string()
        }));
    }

    let relief = schedule.personal_relief;
    let tax = round_to_whole_unit((charged - relief).max(Decimal::ZERO));

    let reasoning = if charged <= relief {
        format!(
            "Band tax {} does not exceed personal relief {}, no tax due",
            charged.normalize(),
            relief.normalize()
        )
    } else {
        format!(
            "Band tax {} across {} band(s) less personal relief {} = {}",
            charged.normalize(),
            slices.len(),
            relief.normalize(),
            tax.normalize()
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "income_tax".to_string(),
        rule_name: "Progressive Income Tax".to_string(),
        input: serde_json::json!({
            "taxable_income": taxable.normalize().to_string(),
            "personal_relief": relief.normalize().to_string()
        }),
        output: serde_json::json!({
            "bands": slices,
            "charged": charged.normalize().to_string(),
            "tax": tax.normalize().to_string()
        }),
        reasoning,
    };

    TaxResult {
        tax,
        charged,
        audit_step,
    }
}
