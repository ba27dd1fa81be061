//! Statutory deduction results and their audit trail.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The output of the statutory deduction calculator.
///
/// Every line is individually retrievable because downstream consumers
/// display each statutory item separately.
///
/// # Example
///
/// ```
/// use payroll_ingest::models::DeductionResult;
/// use rust_decimal::Decimal;
///
/// let zero = DeductionResult::zero("2024-12-27");
/// assert_eq!(zero.net, Decimal::ZERO);
/// assert_eq!(zero.total_deductions, Decimal::ZERO);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionResult {
    /// Version of the ruleset the amounts were computed under.
    pub ruleset_version: String,
    /// Gross income the calculation started from, clamped at zero.
    pub gross: Decimal,
    /// Income subject to progressive tax.
    pub taxable_base: Decimal,
    /// Income tax after personal relief.
    pub tax: Decimal,
    /// Pension contribution.
    pub pension: Decimal,
    /// Health insurance contribution.
    pub health: Decimal,
    /// Housing levy.
    pub levy: Decimal,
    /// Sum of the four statutory lines.
    pub total_deductions: Decimal,
    /// Gross less total deductions.
    pub net: Decimal,
}

impl DeductionResult {
    /// A result with every amount at zero.
    pub fn zero(ruleset_version: impl Into<String>) -> Self {
        Self {
            ruleset_version: ruleset_version.into(),
            gross: Decimal::ZERO,
            taxable_base: Decimal::ZERO,
            tax: Decimal::ZERO,
            pension: Decimal::ZERO,
            health: Decimal::ZERO,
            levy: Decimal::ZERO,
            total_deductions: Decimal::ZERO,
            net: Decimal::ZERO,
        }
    }
}

/// A single step in the audit trail recording one statutory rule.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A deduction result together with the audit steps that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionBreakdown {
    /// The computed amounts.
    pub result: DeductionResult,
    /// One step per statutory line, in calculation order.
    pub audit_steps: Vec<AuditStep>,
}
