//! Statutory deduction calculation.
//!
//! One module per statutory line (progressive income tax, tiered pension,
//! health contribution, housing levy), each returning its amount together
//! with an audit step, and the calculator that combines them into a
//! [`DeductionResult`](crate::models::DeductionResult).

mod health_levy;
mod housing_levy;
mod pension;
mod progressive_tax;
mod statutory;

use rust_decimal::{Decimal, RoundingStrategy};

pub use health_levy::{HealthResult, calculate_health};
pub use housing_levy::{LevyResult, calculate_housing_levy};
pub use pension::{PensionResult, calculate_pension};
pub use progressive_tax::{TaxResult, calculate_tax};
pub use statutory::{
    calculate, calculate_prorated, calculate_with_audit, checked_prorated_gross, prorated_gross,
};

/// Rounds to the nearest whole currency unit, halves away from zero.
pub fn round_to_whole_unit(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}
