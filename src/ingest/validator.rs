//! Plausibility checks on extracted records.

use rust_decimal::Decimal;

use crate::config::StatutoryCaps;
use crate::models::{CanonicalField, EmployeeRecord, ExtractionWarning, WarningCode};

/// Checks a record against statutory caps and basic consistency.
///
/// Every check is independent and only ever produces warnings; a record is
/// never rejected here. Total deductions are compared with gross income only
/// when gross income is positive.
///
/// # Example
///
/// ```
/// use payroll_ingest::config::StatutoryCaps;
/// use payroll_ingest::ingest::validate;
/// use payroll_ingest::models::{EmployeeRecord, WarningCode};
/// use rust_decimal::Decimal;
///
/// let caps = StatutoryCaps {
///     pension: Decimal::from(2160),
///     health: Decimal::from(30000),
///     levy: Decimal::from(15000),
/// };
/// let mut record = EmployeeRecord::new();
/// record.gross_income = Decimal::from(50000);
/// record.statutory_deductions.pension = Decimal::from(5000);
/// record.total_deductions = Decimal::from(5000);
///
/// let warnings = validate(&record, &caps);
/// assert_eq!(warnings.len(), 1);
/// assert_eq!(warnings[0].code, WarningCode::PensionAboveCap);
/// ```
pub fn validate(record: &EmployeeRecord, caps: &StatutoryCaps) -> Vec<ExtractionWarning> {
    let deductions = &record.statutory_deductions;
    let mut warnings = Vec::new();

    let cap_checks = [
        (
            CanonicalField::StatutoryPension,
            deductions.pension,
            caps.pension,
            WarningCode::PensionAboveCap,
        ),
        (
            CanonicalField::StatutoryHealth,
            deductions.health,
            caps.health,
            WarningCode::HealthAboveCap,
        ),
        (
            CanonicalField::StatutoryLevy,
            deductions.housing_levy,
            caps.levy,
            WarningCode::LevyAboveCap,
        ),
    ];

    for (field, amount, cap, code) in cap_checks {
        if amount > cap {
            warnings.push(ExtractionWarning::new(
                code,
                format!("{} {} exceeds statutory cap {}", field.path(), amount, cap),
            ));
        }
    }

    if record.gross_income > Decimal::ZERO && record.total_deductions > record.gross_income {
        warnings.push(ExtractionWarning::new(
            WarningCode::DeductionsExceedGross,
            format!(
                "totalDeductions {} exceeds grossIncome {}",
                record.total_deductions, record.gross_income
            ),
        ));
    }

    warnings
}
