//! Header-free extraction by cell shape.
//!
//! The last-resort strategy. Rows are accepted only when they hold a
//! name-shaped cell and a numeric cell; remaining cells are claimed in a fixed
//! priority order. Statutory amounts are estimated from gross income because
//! no deduction columns can be identified in this mode.

use std::collections::BTreeSet;

use rust_decimal::Decimal;

use crate::calculation::round_to_whole_unit;
use crate::config::{EstimateRatios, IngestSettings, StatutoryCaps};
use crate::models::{
    CanonicalField, CellValue, EmployeeRecord, ExtractionWarning, FailedRow, RawRow, SkipReason,
    StatutoryDeductions, WarningCode,
};

use super::aliases::AliasSet;
use super::patterns::{
    amount_value, digit_string, is_numeric, looks_like_national_id, looks_like_pension_number,
    looks_like_person_name, looks_like_salary, looks_like_tax_pin,
};
use super::transformer::TransformOutcome;
use super::validator::validate;

/// Placeholder statutory amounts derived from gross income.
///
/// Each amount is rounded to a whole unit. Pension and health are held at
/// their statutory caps.
///
/// # Example
///
/// ```
/// use payroll_ingest::config::{EstimateRatios, StatutoryCaps};
/// use payroll_ingest::ingest::estimate_deductions;
/// use rust_decimal::Decimal;
///
/// let caps = StatutoryCaps {
///     pension: Decimal::from(2160),
///     health: Decimal::from(30000),
///     levy: Decimal::from(15000),
/// };
/// let estimate = estimate_deductions(Decimal::from(200000), &EstimateRatios::default(), &caps);
/// assert_eq!(estimate.tax, Decimal::from(60000));
/// assert_eq!(estimate.pension, Decimal::from(2160));
/// ```
pub fn estimate_deductions(
    gross: Decimal,
    ratios: &EstimateRatios,
    caps: &StatutoryCaps,
) -> StatutoryDeductions {
    let portion = |rate: Decimal| {
        gross
            .checked_mul(rate)
            .map_or(Decimal::ZERO, |amount| round_to_whole_unit(amount).max(Decimal::ZERO))
    };

    StatutoryDeductions {
        tax: portion(ratios.tax_rate),
        pension: portion(ratios.pension_rate).min(caps.pension),
        health: portion(ratios.health_rate).min(caps.health),
        housing_levy: portion(ratios.levy_rate),
    }
}

/// Extracts records from rows without relying on headers.
#[derive(Debug, Clone, Copy)]
pub struct PatternExtractor<'a> {
    aliases: &'a AliasSet,
    caps: &'a StatutoryCaps,
    settings: &'a IngestSettings,
}

impl<'a> PatternExtractor<'a> {
    /// Creates an extractor.
    pub fn new(aliases: &'a AliasSet, caps: &'a StatutoryCaps, settings: &'a IngestSettings) -> Self {
        Self {
            aliases,
            caps,
            settings,
        }
    }

    /// Classifies every row. Blank rows are skipped; every other row becomes
    /// a record or a failure.
    pub fn extract(&self, rows: &[RawRow]) -> TransformOutcome {
        let mut outcome = TransformOutcome::default();

        for (index, row) in rows.iter().enumerate() {
            let row_number = index + 1;
            if row.is_blank() {
                outcome.skip(row_number, SkipReason::BlankRow);
                continue;
            }
            match self.classify_row(row) {
                Ok(record) => outcome.records.push(record),
                Err(reason) => outcome.failed.push(FailedRow::new(row_number, row, reason)),
            }
        }

        outcome
    }

    /// Builds one record from cell shapes, or explains the shortfall.
    ///
    /// Claim order: full name, tax PIN, national ID (the longest digit
    /// string of five or more digits), gross income, pension number. Gross
    /// income prefers an amount-shaped cell above 1000 and otherwise takes
    /// the last remaining digit string above 1000; it is claimed before the
    /// pension number so that a five-digit salary is not read as a
    /// membership number.
    ///
    /// Whole-number cells count as digit strings too. A number cell is taken
    /// as the national ID only when some other cell could still supply the
    /// gross income.
    pub fn classify_row(&self, row: &RawRow) -> Result<EmployeeRecord, String> {
        let cells: Vec<&CellValue> = row.values().filter(|cell| !cell.is_blank()).collect();

        let name_index = cells
            .iter()
            .position(|cell| looks_like_person_name(cell, self.aliases));
        let has_number = cells.iter().any(|cell| is_numeric(cell));
        let name_index = match (name_index, has_number) {
            (Some(index), true) => index,
            (None, true) => return Err("no name-shaped cell".to_string()),
            (Some(_), false) => return Err("no purely numeric cell".to_string()),
            (None, false) => return Err("no name-shaped cell and no numeric cell".to_string()),
        };

        let mut record = EmployeeRecord::new();
        let mut claimed = vec![false; cells.len()];
        let mut recognised = 0;

        record.apply_full_name(&cells[name_index].as_text());
        claimed[name_index] = true;
        recognised += 1;

        if let Some(index) = (0..cells.len()).find(|i| !claimed[*i] && looks_like_tax_pin(cells[*i])) {
            record.set_text(CanonicalField::TaxPin, &cells[index].as_text());
            claimed[index] = true;
            recognised += 1;
        }

        let mut national_id: Option<(usize, usize)> = None;
        for index in (0..cells.len()).filter(|i| !claimed[*i]) {
            let Some(digits) = digit_string(cells[index]).filter(|d| looks_like_national_id(d)) else {
                continue;
            };
            // A number cell is only an ID while another cell can still be gross.
            if matches!(cells[index], CellValue::Number(_))
                && !(0..cells.len()).any(|other| {
                    other != index && !claimed[other] && salary_value(cells[other]).is_some()
                })
            {
                continue;
            }
            if national_id.is_none_or(|(_, longest)| digits.len() > longest) {
                national_id = Some((index, digits.len()));
            }
        }
        if let Some((index, _)) = national_id {
            record.set_text(CanonicalField::NationalId, &cells[index].as_text());
            claimed[index] = true;
            recognised += 1;
        }

        let gross = self.claim_gross(&cells, &mut claimed);
        if let Some(gross) = gross {
            record.gross_income = gross;
            recognised += 1;
        }

        if let Some(index) = (0..cells.len()).find(|i| {
            !claimed[*i] && digit_string(cells[*i]).is_some_and(|d| looks_like_pension_number(&d))
        }) {
            record.set_text(CanonicalField::PensionNumber, &cells[index].as_text());
            claimed[index] = true;
            recognised += 1;
        }

        let min = self.settings.min_mapped_fields;
        if recognised < min {
            return Err(format!(
                "only {} field(s) recognised by pattern matching (minimum {})",
                recognised, min
            ));
        }

        if let Some(gross) = gross {
            record.statutory_deductions =
                estimate_deductions(gross, &self.settings.estimates, self.caps);
            record.warnings.push(ExtractionWarning::new(
                WarningCode::EstimatedDeductions,
                format!(
                    "statutoryDeductions estimated from grossIncome {} (no deduction columns identified)",
                    gross
                ),
            ));
        }

        record.derive_missing(&BTreeSet::new(), self.settings.advance_ratio);
        let warnings = validate(&record, self.caps);
        record.warnings.extend(warnings);
        Ok(record)
    }

    fn claim_gross(&self, cells: &[&CellValue], claimed: &mut [bool]) -> Option<Decimal> {
        let amount = (0..cells.len()).find_map(|i| {
            if claimed[i] {
                return None;
            }
            amount_value(cells[i])
                .filter(|value| looks_like_salary(*value))
                .map(|value| (i, value))
        });

        let found = amount.or_else(|| {
            (0..cells.len()).rev().find_map(|i| {
                if claimed[i] {
                    return None;
                }
                digit_salary(cells[i]).map(|value| (i, value))
            })
        });

        let (index, value) = found?;
        claimed[index] = true;
        Some(value)
    }
}

/// A digit string without a leading zero read as a salary.
fn digit_salary(cell: &CellValue) -> Option<Decimal> {
    digit_string(cell)
        .filter(|digits| !digits.starts_with('0'))
        .and_then(|digits| digits.parse::<Decimal>().ok())
        .filter(|value| looks_like_salary(*value))
}

/// Any reading of a cell as a salary.
fn salary_value(cell: &CellValue) -> Option<Decimal> {
    amount_value(cell)
        .filter(|value| looks_like_salary(*value))
        .or_else(|| digit_salary(cell))
}
