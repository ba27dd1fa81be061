//! Cell-to-slot coercion.
//!
//! Coercion never fails: a value that cannot be read as the field's type is
//! stored as the type's default and reported through a warning.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::models::{
    CanonicalField, CellValue, EmployeeRecord, ExtractionWarning, FieldKind, WarningCode,
};

/// Currency markers tolerated in front of or behind an amount.
const CURRENCY_MARKERS: [&str; 3] = ["kshs", "ksh", "kes"];

/// Parses a monetary cell.
///
/// Thousands separators, spaces and a leading or trailing currency marker are
/// stripped before parsing. Returns `None` for anything that is not a number.
///
/// # Example
///
/// ```
/// use payroll_ingest::ingest::parse_money;
/// use payroll_ingest::models::CellValue;
/// use rust_decimal::Decimal;
///
/// assert_eq!(parse_money(&CellValue::from("45,000.50")), Some(Decimal::new(4500050, 2)));
/// assert_eq!(parse_money(&CellValue::from("KES 1 200")), Some(Decimal::from(1200)));
/// assert_eq!(parse_money(&CellValue::from("n/a")), None);
/// ```
pub fn parse_money(cell: &CellValue) -> Option<Decimal> {
    match cell {
        CellValue::Number(number) => Some(*number),
        CellValue::Text(text) => {
            let mut cleaned: String = text
                .chars()
                .filter(|c| !matches!(c, ',' | '_' | '\u{a0}') && !c.is_whitespace())
                .collect::<String>()
                .to_lowercase();
            for marker in CURRENCY_MARKERS {
                if let Some(rest) = cleaned.strip_prefix(marker) {
                    cleaned = rest.trim_start_matches('.').to_string();
                    break;
                }
                if let Some(rest) = cleaned.strip_suffix(marker) {
                    cleaned = rest.to_string();
                    break;
                }
            }
            if cleaned.is_empty() {
                return None;
            }
            Decimal::from_str(&cleaned).ok()
        }
        CellValue::Bool(_) | CellValue::Empty => None,
    }
}

/// Parses a flag cell: `true`, `yes` and `1` (any case) are true, everything
/// else is false.
pub fn parse_flag(cell: &CellValue) -> bool {
    match cell {
        CellValue::Bool(flag) => *flag,
        CellValue::Number(number) => *number == Decimal::ONE,
        CellValue::Text(text) => {
            matches!(text.trim().to_lowercase().as_str(), "true" | "yes" | "1")
        }
        CellValue::Empty => false,
    }
}

/// Writes `cell` into the record slot for `field`, coercing to the field's
/// type.
///
/// Returns a warning when a monetary value could not be parsed; the slot is
/// then left at zero.
pub fn apply_cell(
    record: &mut EmployeeRecord,
    field: CanonicalField,
    cell: &CellValue,
) -> Option<ExtractionWarning> {
    match field.kind() {
        FieldKind::PersonName => {
            record.apply_full_name(&cell.as_text());
            None
        }
        FieldKind::Flag => {
            record.set_flag(field, parse_flag(cell));
            None
        }
        FieldKind::Money => match parse_money(cell) {
            Some(amount) => {
                record.set_money(field, amount);
                None
            }
            None => {
                record.set_money(field, Decimal::ZERO);
                Some(ExtractionWarning::new(
                    WarningCode::UnparseableValue,
                    format!(
                        "{}: could not read '{}' as an amount, defaulted to 0",
                        field.path(),
                        cell.as_text()
                    ),
                ))
            }
        },
        FieldKind::Text => {
            record.set_text(field, &cell.as_text());
            None
        }
    }
}
