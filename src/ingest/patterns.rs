//! Cell shape classifiers used when no headers can be trusted.
//!
//! Each classifier answers one yes/no question about a single cell. They
//! carry no confidence score; the extractor composes them in priority order.

use std::borrow::Cow;

use regex::Regex;
use rust_decimal::Decimal;

use crate::models::CellValue;

use super::aliases::AliasSet;
use super::coerce::parse_money;

lazy_static::lazy_static! {
    // Two or more capitalised words
    static ref PERSON_NAME_RE: Regex =
        Regex::new(r"^[A-Z][A-Za-z'.\-]*(?:\s+[A-Z][A-Za-z'.\-]*)+$").unwrap();
    // One letter, nine digits, one letter
    static ref TAX_PIN_RE: Regex = Regex::new(r"^[A-Za-z]\d{9}[A-Za-z]$").unwrap();
    static ref DIGITS_RE: Regex = Regex::new(r"^\d+$").unwrap();
    // Grouped thousands or a fractional part
    static ref AMOUNT_RE: Regex =
        Regex::new(r"^(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d+)?$|^\d+\.\d+$").unwrap();
}

/// Returns true for text shaped like a person's name: two or more
/// capitalised words that are not themselves a known header label.
pub fn looks_like_person_name(cell: &CellValue, aliases: &AliasSet) -> bool {
    let CellValue::Text(text) = cell else {
        return false;
    };
    let text = text.trim();
    PERSON_NAME_RE.is_match(text) && !aliases.is_known_alias(text)
}

/// Returns true for text matching the tax PIN shape, e.g. `A123456789Z`.
pub fn looks_like_tax_pin(cell: &CellValue) -> bool {
    matches!(cell, CellValue::Text(text) if TAX_PIN_RE.is_match(text.trim()))
}

/// Returns the digits of a cell that could hold an identifier: text made
/// only of digits, or a non-negative whole number.
pub fn digit_string(cell: &CellValue) -> Option<Cow<'_, str>> {
    match cell {
        CellValue::Text(text) if DIGITS_RE.is_match(text.trim()) => Some(Cow::Borrowed(text.trim())),
        CellValue::Number(number) if number.fract().is_zero() && !number.is_sign_negative() => {
            Some(Cow::Owned(number.trunc().normalize().to_string()))
        }
        _ => None,
    }
}

/// Returns true for a digit string of at least five digits.
pub fn looks_like_national_id(digits: &str) -> bool {
    digits.len() >= 5
}

/// Returns true for a digit string of four to six digits.
pub fn looks_like_pension_number(digits: &str) -> bool {
    (4..=6).contains(&digits.len())
}

/// Returns the value of a cell shaped like a money amount: a numeric cell,
/// or text with grouped thousands or a fractional part.
pub fn amount_value(cell: &CellValue) -> Option<Decimal> {
    match cell {
        CellValue::Number(number) => Some(*number),
        CellValue::Text(text) => {
            let text = text.trim();
            if AMOUNT_RE.is_match(text) && !DIGITS_RE.is_match(text) {
                parse_money(cell)
            } else {
                None
            }
        }
        CellValue::Bool(_) | CellValue::Empty => None,
    }
}

/// Returns true for a cell that is purely numeric: a number, a digit string
/// or an amount.
pub fn is_numeric(cell: &CellValue) -> bool {
    digit_string(cell).is_some() || amount_value(cell).is_some()
}

/// Returns true for a value large enough to be a monthly salary.
pub fn looks_like_salary(value: Decimal) -> bool {
    value > Decimal::ONE_THOUSAND
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_person_name_shape() {
        let aliases = AliasSet::builtin();
        assert!(looks_like_person_name(&CellValue::from("Jane Doe"), &aliases));
        assert!(looks_like_person_name(&CellValue::from("MARY W. NJOROGE"), &aliases));
        assert!(looks_like_person_name(&CellValue::from("Peter O'Neil-Kamau"), &aliases));
        assert!(!looks_like_person_name(&CellValue::from("Jane"), &aliases));
        assert!(!looks_like_person_name(&CellValue::from("jane doe"), &aliases));
        assert!(!looks_like_person_name(&CellValue::from("Jane 2 Doe"), &aliases));
        assert!(!looks_like_person_name(&CellValue::from("Gross Pay"), &aliases));
        assert!(!looks_like_person_name(&CellValue::number(5), &aliases));
    }

    #[test]
    fn test_tax_pin_shape() {
        assert!(looks_like_tax_pin(&CellValue::from("A123456789Z")));
        assert!(looks_like_tax_pin(&CellValue::from(" p051234567k ")));
        assert!(!looks_like_tax_pin(&CellValue::from("A12345678Z")));
        assert!(!looks_like_tax_pin(&CellValue::from("1234567890")));
    }

    #[test]
    fn test_digit_strings() {
        assert_eq!(digit_string(&CellValue::from(" 0023456 ")).as_deref(), Some("0023456"));
        assert_eq!(digit_string(&CellValue::from("12a")), None);
        assert_eq!(digit_string(&CellValue::number(23456789)).as_deref(), Some("23456789"));
        assert_eq!(digit_string(&CellValue::Number(dec("12345.00"))).as_deref(), Some("12345"));
        assert_eq!(digit_string(&CellValue::Number(dec("12345.50"))), None);
        assert_eq!(digit_string(&CellValue::number(-12345)), None);
        assert!(looks_like_national_id("12345"));
        assert!(!looks_like_national_id("1234"));
        assert!(looks_like_pension_number("1234"));
        assert!(looks_like_pension_number("123456"));
        assert!(!looks_like_pension_number("1234567"));
    }

    #[test]
    fn test_amount_values() {
        assert_eq!(amount_value(&CellValue::number(45000)), Some(dec("45000")));
        assert_eq!(amount_value(&CellValue::from("45,000")), Some(dec("45000")));
        assert_eq!(amount_value(&CellValue::from("45000.00")), Some(dec("45000.00")));
        assert_eq!(amount_value(&CellValue::from("45000")), None);
        assert_eq!(amount_value(&CellValue::from("4,50")), None);
    }

    #[test]
    fn test_numeric_cells() {
        assert!(is_numeric(&CellValue::from("45000")));
        assert!(is_numeric(&CellValue::from("1,200.50")));
        assert!(is_numeric(&CellValue::number(7)));
        assert!(!is_numeric(&CellValue::from("A123456789Z")));
        assert!(!is_numeric(&CellValue::Empty));
    }

    #[test]
    fn test_salary_threshold() {
        assert!(looks_like_salary(dec("1000.01")));
        assert!(!looks_like_salary(dec("1000")));
    }
}
