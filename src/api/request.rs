//! Request types for the payroll ingestion API.
//!
//! This module defines the JSON request structures for the `/ingest` and
//! `/deductions` endpoints.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::checked_prorated_gross;
use crate::config::{ConfigLoader, Ruleset};
use crate::error::{PayrollError, PayrollResult};
use crate::models::RawRow;

/// Request body for the `/ingest` endpoint.
///
/// Rows arrive already parsed from the spreadsheet; the API performs no file
/// transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestRequest {
    /// Identifier of the uploaded sheet, echoed in the result.
    pub source_name: String,
    /// Parsed rows in sheet order.
    pub rows: Vec<RawRow>,
    /// Ruleset whose caps the validator checks against.
    #[serde(default)]
    pub ruleset_version: Option<String>,
    /// Selects the ruleset effective on this date when no version is given.
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}

/// Request body for the `/deductions` endpoint.
///
/// Either `gross_income`, or all of `monthly_salary`, `standard_hours` and
/// `worked_hours` for the attendance-prorated calculation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeductionRequest {
    /// Gross income for the period.
    #[serde(default)]
    pub gross_income: Option<Decimal>,
    /// Full monthly salary, prorated by hours worked.
    #[serde(default)]
    pub monthly_salary: Option<Decimal>,
    /// Hours in a full month.
    #[serde(default)]
    pub standard_hours: Option<Decimal>,
    /// Hours actually worked.
    #[serde(default)]
    pub worked_hours: Option<Decimal>,
    /// Ruleset to calculate under.
    #[serde(default)]
    pub ruleset_version: Option<String>,
    /// Selects the ruleset effective on this date when no version is given.
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}

impl DeductionRequest {
    /// Resolves the gross income to calculate on.
    pub fn gross(&self) -> PayrollResult<Decimal> {
        let prorated = [self.monthly_salary, self.standard_hours, self.worked_hours];
        let given = prorated.iter().filter(|value| value.is_some()).count();

        match (self.gross_income, given) {
            (Some(gross), 0) => Ok(gross),
            (Some(_), _) => Err(invalid(
                "gross_income",
                "cannot be combined with monthly_salary, standard_hours or worked_hours",
            )),
            (None, 0) => Err(invalid(
                "gross_income",
                "required unless monthly_salary, standard_hours and worked_hours are given",
            )),
            (None, _) => match prorated {
                [Some(salary), Some(standard), Some(worked)] => {
                    checked_prorated_gross(salary, standard, worked)
                        .ok_or_else(|| invalid("monthly_salary", "prorated gross income is out of range"))
                }
                [None, ..] => Err(invalid("monthly_salary", "required with standard_hours and worked_hours")),
                [_, None, _] => Err(invalid("standard_hours", "required with monthly_salary")),
                _ => Err(invalid("worked_hours", "required with monthly_salary")),
            },
        }
    }
}

fn invalid(field: &str, message: &str) -> PayrollError {
    PayrollError::InvalidRequest {
        field: field.to_string(),
        message: message.to_string(),
    }
}

/// Picks the ruleset a request asks for.
///
/// An explicit version wins; otherwise the ruleset effective on `as_of`, or
/// on today's date when no date is given.
pub fn select_ruleset<'c>(
    config: &'c ConfigLoader,
    version: Option<&str>,
    as_of: Option<NaiveDate>,
) -> PayrollResult<&'c Ruleset> {
    match version {
        Some(version) => config.ruleset(version),
        None => config.ruleset_for(as_of.unwrap_or_else(|| Utc::now().date_naive())),
    }
}
