//! Error types for the payroll ingestion engine.
//!
//! Ingestion and deduction calculation never fail on malformed input; rows
//! that cannot be mapped are reported as data. The errors in this module
//! cover configuration loading, ruleset selection and the HTTP layer.

use chrono::NaiveDate;
use thiserror::Error;

/// The main error type for the payroll ingestion engine.
///
/// # Example
///
/// ```
/// use payroll_ingest::error::PayrollError;
///
/// let error = PayrollError::RulesetNotFound {
///     version: "2019-01-01".to_string(),
/// };
/// assert_eq!(error.to_string(), "Statutory ruleset not found: 2019-01-01");
/// ```
#[derive(Debug, Error)]
pub enum PayrollError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// No ruleset with the requested version is loaded.
    #[error("Statutory ruleset not found: {version}")]
    RulesetNotFound {
        /// The requested ruleset version.
        version: String,
    },

    /// No loaded ruleset is effective on the requested date.
    #[error("No statutory ruleset effective on {date}")]
    NoRulesetForDate {
        /// The date for which a ruleset was requested.
        date: NaiveDate,
    },

    /// A ruleset was loaded but its contents are inconsistent.
    #[error("Invalid ruleset '{version}': {message}")]
    InvalidRuleset {
        /// The version of the offending ruleset.
        version: String,
        /// A description of what made the ruleset invalid.
        message: String,
    },

    /// A request to the HTTP layer was structurally valid JSON but unusable.
    #[error("Invalid request field '{field}': {message}")]
    InvalidRequest {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },
}

/// A type alias for Results that return PayrollError.
pub type PayrollResult<T> = Result<T, PayrollError>;
