//! Outcome types for one ingestion run.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{CanonicalField, EmployeeRecord, RawRow};

/// Identifies the kind of issue an [`ExtractionWarning`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningCode {
    /// Pension contribution above the statutory cap.
    PensionAboveCap,
    /// Health contribution above the statutory cap.
    HealthAboveCap,
    /// Housing levy above the statutory cap.
    LevyAboveCap,
    /// Total deductions larger than gross income.
    DeductionsExceedGross,
    /// A mapped cell could not be coerced and was defaulted.
    UnparseableValue,
    /// Statutory amounts were estimated from gross income.
    EstimatedDeductions,
}

/// A non-fatal annotation attached to an extracted record.
///
/// Warnings never remove a record from the successful set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionWarning {
    /// The kind of warning.
    pub code: WarningCode,
    /// Human-readable description.
    pub message: String,
}

impl ExtractionWarning {
    /// Creates a new warning.
    pub fn new(code: WarningCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for ExtractionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// A source row that could not be confidently mapped to a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedRow {
    /// 1-based position of the row in the input; 0 when the failure covers
    /// the whole input.
    pub row_number: usize,
    /// The row exactly as received.
    pub row: RawRow,
    /// Why the row was not accepted.
    pub reason: String,
}

impl FailedRow {
    /// Reason used when the input yields nothing at all.
    pub const NO_DATA_FOUND: &'static str = "no data found";

    /// Creates a failure for a single input row.
    pub fn new(row_number: usize, row: &RawRow, reason: impl Into<String>) -> Self {
        Self {
            row_number,
            row: row.clone(),
            reason: reason.into(),
        }
    }

    /// Creates the failure that stands for an input with no usable data.
    pub fn no_data_found() -> Self {
        Self {
            row_number: 0,
            row: RawRow::new(),
            reason: Self::NO_DATA_FOUND.to_string(),
        }
    }
}

/// Why a row was deliberately passed over rather than mapped or failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Every cell in the row is blank.
    BlankRow,
    /// The first data row repeats the header labels.
    HeaderEcho,
    /// A row above a detected embedded header (titles, report banners).
    Preamble,
    /// The embedded header row itself.
    DetectedHeader,
}

/// A row that was classified as not carrying employee data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRow {
    /// 1-based position of the row in the input.
    pub row_number: usize,
    /// Why the row was skipped.
    pub reason: SkipReason,
}

/// The extraction strategy that produced an ingestion result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Column keys of the first row resolved as headers.
    HeaderMapping,
    /// A header row detected among the early rows' cell values.
    EmbeddedHeader,
    /// Header-free classification of cells by shape.
    PatternMatch,
}

/// One resolved column: which canonical field a column key feeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappedColumn {
    /// The canonical field.
    pub field: CanonicalField,
    /// The row key the values are read from.
    pub column: String,
    /// The header text that matched.
    pub header: String,
}

/// Everything one ingestion run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestionResult {
    /// Caller-supplied identifier, passed through untouched.
    pub source_name: String,
    /// The strategy whose outcome is reported; `None` when no strategy applied.
    pub strategy: Option<StrategyKind>,
    /// Columns resolved by the accepted strategy. Empty in pattern mode.
    pub column_mapping: Vec<MappedColumn>,
    /// Accepted records in input order.
    pub extracted_records: Vec<EmployeeRecord>,
    /// Rejected rows in input order.
    pub failed_rows: Vec<FailedRow>,
    /// Blank, echo and preamble rows in input order.
    pub skipped_rows: Vec<SkippedRow>,
}

impl IngestionResult {
    /// Returns counts of extracted, failed and skipped rows.
    pub fn summary(&self) -> IngestionSummary {
        IngestionSummary {
            extracted: self.extracted_records.len(),
            failed: self.failed_rows.len(),
            skipped: self.skipped_rows.len(),
        }
    }
}

/// Row counts for an ingestion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestionSummary {
    /// Number of records accepted.
    pub extracted: usize,
    /// Number of rows rejected.
    pub failed: usize,
    /// Number of rows skipped.
    pub skipped: usize,
}
