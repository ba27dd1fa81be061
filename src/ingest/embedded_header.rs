//! Detection of header rows embedded among the data.
//!
//! Sheets exported with report banners or without a header line arrive with
//! placeholder column keys and the real header text somewhere in the first
//! few rows' cell values.

use crate::models::{CellValue, FailedRow, RawRow, SkipReason, SkippedRow};

use super::mapping::ColumnMapping;
use super::resolver::HeaderResolver;
use super::transformer::{RowTransformer, TransformOutcome};

/// Finds an embedded header row and maps the rows below it.
///
/// # Example
///
/// ```
/// use payroll_ingest::config::{IngestSettings, StatutoryCaps};
/// use payroll_ingest::ingest::{AliasSet, EmbeddedHeaderTransformer, RowTransformer};
/// use payroll_ingest::models::RawRow;
/// use rust_decimal::Decimal;
///
/// let aliases = AliasSet::builtin();
/// let settings = IngestSettings::default();
/// let caps = StatutoryCaps {
///     pension: Decimal::from(2160),
///     health: Decimal::from(30000),
///     levy: Decimal::from(15000),
/// };
/// let fallback = EmbeddedHeaderTransformer::new(RowTransformer::new(&aliases, &caps, &settings));
///
/// let sheet: Vec<RawRow> = vec![
///     [("__EMPTY", "ACME Ltd payroll"), ("__EMPTY_1", ""), ("__EMPTY_2", "")].into_iter().collect(),
///     [("__EMPTY", "Staff No"), ("__EMPTY_1", "Name"), ("__EMPTY_2", "Gross Pay")].into_iter().collect(),
///     [("__EMPTY", "E001"), ("__EMPTY_1", "Jane Doe"), ("__EMPTY_2", "60,000")].into_iter().collect(),
/// ];
///
/// assert_eq!(fallback.detect_header_row(&sheet), Some(1));
/// let outcome = fallback.detect_and_transform(&sheet).unwrap();
/// assert_eq!(outcome.records.len(), 1);
/// assert_eq!(outcome.records[0].employee_number, "E001");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct EmbeddedHeaderTransformer<'a> {
    transformer: RowTransformer<'a>,
}

impl<'a> EmbeddedHeaderTransformer<'a> {
    /// Wraps the transformer that maps the rows below the detected header.
    pub fn new(transformer: RowTransformer<'a>) -> Self {
        Self { transformer }
    }

    /// Returns true when the first row's own column keys already resolve to
    /// fields. Such sheets belong to plain header mapping.
    pub fn keys_resolve(&self, rows: &[RawRow]) -> bool {
        !self.transformer.header_mapping(rows).is_empty()
    }

    /// Returns the index of the header row among the first scanned rows.
    ///
    /// The first row with at least two header-like cells wins; failing that,
    /// the first row with any header-like cell.
    pub fn detect_header_row(&self, rows: &[RawRow]) -> Option<usize> {
        let scan = self.transformer.settings().header_scan_rows;
        let counts: Vec<usize> = rows
            .iter()
            .take(scan)
            .map(|row| self.header_like_cells(row))
            .collect();

        counts
            .iter()
            .position(|count| *count >= 2)
            .or_else(|| counts.iter().position(|count| *count >= 1))
    }

    fn header_like_cells(&self, row: &RawRow) -> usize {
        let aliases = self.transformer.aliases();
        row.values()
            .filter(|cell| matches!(cell, CellValue::Text(_)))
            .filter(|cell| aliases.resembles_field_name(&cell.as_text()))
            .count()
    }

    /// Builds a mapping from the cell values of the header row.
    pub fn header_mapping(&self, header_row: &RawRow) -> ColumnMapping {
        let headers: Vec<(String, String)> = header_row
            .cells()
            .filter(|(_, cell)| matches!(cell, CellValue::Text(_)) && !cell.is_blank())
            .map(|(key, cell)| (key.to_string(), cell.as_text()))
            .collect();
        let resolver = HeaderResolver::new(self.transformer.aliases());
        ColumnMapping::build(&resolver, &headers)
    }

    /// Detects the header row and maps every row after it.
    ///
    /// Rows above the header are skipped as preamble and the header row as
    /// the detected header. When fewer than the minimum number of fields map,
    /// every non-blank row below the header fails. Returns `None` when no
    /// header row is found.
    pub fn detect_and_transform(&self, rows: &[RawRow]) -> Option<TransformOutcome> {
        let header_index = self.detect_header_row(rows)?;
        let mapping = self.header_mapping(&rows[header_index]);
        let data = &rows[header_index + 1..];
        let first_data_row = header_index + 2;

        let mut outcome = if mapping.len() < self.transformer.settings().min_mapped_fields {
            self.reject_all(data, first_data_row, &mapping)
        } else {
            self.transformer.transform_rows(data, first_data_row, &mapping)
        };

        let mut skipped = Vec::with_capacity(header_index + 1 + outcome.skipped.len());
        for (index, row) in rows[..header_index].iter().enumerate() {
            let reason = if row.is_blank() {
                SkipReason::BlankRow
            } else {
                SkipReason::Preamble
            };
            skipped.push(SkippedRow {
                row_number: index + 1,
                reason,
            });
        }
        skipped.push(SkippedRow {
            row_number: header_index + 1,
            reason: SkipReason::DetectedHeader,
        });
        skipped.append(&mut outcome.skipped);
        outcome.skipped = skipped;

        Some(outcome)
    }

    fn reject_all(
        &self,
        rows: &[RawRow],
        first_row_number: usize,
        mapping: &ColumnMapping,
    ) -> TransformOutcome {
        let mut outcome = TransformOutcome::with_mapping(mapping);
        for (index, row) in rows.iter().enumerate() {
            let row_number = first_row_number + index;
            if row.is_blank() {
                outcome.skip(row_number, SkipReason::BlankRow);
            } else {
                outcome.failed.push(FailedRow::new(
                    row_number,
                    row,
                    format!(
                        "could not reliably map detected headers ({} field(s) mapped)",
                        mapping.len()
                    ),
                ));
            }
        }
        outcome
    }
}
