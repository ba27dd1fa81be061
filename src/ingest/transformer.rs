//! Header-driven row transformation.
//!
//! The primary strategy treats the column keys of the first row as headers,
//! resolves them to canonical fields and maps every row through that mapping.

use std::collections::BTreeSet;

use crate::config::{IngestSettings, StatutoryCaps};
use crate::models::{
    EmployeeRecord, FailedRow, MappedColumn, RawRow, SkipReason, SkippedRow,
};

use super::aliases::AliasSet;
use super::coerce::apply_cell;
use super::mapping::ColumnMapping;
use super::resolver::HeaderResolver;
use super::validator::validate;

/// What one extraction strategy produced for a set of rows.
///
/// Every input row lands in exactly one of `records`, `failed` or `skipped`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformOutcome {
    /// Accepted records in input order.
    pub records: Vec<EmployeeRecord>,
    /// Rejected rows in input order.
    pub failed: Vec<FailedRow>,
    /// Skipped rows in input order.
    pub skipped: Vec<SkippedRow>,
    /// The column mapping that was applied. Empty for header-free strategies.
    pub mapping: Vec<MappedColumn>,
}

impl TransformOutcome {
    /// Creates an empty outcome carrying the given mapping.
    pub fn with_mapping(mapping: &ColumnMapping) -> Self {
        Self {
            mapping: mapping.columns().to_vec(),
            ..Self::default()
        }
    }

    /// Number of input rows accounted for.
    pub fn row_count(&self) -> usize {
        self.records.len() + self.failed.len() + self.skipped.len()
    }

    pub(crate) fn skip(&mut self, row_number: usize, reason: SkipReason) {
        self.skipped.push(SkippedRow { row_number, reason });
    }
}

/// Maps rows to [`EmployeeRecord`]s through a resolved column mapping.
///
/// # Example
///
/// ```
/// use payroll_ingest::config::{IngestSettings, StatutoryCaps};
/// use payroll_ingest::ingest::{AliasSet, RowTransformer};
/// use payroll_ingest::models::{CellValue, RawRow};
/// use rust_decimal::Decimal;
///
/// let aliases = AliasSet::builtin();
/// let settings = IngestSettings::default();
/// let caps = StatutoryCaps {
///     pension: Decimal::from(2160),
///     health: Decimal::from(30000),
///     levy: Decimal::from(15000),
/// };
/// let transformer = RowTransformer::new(&aliases, &caps, &settings);
///
/// let row: RawRow = [
///     ("Staff No", CellValue::from("E001")),
///     ("Name", CellValue::from("Jane Mary Doe")),
///     ("Gross Pay", CellValue::number(60000)),
/// ]
/// .into_iter()
/// .collect();
///
/// let outcome = transformer.transform(&[row]).unwrap();
/// assert_eq!(outcome.records.len(), 1);
/// assert_eq!(outcome.records[0].surname, "Doe");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RowTransformer<'a> {
    aliases: &'a AliasSet,
    caps: &'a StatutoryCaps,
    settings: &'a IngestSettings,
}

impl<'a> RowTransformer<'a> {
    /// Creates a transformer.
    pub fn new(aliases: &'a AliasSet, caps: &'a StatutoryCaps, settings: &'a IngestSettings) -> Self {
        Self {
            aliases,
            caps,
            settings,
        }
    }

    /// The alias dictionary in use.
    pub fn aliases(&self) -> &'a AliasSet {
        self.aliases
    }

    /// The ingestion settings in use.
    pub fn settings(&self) -> &'a IngestSettings {
        self.settings
    }

    /// Resolves the column keys of the first row into a mapping.
    pub fn header_mapping(&self, rows: &[RawRow]) -> ColumnMapping {
        let resolver = HeaderResolver::new(self.aliases);
        match rows.first() {
            Some(first) => ColumnMapping::from_keys(&resolver, first.keys()),
            None => ColumnMapping::default(),
        }
    }

    /// Maps every row using the first row's column keys as headers.
    ///
    /// Returns `None` when no column key resolves to a field; falling back to
    /// another strategy is the caller's decision.
    pub fn transform(&self, rows: &[RawRow]) -> Option<TransformOutcome> {
        let mapping = self.header_mapping(rows);
        if mapping.is_empty() {
            return None;
        }
        Some(self.transform_rows(rows, 1, &mapping))
    }

    /// Maps `rows` through `mapping`. `first_row_number` is the 1-based input
    /// position of `rows[0]`.
    pub fn transform_rows(
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
                continue;
            }
            if index == 0 && rows.len() > 1 && self.is_header_echo(row) {
                outcome.skip(row_number, SkipReason::HeaderEcho);
                continue;
            }

            match self.map_row(row, mapping) {
                Ok(record) => outcome.records.push(record),
                Err(reason) => outcome.failed.push(FailedRow::new(row_number, row, reason)),
            }
        }

        outcome
    }

    /// Returns true if enough cell values repeat known header labels.
    pub fn is_header_echo(&self, row: &RawRow) -> bool {
        let matches = row
            .values()
            .filter(|cell| !cell.is_blank() && self.aliases.is_known_alias(&cell.as_text()))
            .count();
        matches >= self.settings.header_echo_min_matches
    }

    /// Builds one record, or explains why the row cannot be accepted.
    pub fn map_row(&self, row: &RawRow, mapping: &ColumnMapping) -> Result<EmployeeRecord, String> {
        let mut record = EmployeeRecord::new();
        let mut mapped = 0;
        let mut populated = BTreeSet::new();

        for column in mapping.columns() {
            let Some(cell) = row.get(&column.column) else {
                continue;
            };
            if cell.is_blank() {
                continue;
            }
            mapped += 1;
            match apply_cell(&mut record, column.field, cell) {
                Some(warning) => record.warnings.push(warning),
                None => {
                    populated.insert(column.field);
                }
            }
        }

        let min = self.settings.min_mapped_fields;
        let has_identity = record.has_identity();
        if mapped < min || !has_identity {
            return Err(failure_reason(mapped, min, has_identity));
        }

        record.derive_missing(&populated, self.settings.advance_ratio);
        let warnings = validate(&record, self.caps);
        record.warnings.extend(warnings);
        Ok(record)
    }
}

fn failure_reason(mapped: usize, min: usize, has_identity: bool) -> String {
    const NO_IDENTITY: &str = "no identity field (employee number, surname or given names)";

    match (mapped < min, has_identity) {
        (true, true) => format!("only {} field(s) mapped (minimum {})", mapped, min),
        (true, false) => format!(
            "only {} field(s) mapped (minimum {}); {}",
            mapped, min, NO_IDENTITY
        ),
        (false, _) => format!("{} field(s) mapped but {}", mapped, NO_IDENTITY),
    }
}
