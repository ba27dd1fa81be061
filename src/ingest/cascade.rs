//! The three-strategy extraction cascade.

use tracing::{debug, info};

use crate::config::{ConfigLoader, IngestSettings, Ruleset, StatutoryCaps};
use crate::models::{FailedRow, IngestionResult, RawRow, StrategyKind};

use super::aliases::AliasSet;
use super::direct_extractor::PatternExtractor;
use super::embedded_header::EmbeddedHeaderTransformer;
use super::transformer::{RowTransformer, TransformOutcome};

/// One way of turning raw rows into records.
pub trait ExtractionStrategy {
    /// Identifies the strategy in results and logs.
    fn kind(&self) -> StrategyKind;

    /// Runs the strategy, or returns `None` when it does not apply to these
    /// rows at all.
    fn attempt(&self, rows: &[RawRow]) -> Option<TransformOutcome>;
}

impl ExtractionStrategy for RowTransformer<'_> {
    fn kind(&self) -> StrategyKind {
        StrategyKind::HeaderMapping
    }

    fn attempt(&self, rows: &[RawRow]) -> Option<TransformOutcome> {
        self.transform(rows)
    }
}

impl ExtractionStrategy for EmbeddedHeaderTransformer<'_> {
    fn kind(&self) -> StrategyKind {
        StrategyKind::EmbeddedHeader
    }

    fn attempt(&self, rows: &[RawRow]) -> Option<TransformOutcome> {
        if self.keys_resolve(rows) {
            return None;
        }
        self.detect_and_transform(rows)
    }
}

impl ExtractionStrategy for PatternExtractor<'_> {
    fn kind(&self) -> StrategyKind {
        StrategyKind::PatternMatch
    }

    fn attempt(&self, rows: &[RawRow]) -> Option<TransformOutcome> {
        if rows.is_empty() {
            return None;
        }
        Some(self.extract(rows))
    }
}

/// Tries each strategy in order and stops at the first that produces a
/// record.
///
/// When none produces a record, the first applicable strategy's outcome is
/// returned so its failure reasons reach the caller. Returns `None` when no
/// strategy applies.
pub fn run_cascade(
    strategies: &[&dyn ExtractionStrategy],
    rows: &[RawRow],
) -> Option<(StrategyKind, TransformOutcome)> {
    let mut fallback = None;

    for strategy in strategies {
        let kind = strategy.kind();
        let Some(outcome) = strategy.attempt(rows) else {
            debug!(strategy = ?kind, "Strategy not applicable");
            continue;
        };

        debug!(
            strategy = ?kind,
            records = outcome.records.len(),
            failed = outcome.failed.len(),
            skipped = outcome.skipped.len(),
            "Strategy attempted"
        );

        if !outcome.records.is_empty() {
            return Some((kind, outcome));
        }
        if fallback.is_none() {
            fallback = Some((kind, outcome));
        }
    }

    fallback
}

/// The ingestion pipeline: alias dictionary, thresholds and statutory caps,
/// wired into the header-mapping, embedded-header and pattern strategies.
///
/// # Example
///
/// ```
/// use payroll_ingest::config::{IngestSettings, StatutoryCaps};
/// use payroll_ingest::ingest::{AliasSet, IngestionPipeline};
/// use payroll_ingest::models::{CellValue, RawRow, StrategyKind};
/// use rust_decimal::Decimal;
///
/// let caps = StatutoryCaps {
///     pension: Decimal::from(2160),
///     health: Decimal::from(30000),
///     levy: Decimal::from(15000),
/// };
/// let pipeline = IngestionPipeline::new(AliasSet::builtin(), caps, IngestSettings::default());
///
/// let rows: Vec<RawRow> = vec![
///     [
///         ("Staff No", CellValue::from("E001")),
///         ("Name", CellValue::from("Jane Doe")),
///         ("Gross Pay", CellValue::number(60000)),
///     ]
///     .into_iter()
///     .collect(),
/// ];
///
/// let result = pipeline.ingest("march.xlsx", &rows);
/// assert_eq!(result.strategy, Some(StrategyKind::HeaderMapping));
/// assert_eq!(result.extracted_records.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct IngestionPipeline {
    aliases: AliasSet,
    caps: StatutoryCaps,
    settings: IngestSettings,
}

impl IngestionPipeline {
    /// Creates a pipeline.
    pub fn new(aliases: AliasSet, caps: StatutoryCaps, settings: IngestSettings) -> Self {
        Self {
            aliases,
            caps,
            settings,
        }
    }

    /// Creates a pipeline from loaded configuration, taking statutory caps
    /// from `ruleset`.
    pub fn from_config(config: &ConfigLoader, ruleset: &Ruleset) -> Self {
        Self::new(
            config.alias_set(),
            ruleset.caps.clone(),
            config.settings().clone(),
        )
    }

    /// The alias dictionary in use.
    pub fn aliases(&self) -> &AliasSet {
        &self.aliases
    }

    /// The statutory caps the validator checks against.
    pub fn caps(&self) -> &StatutoryCaps {
        &self.caps
    }

    /// The pipeline thresholds.
    pub fn settings(&self) -> &IngestSettings {
        &self.settings
    }

    /// Ingests one sheet of rows.
    ///
    /// Never fails: rows that cannot be mapped are returned in
    /// `failed_rows`. An input that yields neither records nor row failures
    /// is reported as a single whole-input failure, "no data found".
    pub fn ingest(&self, source_name: &str, rows: &[RawRow]) -> IngestionResult {
        let transformer = RowTransformer::new(&self.aliases, &self.caps, &self.settings);
        let embedded = EmbeddedHeaderTransformer::new(transformer);
        let pattern = PatternExtractor::new(&self.aliases, &self.caps, &self.settings);
        let strategies: [&dyn ExtractionStrategy; 3] = [&transformer, &embedded, &pattern];

        let mut result = IngestionResult {
            source_name: source_name.to_string(),
            strategy: None,
            column_mapping: Vec::new(),
            extracted_records: Vec::new(),
            failed_rows: Vec::new(),
            skipped_rows: Vec::new(),
        };

        if let Some((kind, outcome)) = run_cascade(&strategies, rows) {
            result.strategy = Some(kind);
            result.column_mapping = outcome.mapping;
            result.extracted_records = outcome.records;
            result.failed_rows = outcome.failed;
            result.skipped_rows = outcome.skipped;
        }

        if result.extracted_records.is_empty() && result.failed_rows.is_empty() {
            result.failed_rows.push(FailedRow::no_data_found());
        }

        let summary = result.summary();
        info!(
            source = %result.source_name,
            rows = rows.len(),
            strategy = ?result.strategy,
            extracted = summary.extracted,
            failed = summary.failed,
            skipped = summary.skipped,
            "Ingestion completed"
        );

        result
    }
}
