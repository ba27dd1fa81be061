//! The payroll record ingestion pipeline.
//!
//! Raw spreadsheet rows flow through a fixed cascade of strategies:
//!
//! 1. **Header mapping** resolves the first row's column keys against the
//!    alias dictionary and maps every row through the resulting columns.
//! 2. **Embedded header** runs when no column key resolves; it looks for a
//!    header row among the first rows' cell values and maps the rows below.
//! 3. **Pattern match** runs when neither produced a record; it classifies
//!    cells by shape alone and estimates statutory amounts.
//!
//! Every record, whichever strategy produced it, passes the same sanity
//! validation. No strategy raises on malformed input: every row is either
//! extracted, failed with a reason or skipped.
//!
//! # Example
//!
//! ```no_run
//! use payroll_ingest::config::ConfigLoader;
//! use payroll_ingest::ingest::IngestionPipeline;
//! use payroll_ingest::models::RawRow;
//!
//! let config = ConfigLoader::load("./config/ke")?;
//! let ruleset = config.ruleset("2024-12-27")?;
//! let pipeline = IngestionPipeline::from_config(&config, ruleset);
//!
//! let rows: Vec<RawRow> = serde_json::from_str(r#"[{"Name": "Jane Doe", "Staff No": "E1", "Gross": 50000}]"#).unwrap();
//! let result = pipeline.ingest("upload.xlsx", &rows);
//! println!("{:?}", result.summary());
//! # Ok::<(), payroll_ingest::error::PayrollError>(())
//! ```

mod aliases;
mod cascade;
mod coerce;
mod direct_extractor;
mod embedded_header;
mod mapping;
mod patterns;
mod resolver;
mod transformer;
mod validator;

pub use aliases::AliasSet;
pub use cascade::{ExtractionStrategy, IngestionPipeline, run_cascade};
pub use coerce::{apply_cell, parse_flag, parse_money};
pub use direct_extractor::{PatternExtractor, estimate_deductions};
pub use embedded_header::EmbeddedHeaderTransformer;
pub use mapping::ColumnMapping;
pub use patterns::{
    amount_value, digit_string, is_numeric, looks_like_national_id, looks_like_pension_number,
    looks_like_person_name, looks_like_salary, looks_like_tax_pin,
};
pub use resolver::{HeaderMatch, HeaderResolver, MatchTier, is_placeholder_header};
pub use transformer::{RowTransformer, TransformOutcome};
pub use validator::validate;
