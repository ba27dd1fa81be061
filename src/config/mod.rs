//! Configuration loading and management for the payroll ingestion engine.
//!
//! This module loads versioned statutory rulesets, ingestion thresholds and
//! extra header aliases from YAML files.
//!
//! # Example
//!
//! ```no_run
//! use payroll_ingest::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/ke").unwrap();
//! let ruleset = config.ruleset("2024-12-27").unwrap();
//! println!("Personal relief: {}", ruleset.tax.personal_relief);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    AliasOverrides, EstimateRatios, HealthBand, HealthSchedule, IngestSettings, LevySchedule,
    PensionSchedule, PensionTier, Ruleset, StatutoryCaps, TaxBand, TaxSchedule, TaxableDeductions,
};
