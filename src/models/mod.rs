//! Core data models for the payroll ingestion engine.
//!
//! This module contains the raw input shapes, the canonical record produced
//! by ingestion, and the outputs of the deduction calculator.

mod cell;
mod deduction;
mod employee_record;
mod field;
mod ingestion;

pub use cell::{CellValue, RawRow};
pub use deduction::{AuditStep, DeductionBreakdown, DeductionResult};
pub use employee_record::{
    BankInfo, ContactInfo, DEFAULT_STATUS, EmployeeRecord, StatutoryDeductions,
};
pub use field::{CanonicalField, FieldGroup, FieldKind, FieldTarget};
pub use ingestion::{
    ExtractionWarning, FailedRow, IngestionResult, IngestionSummary, MappedColumn, SkipReason,
    SkippedRow, StrategyKind, WarningCode,
};
