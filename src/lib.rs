//! Payroll record ingestion and statutory deduction engine.
//!
//! This crate turns loosely structured spreadsheet rows into canonical
//! employee payroll records, falling back through embedded-header detection
//! and header-free pattern matching when the sheet's headers cannot be
//! mapped, and calculates statutory deductions (income tax, pension, health
//! contribution and housing levy) under versioned rulesets.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod ingest;
pub mod models;
