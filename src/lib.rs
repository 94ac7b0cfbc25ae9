//! NPI Handover: New Product Introduction project tracking
//!
//! A SQLite-backed store of NPI engineering projects (MES records, build/
//! assembly/machine matrices, checklists, handover documents) with a
//! read-only Excel workbook fallback for records that predate the database,
//! and PDF/Word project report generation.

pub mod core;
pub mod entities;
pub mod report;
