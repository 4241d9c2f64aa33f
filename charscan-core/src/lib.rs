//! Core scanning, classification and reporting for charscan.
//!
//! charscan looks for character-encoding problems in MySQL data: text that
//! holds C1 control characters or code points no single-byte Latin-1/CP-1252
//! encoding can represent, columns whose byte length disagrees with their
//! character length, and values that are not well-formed UTF-8.
//!
//! # Guarantees
//! - All database operations are read-only (SELECT/SHOW only)
//! - Credentials are never stored in reports, logged or shown in errors
//! - One query at a time on one connection
//!
//! # Architecture
//! - [`adapters::ScanAdapter`] is the only path to the database
//! - [`scanner::scan_table`] runs the batched key-range scan of one table
//! - [`sweep::sweep_database`] checks every table and column of a schema
//! - [`report::Reporter`] renders results as text or JSON

pub mod adapters;
pub mod classify;
pub mod error;
pub mod logging;
pub mod models;
pub mod report;
pub mod scanner;
pub mod security;
pub mod sweep;

// Re-export commonly used types
pub use adapters::{
    ConnectionConfig, FailurePolicy, OutputFormat, RetryPolicy, ScanAdapter, ScanConfig,
    SweepConfig,
};
pub use error::{CharScanError, Result};
pub use logging::init_logging;
pub use models::{
    ColumnFindings, ConnectionStatus, OffendingRecord, SweepFinding, SweepSummary,
    TableCollation, TableReport, TableTarget,
};
pub use report::Reporter;
pub use scanner::scan_table;
pub use security::{CredentialProvider, Credentials};
pub use sweep::sweep_database;
