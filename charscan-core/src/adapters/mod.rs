//! Database access seam for the scanner and sweep.
//!
//! The scanning algorithms only talk to a database through [`ScanAdapter`],
//! so they can run against MySQL or an in-memory fixture in tests.
//!
//! # Module Structure
//! - `config`: Connection, scan, retry and sweep configuration
//! - `mysql`: sqlx-backed MySQL implementation (feature `mysql`)

use crate::Result;
use crate::models::{
    BatchRow, EncodingComparison, KeyColumn, ScanRange, TableCollation, TableTarget,
};
use async_trait::async_trait;

pub mod config;

#[cfg(feature = "mysql")]
pub mod mysql;

pub use config::{
    ConnectionConfig, FailurePolicy, OutputFormat, RetryPolicy, ScanConfig, SweepConfig,
};

/// Declared SQL types whose values are inspected by the table scan.
pub const TEXT_COLUMN_TYPES: &[&str] = &[
    "char",
    "varchar",
    "text",
    "tinytext",
    "mediumtext",
    "longtext",
];

/// Read-only operations the scanner and sweep need from a database.
///
/// Every method issues at most one statement. Implementations must not
/// retry internally; the scanner owns the retry policy.
#[async_trait]
pub trait ScanAdapter: Send + Sync {
    /// Lists the schemas visible to the connected user.
    async fn list_databases(&self) -> Result<Vec<String>>;

    /// Lists the tables of `database`.
    async fn list_tables(&self, database: &str) -> Result<Vec<String>>;

    /// Lists every column of the table in ordinal order.
    async fn list_columns(&self, target: &TableTarget) -> Result<Vec<String>>;

    /// Primary key columns in key order. Empty when the table has none.
    async fn primary_keys(&self, target: &TableTarget) -> Result<Vec<KeyColumn>>;

    /// Columns whose declared type is in [`TEXT_COLUMN_TYPES`], in ordinal order.
    async fn text_columns(&self, target: &TableTarget) -> Result<Vec<String>>;

    /// Default character set and collation of the table.
    ///
    /// # Errors
    /// Returns `NotFound` when the table has no metadata row.
    async fn table_collation(&self, target: &TableTarget) -> Result<TableCollation>;

    /// `MIN` and `MAX` of the key column, `None` for an empty table.
    ///
    /// # Errors
    /// Returns `UnsupportedKey` when a bound does not fit `i64`.
    async fn key_bounds(
        &self,
        target: &TableTarget,
        key: &KeyColumn,
    ) -> Result<Option<(i64, i64)>>;

    /// Rows whose key falls in `range`, with the raw bytes of `column`.
    async fn fetch_batch(
        &self,
        target: &TableTarget,
        key: &str,
        column: &str,
        range: ScanRange,
    ) -> Result<Vec<BatchRow>>;

    /// Number of non-null rows where byte length differs from character length.
    async fn length_mismatch_count(&self, target: &TableTarget, column: &str) -> Result<u64>;

    /// Streams every non-null value of `column` into `visitor`.
    ///
    /// Returns the number of values visited.
    async fn visit_column_values(
        &self,
        target: &TableTarget,
        column: &str,
        visitor: &mut (dyn for<'a> FnMut(&'a [u8]) + Send),
    ) -> Result<u64>;

    /// Rows containing bytes 0x80-0xFF, read back as latin1 and as utf8.
    async fn compare_encodings(
        &self,
        target: &TableTarget,
        column: &str,
    ) -> Result<Vec<EncodingComparison>>;
}

/// Quotes a MySQL identifier with backticks, doubling embedded backticks.
///
/// # Example
/// ```rust
/// use charscan_core::adapters::quote_identifier;
///
/// assert_eq!(quote_identifier("orders"), "`orders`");
/// assert_eq!(quote_identifier("odd`name"), "`odd``name`");
/// ```
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Quotes `database`.`table`.
pub fn qualified_table(target: &TableTarget) -> String {
    format!(
        "{}.{}",
        quote_identifier(&target.database),
        quote_identifier(&target.table)
    )
}
