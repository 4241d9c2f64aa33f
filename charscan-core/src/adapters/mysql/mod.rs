//! MySQL adapter backed by a single read-only sqlx connection.
//!
//! # Module Structure
//! - `connection`: Session setup and server identification
//! - `introspection`: `INFORMATION_SCHEMA` lookups (schemas, tables, keys, collation)
//! - `scanning`: Key bounds, batch fetches, length checks and value streaming
//!
//! # Security Guarantees
//! - The session is opened `READ ONLY` and only issues SELECT statements
//! - Credentials are passed to the driver and never stored on the adapter
//! - `max_execution_time` bounds every statement server-side

pub mod connection;
pub mod introspection;
pub mod scanning;

#[cfg(test)]
mod tests;

use super::{ConnectionConfig, ScanAdapter};
use crate::Result;
use crate::error::CharScanError;
use crate::models::{
    BatchRow, EncodingComparison, KeyColumn, ScanRange, TableCollation, TableTarget,
};
use async_trait::async_trait;
use sqlx::MySqlPool;
use sqlx::Row;
use sqlx::mysql::MySqlRow;

/// MySQL implementation of [`ScanAdapter`].
pub struct MySqlAdapter {
    /// Pool capped at one connection; statements run strictly in sequence
    pub pool: MySqlPool,
    /// Connection settings the pool was built from
    pub config: ConnectionConfig,
}

impl std::fmt::Debug for MySqlAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlAdapter")
            .field("config", &self.config)
            .field("pool_size", &self.pool.size())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ScanAdapter for MySqlAdapter {
    async fn list_databases(&self) -> Result<Vec<String>> {
        introspection::list_databases(&self.pool).await
    }

    async fn list_tables(&self, database: &str) -> Result<Vec<String>> {
        introspection::list_tables(&self.pool, database).await
    }

    async fn list_columns(&self, target: &TableTarget) -> Result<Vec<String>> {
        introspection::list_columns(&self.pool, target).await
    }

    async fn primary_keys(&self, target: &TableTarget) -> Result<Vec<KeyColumn>> {
        introspection::primary_keys(&self.pool, target).await
    }

    async fn text_columns(&self, target: &TableTarget) -> Result<Vec<String>> {
        introspection::text_columns(&self.pool, target).await
    }

    async fn table_collation(&self, target: &TableTarget) -> Result<TableCollation> {
        introspection::table_collation(&self.pool, target).await
    }

    async fn key_bounds(
        &self,
        target: &TableTarget,
        key: &KeyColumn,
    ) -> Result<Option<(i64, i64)>> {
        scanning::key_bounds(&self.pool, target, key).await
    }

    async fn fetch_batch(
        &self,
        target: &TableTarget,
        key: &str,
        column: &str,
        range: ScanRange,
    ) -> Result<Vec<BatchRow>> {
        scanning::fetch_batch(&self.pool, target, key, column, range).await
    }

    async fn length_mismatch_count(&self, target: &TableTarget, column: &str) -> Result<u64> {
        scanning::length_mismatch_count(&self.pool, target, column).await
    }

    async fn visit_column_values(
        &self,
        target: &TableTarget,
        column: &str,
        visitor: &mut (dyn for<'a> FnMut(&'a [u8]) + Send),
    ) -> Result<u64> {
        scanning::visit_column_values(&self.pool, target, column, visitor).await
    }

    async fn compare_encodings(
        &self,
        target: &TableTarget,
        column: &str,
    ) -> Result<Vec<EncodingComparison>> {
        scanning::compare_encodings(&self.pool, target, column).await
    }
}

/// Extension trait for extracting typed values from result rows with
/// consistent error context.
pub(crate) trait RowExt {
    fn get_field<'r, T>(&'r self, field_name: &str, table_context: Option<&str>) -> Result<T>
    where
        T: sqlx::Decode<'r, sqlx::MySql> + sqlx::Type<sqlx::MySql>;

    /// Reads a value as raw bytes whatever its declared type.
    fn get_bytes(&self, field_name: &str, table_context: Option<&str>) -> Result<Option<Vec<u8>>>;
}

impl RowExt for MySqlRow {
    fn get_field<'r, T>(&'r self, field_name: &str, table_context: Option<&str>) -> Result<T>
    where
        T: sqlx::Decode<'r, sqlx::MySql> + sqlx::Type<sqlx::MySql>,
    {
        self.try_get(field_name)
            .map_err(|e| CharScanError::parse_field(field_name, table_context, e))
    }

    fn get_bytes(&self, field_name: &str, table_context: Option<&str>) -> Result<Option<Vec<u8>>> {
        self.try_get_unchecked::<Option<Vec<u8>>, _>(field_name)
            .map_err(|e| CharScanError::parse_field(field_name, table_context, e))
    }
}
