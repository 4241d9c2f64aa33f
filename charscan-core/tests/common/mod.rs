//! In-memory `ScanAdapter` for scanner and sweep integration tests.
//!
//! Supports injected batch failures, tables whose metadata lookups fail, and
//! records every batch fetch so tests can check what was (re)queried.

#![allow(dead_code)]

use async_trait::async_trait;
use charscan_core::Result;
use charscan_core::adapters::{ScanAdapter, TEXT_COLUMN_TYPES};
use charscan_core::error::CharScanError;
use charscan_core::models::{
    BatchRow, EncodingComparison, KeyColumn, ScanRange, TableCollation, TableTarget,
};
use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

/// One table: declared columns, primary key and rows keyed by id.
#[derive(Debug, Clone, Default)]
pub struct MockTable {
    pub keys: Vec<KeyColumn>,
    pub columns: Vec<(String, String)>,
    pub rows: BTreeMap<i64, BTreeMap<String, Vec<u8>>>,
    pub collation: Option<TableCollation>,
}

impl MockTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(mut self, name: &str, data_type: &str) -> Self {
        self.keys.push(KeyColumn::new(name, data_type));
        self.columns.push((name.to_string(), data_type.to_string()));
        self
    }

    pub fn with_column(mut self, name: &str, data_type: &str) -> Self {
        self.columns.push((name.to_string(), data_type.to_string()));
        self
    }

    /// Adds a row; columns missing from `values` are NULL.
    pub fn with_row(mut self, id: i64, values: &[(&str, &[u8])]) -> Self {
        let row = values
            .iter()
            .map(|(column, bytes)| (column.to_string(), bytes.to_vec()))
            .collect();
        self.rows.insert(id, row);
        self
    }

    pub fn with_collation(mut self, character_set: &str, collation: &str) -> Self {
        self.collation = Some(TableCollation {
            character_set: Some(character_set.to_string()),
            collation: Some(collation.to_string()),
        });
        self
    }

    /// Value of `column` in row `id`, including the key column itself.
    fn value(&self, id: i64, column: &str) -> Option<Vec<u8>> {
        if self.keys.iter().any(|k| k.name == column) {
            return Some(id.to_string().into_bytes());
        }
        self.rows.get(&id).and_then(|row| row.get(column).cloned())
    }
}

#[derive(Debug, Default)]
pub struct MockAdapter {
    tables: BTreeMap<(String, String), MockTable>,
    broken_tables: HashSet<String>,
    failures_remaining: Mutex<u32>,
    fetch_attempts: Mutex<u32>,
    fetch_log: Mutex<Vec<(String, ScanRange)>>,
}

impl MockAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, database: &str, table: &str, definition: MockTable) -> Self {
        self.tables
            .insert((database.to_string(), table.to_string()), definition);
        self
    }

    /// Makes every metadata lookup for `table` fail.
    pub fn with_broken_table(mut self, table: &str) -> Self {
        self.broken_tables.insert(table.to_string());
        self
    }

    /// Makes the next `count` batch fetches fail.
    pub fn fail_next_fetches(&self, count: u32) {
        *self.failures_remaining.lock().unwrap() = count;
    }

    /// Successful batch fetches in order.
    pub fn fetch_log(&self) -> Vec<(String, ScanRange)> {
        self.fetch_log.lock().unwrap().clone()
    }

    /// All batch fetch attempts, including injected failures.
    pub fn fetch_attempts(&self) -> u32 {
        *self.fetch_attempts.lock().unwrap()
    }

    fn table(&self, target: &TableTarget) -> Result<&MockTable> {
        if self.broken_tables.contains(&target.table) {
            return Err(CharScanError::query_failed(
                format!("Failed to list columns of {}", target),
                std::io::Error::other("table is corrupt"),
            ));
        }
        self.tables
            .get(&(target.database.clone(), target.table.clone()))
            .ok_or_else(|| CharScanError::not_found(format!("table {}", target)))
    }
}

#[async_trait]
impl ScanAdapter for MockAdapter {
    async fn list_databases(&self) -> Result<Vec<String>> {
        let mut databases: Vec<String> = self.tables.keys().map(|(db, _)| db.clone()).collect();
        databases.dedup();
        Ok(databases)
    }

    async fn list_tables(&self, database: &str) -> Result<Vec<String>> {
        Ok(self
            .tables
            .keys()
            .filter(|(db, _)| db == database)
            .map(|(_, table)| table.clone())
            .collect())
    }

    async fn list_columns(&self, target: &TableTarget) -> Result<Vec<String>> {
        Ok(self
            .table(target)?
            .columns
            .iter()
            .map(|(name, _)| name.clone())
            .collect())
    }

    async fn primary_keys(&self, target: &TableTarget) -> Result<Vec<KeyColumn>> {
        Ok(self.table(target)?.keys.clone())
    }

    async fn text_columns(&self, target: &TableTarget) -> Result<Vec<String>> {
        Ok(self
            .table(target)?
            .columns
            .iter()
            .filter(|(_, data_type)| TEXT_COLUMN_TYPES.contains(&data_type.as_str()))
            .map(|(name, _)| name.clone())
            .collect())
    }

    async fn table_collation(&self, target: &TableTarget) -> Result<TableCollation> {
        self.table(target)?
            .collation
            .clone()
            .ok_or_else(|| CharScanError::not_found(format!("collation of {}", target)))
    }

    async fn key_bounds(
        &self,
        target: &TableTarget,
        _key: &KeyColumn,
    ) -> Result<Option<(i64, i64)>> {
        let table = self.table(target)?;
        let min = table.rows.keys().next().copied();
        let max = table.rows.keys().next_back().copied();
        Ok(min.zip(max))
    }

    async fn fetch_batch(
        &self,
        target: &TableTarget,
        _key: &str,
        column: &str,
        range: ScanRange,
    ) -> Result<Vec<BatchRow>> {
        *self.fetch_attempts.lock().unwrap() += 1;
        {
            let mut remaining = self.failures_remaining.lock().unwrap();
            if *remaining > 0 {
                *remaining -= 1;
                return Err(CharScanError::query_failed(
                    format!("Failed to fetch {}.{} for keys {}", target, column, range),
                    std::io::Error::other("connection reset"),
                ));
            }
        }

        let table = self.table(target)?;
        self.fetch_log
            .lock()
            .unwrap()
            .push((column.to_string(), range));

        Ok(table
            .rows
            .range(range.start..=range.end)
            .map(|(&id, _)| match table.value(id, column) {
                Some(bytes) => BatchRow::new(id, bytes),
                None => BatchRow::null(id),
            })
            .collect())
    }

    async fn length_mismatch_count(&self, target: &TableTarget, column: &str) -> Result<u64> {
        let table = self.table(target)?;
        let count = table
            .rows
            .keys()
            .filter_map(|&id| table.value(id, column))
            .filter(|bytes| bytes.len() != String::from_utf8_lossy(bytes).chars().count())
            .count();
        Ok(count as u64)
    }

    async fn visit_column_values(
        &self,
        target: &TableTarget,
        column: &str,
        visitor: &mut (dyn for<'a> FnMut(&'a [u8]) + Send),
    ) -> Result<u64> {
        let table = self.table(target)?;
        let mut visited = 0;
        for id in table.rows.keys() {
            if let Some(bytes) = table.value(*id, column) {
                visitor(&bytes);
                visited += 1;
            }
        }
        Ok(visited)
    }

    async fn compare_encodings(
        &self,
        target: &TableTarget,
        column: &str,
    ) -> Result<Vec<EncodingComparison>> {
        let table = self.table(target)?;
        Ok(table
            .rows
            .keys()
            .filter_map(|&id| table.value(id, column))
            .filter(|bytes| bytes.iter().any(|b| *b >= 0x80))
            .map(|bytes| EncodingComparison {
                latin1: bytes.iter().map(|&b| char::from(b)).collect(),
                utf8: String::from_utf8_lossy(&bytes).into_owned(),
            })
            .collect())
    }
}
