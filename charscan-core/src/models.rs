//! Data structures produced and consumed by the scanner, sweep and reporter.
//!
//! Everything here serializes with serde so the reporter can emit either
//! colored text or JSON from the same values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Integer column types that can drive key-range batching.
const INTEGER_TYPES: &[&str] = &[
    "tinyint",
    "smallint",
    "mediumint",
    "int",
    "integer",
    "bigint",
];

/// A table selected for scanning.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableTarget {
    /// Schema (database) name
    pub database: String,
    /// Table name
    pub table: String,
}

impl TableTarget {
    /// Creates a new target.
    pub fn new(database: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            table: table.into(),
        }
    }
}

impl fmt::Display for TableTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.database, self.table)
    }
}

/// One column of a table's primary key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyColumn {
    /// Column name
    pub name: String,
    /// Declared `COLUMN_TYPE` from `INFORMATION_SCHEMA.COLUMNS`, such as
    /// `int` or `bigint(20) unsigned`
    pub data_type: String,
}

impl KeyColumn {
    /// Creates a key column description.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }

    /// Whether the declared type is one of MySQL's integer types.
    pub fn is_integer(&self) -> bool {
        let lowered = self.data_type.to_lowercase();
        let base: String = lowered
            .chars()
            .take_while(char::is_ascii_alphabetic)
            .collect();
        INTEGER_TYPES.contains(&base.as_str())
    }

    /// Whether the declared type carries the `unsigned` attribute.
    pub fn is_unsigned(&self) -> bool {
        self.data_type
            .to_lowercase()
            .split_whitespace()
            .any(|word| word == "unsigned")
    }
}

/// Inclusive range of primary key values processed as one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRange {
    /// First key in the batch
    pub start: i64,
    /// Last key in the batch
    pub end: i64,
}

impl fmt::Display for ScanRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// A row returned by a batch query: the key and the raw column bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRow {
    /// Primary key value
    pub key: i64,
    /// Column value, `None` for SQL NULL
    pub value: Option<Vec<u8>>,
}

impl BatchRow {
    /// Creates a row holding a non-null value.
    pub fn new(key: i64, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key,
            value: Some(value.into()),
        }
    }

    /// Creates a row whose column is NULL.
    pub fn null(key: i64) -> Self {
        Self { key, value: None }
    }
}

/// Offending keys recorded for one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnFindings {
    /// Column name
    pub column: String,
    /// Total number of offending rows, independent of any cap on `ids`
    pub count: u64,
    /// Offending primary keys in the order they were found
    pub ids: Vec<i64>,
    /// True when `ids` was capped and holds fewer entries than `count`
    pub truncated: bool,
}

/// Column name to offending keys, built up during a single table scan.
///
/// Columns keep the order in which their first offender was seen.
#[derive(Debug, Clone, Default)]
pub struct OffendingRecord {
    columns: Vec<ColumnFindings>,
    index: HashMap<String, usize>,
    max_ids_per_column: Option<usize>,
}

impl OffendingRecord {
    /// Creates an empty record, optionally capping stored IDs per column.
    pub fn new(max_ids_per_column: Option<usize>) -> Self {
        Self {
            columns: Vec::new(),
            index: HashMap::new(),
            max_ids_per_column,
        }
    }

    /// Appends an offending key for `column`.
    pub fn record(&mut self, column: &str, key: i64) {
        let position = match self.index.get(column) {
            Some(&position) => position,
            None => {
                let position = self.columns.len();
                self.columns.push(ColumnFindings {
                    column: column.to_string(),
                    count: 0,
                    ids: Vec::new(),
                    truncated: false,
                });
                self.index.insert(column.to_string(), position);
                position
            }
        };

        let cap = self.max_ids_per_column;
        if let Some(findings) = self.columns.get_mut(position) {
            findings.count = findings.count.saturating_add(1);
            match cap {
                Some(cap) if findings.ids.len() >= cap => findings.truncated = true,
                _ => findings.ids.push(key),
            }
        }
    }

    /// Offending keys recorded for `column`, if any.
    pub fn ids(&self, column: &str) -> Option<&[i64]> {
        self.index
            .get(column)
            .and_then(|&position| self.columns.get(position))
            .map(|findings| findings.ids.as_slice())
    }

    /// Consumes the record, yielding findings for columns with offenders.
    pub fn into_findings(self) -> Vec<ColumnFindings> {
        self.columns
            .into_iter()
            .filter(|findings| findings.count > 0)
            .collect()
    }
}

/// Result of scanning one table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableReport {
    /// Scanned table
    pub target: TableTarget,
    /// Primary key column used for batching, `None` if the scan short-circuited
    pub key_column: Option<String>,
    /// Columns with at least one offending value
    pub findings: Vec<ColumnFindings>,
    /// Number of key-range batches processed
    pub batches_scanned: u64,
    /// Number of (row, column) values examined
    pub values_examined: u64,
    /// Wall-clock duration of the whole table scan, in seconds
    pub elapsed_secs: f64,
    /// When the scan finished
    pub scanned_at: DateTime<Utc>,
}

impl TableReport {
    /// An empty report for a table that needed no batches.
    pub fn empty(target: TableTarget, key_column: Option<String>) -> Self {
        Self {
            target,
            key_column,
            findings: Vec::new(),
            batches_scanned: 0,
            values_examined: 0,
            elapsed_secs: 0.0,
            scanned_at: Utc::now(),
        }
    }

    /// Total offending values across all columns.
    pub fn total_offending(&self) -> u64 {
        self.findings
            .iter()
            .fold(0u64, |total, findings| total.saturating_add(findings.count))
    }

    /// Findings for a named column.
    pub fn column(&self, column: &str) -> Option<&ColumnFindings> {
        self.findings.iter().find(|findings| findings.column == column)
    }
}

/// Default character set and collation of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCollation {
    /// Character set, `None` when the collation has no applicability row
    pub character_set: Option<String>,
    /// Table collation
    pub collation: Option<String>,
}

/// Confirmation details returned by a successful connect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionStatus {
    /// Host the client connected to
    pub host: String,
    /// Port the client connected to
    pub port: u16,
    /// Value of `@@hostname` reported by the server
    pub server_hostname: String,
}

/// A finding emitted by the whole-database sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SweepFinding {
    /// Byte length differs from character length for `count` rows
    LengthMismatch {
        table: String,
        column: String,
        count: u64,
    },
    /// A value that is not well-formed UTF-8
    InvalidUtf8 {
        table: String,
        column: String,
        /// Lossy rendering of the offending bytes
        value: String,
    },
    /// A table that failed and was skipped
    TableFailed { table: String, message: String },
}

/// Counters for a finished sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepSummary {
    /// Database that was swept
    pub database: String,
    /// Tables fully processed
    pub tables_scanned: u64,
    /// Tables skipped after an error
    pub tables_failed: u64,
    /// Columns checked across all tables
    pub columns_checked: u64,
    /// Columns with a length mismatch
    pub length_mismatches: u64,
    /// Values that failed UTF-8 validation
    pub invalid_utf8_values: u64,
}

/// One row of the latin1/utf8 reinterpretation comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingComparison {
    /// Stored bytes read as latin1
    pub latin1: String,
    /// Stored bytes read as utf8
    pub utf8: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_column_integer_detection() {
        assert!(KeyColumn::new("id", "int").is_integer());
        assert!(KeyColumn::new("id", "BIGINT").is_integer());
        assert!(KeyColumn::new("id", "int(10) unsigned").is_integer());
        assert!(KeyColumn::new("id", "bigint unsigned zerofill").is_integer());
        assert!(!KeyColumn::new("code", "varchar(32)").is_integer());
        assert!(!KeyColumn::new("uuid", "binary(16)").is_integer());
        assert!(!KeyColumn::new("ratio", "decimal(10,2)").is_integer());
    }

    #[test]
    fn test_key_column_unsigned_detection() {
        assert!(KeyColumn::new("id", "bigint(20) unsigned").is_unsigned());
        assert!(KeyColumn::new("id", "INT UNSIGNED").is_unsigned());
        assert!(!KeyColumn::new("id", "bigint").is_unsigned());
        assert!(!KeyColumn::new("id", "int(11)").is_unsigned());
    }

    #[test]
    fn test_offending_record_keeps_append_order() {
        let mut record = OffendingRecord::new(None);
        record.record("note", 7);
        record.record("title", 3);
        record.record("note", 2);

        assert_eq!(record.ids("note"), Some(&[7, 2][..]));
        assert_eq!(record.ids("title"), Some(&[3][..]));
        assert_eq!(record.ids("body"), None);

        let findings = record.into_findings();
        let columns: Vec<_> = findings.iter().map(|f| f.column.as_str()).collect();
        assert_eq!(columns, ["note", "title"]);
    }

    #[test]
    fn test_offending_record_cap_keeps_exact_count() {
        let mut record = OffendingRecord::new(Some(2));
        for key in 1..=5 {
            record.record("note", key);
        }

        let findings = record.into_findings();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].count, 5);
        assert_eq!(findings[0].ids, vec![1, 2]);
        assert!(findings[0].truncated);
    }

    #[test]
    fn test_scan_range_display() {
        let range = ScanRange { start: 10, end: 20 };
        assert_eq!(range.to_string(), "10..=20");
    }

    #[test]
    fn test_sweep_finding_serializes_with_kind_tag() {
        let finding = SweepFinding::LengthMismatch {
            table: "orders".to_string(),
            column: "note".to_string(),
            count: 3,
        };
        let json = serde_json::to_value(&finding).unwrap();
        assert_eq!(json["kind"], "length_mismatch");
        assert_eq!(json["count"], 3);
    }
}
