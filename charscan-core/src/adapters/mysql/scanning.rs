//! Data queries: key bounds, batch fetches, length checks and value streaming.
//!
//! Values are read as raw bytes so that stored sequences which are not valid
//! in the connection character set still reach the classifiers intact.

use super::RowExt;
use crate::Result;
use crate::adapters::{qualified_table, quote_identifier};
use crate::classify::decode_value;
use crate::error::CharScanError;
use crate::models::{BatchRow, EncodingComparison, KeyColumn, ScanRange, TableTarget};
use futures::TryStreamExt;
use sqlx::{Executor, MySqlPool};

/// `MIN` and `MAX` of the key column, `None` when the table is empty.
///
/// Unsigned keys are read unsigned so a value above `i64::MAX` is rejected
/// instead of wrapping negative under `CAST(... AS SIGNED)`.
///
/// # Errors
/// Returns `UnsupportedKey` if an unsigned bound exceeds `i64::MAX`.
pub async fn key_bounds(
    pool: &MySqlPool,
    target: &TableTarget,
    key: &KeyColumn,
) -> Result<Option<(i64, i64)>> {
    let sql = key_bounds_sql(target, &key.name, key.is_unsigned());
    let row = sqlx::query(&sql).fetch_one(pool).await.map_err(|e| {
        CharScanError::query_failed(format!("Failed to read key bounds of {}", target), e)
    })?;

    if !key.is_unsigned() {
        let min_id: Option<i64> = row.get_field("min_id", Some(&target.table))?;
        let max_id: Option<i64> = row.get_field("max_id", Some(&target.table))?;
        return Ok(min_id.zip(max_id));
    }

    let min_id: Option<u64> = row.get_field("min_id", Some(&target.table))?;
    let max_id: Option<u64> = row.get_field("max_id", Some(&target.table))?;
    match min_id.zip(max_id) {
        Some((min_id, max_id)) => signed_bounds(target, &key.name, min_id, max_id).map(Some),
        None => Ok(None),
    }
}

/// Narrows unsigned key bounds to `i64`, the range batching works in.
pub(crate) fn signed_bounds(
    target: &TableTarget,
    key: &str,
    min_id: u64,
    max_id: u64,
) -> Result<(i64, i64)> {
    match (i64::try_from(min_id), i64::try_from(max_id)) {
        (Ok(min_id), Ok(max_id)) => Ok((min_id, max_id)),
        _ => Err(CharScanError::unsupported_key(
            &target.database,
            &target.table,
            format!(
                "unsigned primary key `{}` reaches {}, above the largest batchable key {}",
                key,
                max_id,
                i64::MAX
            ),
        )),
    }
}

/// Rows whose key lies in `range`, with the raw bytes of `column`.
pub async fn fetch_batch(
    pool: &MySqlPool,
    target: &TableTarget,
    key: &str,
    column: &str,
    range: ScanRange,
) -> Result<Vec<BatchRow>> {
    let sql = batch_sql(target, key, column);
    let rows = sqlx::query(&sql)
        .bind(range.start)
        .bind(range.end)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            CharScanError::query_failed(
                format!("Failed to fetch {}.{} for keys {}", target, column, range),
                e,
            )
        })?;

    rows.iter()
        .map(|row| {
            let key: i64 = row.get_field("key_value", Some(&target.table))?;
            let value = row.get_bytes("column_value", Some(&target.table))?;
            Ok(BatchRow { key, value })
        })
        .collect()
}

/// Non-null rows of `column` whose byte length differs from its character length.
pub async fn length_mismatch_count(
    pool: &MySqlPool,
    target: &TableTarget,
    column: &str,
) -> Result<u64> {
    let sql = length_mismatch_sql(target, column);
    let count: i64 = sqlx::query_scalar(&sql)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            CharScanError::query_failed(
                format!("Failed to count length mismatches in {}.{}", target, column),
                e,
            )
        })?;

    Ok(u64::try_from(count).unwrap_or_default())
}

/// Streams every non-null value of `column` into `visitor`.
///
/// The statement is sent unprepared so the server returns every column type
/// in its text form. Numeric and temporal columns therefore arrive as their
/// ASCII rendering rather than as binary-protocol integers.
pub async fn visit_column_values(
    pool: &MySqlPool,
    target: &TableTarget,
    column: &str,
    visitor: &mut (dyn for<'a> FnMut(&'a [u8]) + Send),
) -> Result<u64> {
    let sql = column_values_sql(target, column);
    let context = || format!("Failed to read {}.{}", target, column);

    let mut rows = pool.fetch(sql.as_str());
    let mut visited: u64 = 0;

    while let Some(row) = rows
        .try_next()
        .await
        .map_err(|e| CharScanError::query_failed(context(), e))?
    {
        if let Some(value) = row.get_bytes("column_value", Some(&target.table))? {
            visitor(&value);
            visited = visited.saturating_add(1);
        }
    }

    Ok(visited)
}

/// Rows holding bytes 0x80-0xFF, reinterpreted as latin1 and as utf8.
pub async fn compare_encodings(
    pool: &MySqlPool,
    target: &TableTarget,
    column: &str,
) -> Result<Vec<EncodingComparison>> {
    let sql = compare_encodings_sql(target, column);
    let rows = sqlx::query(&sql).fetch_all(pool).await.map_err(|e| {
        CharScanError::query_failed(
            format!("Failed to compare encodings of {}.{}", target, column),
            e,
        )
    })?;

    rows.iter()
        .map(|row| {
            let latin1 = row.get_bytes("as_latin1", Some(&target.table))?;
            let utf8 = row.get_bytes("as_utf8", Some(&target.table))?;
            Ok(EncodingComparison {
                latin1: latin1.as_deref().map(to_text).unwrap_or_default(),
                utf8: utf8.as_deref().map(to_text).unwrap_or_default(),
            })
        })
        .collect()
}

fn to_text(bytes: &[u8]) -> String {
    decode_value(bytes).into_owned()
}

pub(crate) fn key_bounds_sql(target: &TableTarget, key: &str, unsigned: bool) -> String {
    let key = quote_identifier(key);
    let as_type = if unsigned { "UNSIGNED" } else { "SIGNED" };
    format!(
        "SELECT CAST(MIN({key}) AS {as_type}) AS min_id, CAST(MAX({key}) AS {as_type}) AS max_id \
         FROM {}",
        qualified_table(target)
    )
}

pub(crate) fn batch_sql(target: &TableTarget, key: &str, column: &str) -> String {
    let key = quote_identifier(key);
    format!(
        "SELECT CAST({key} AS SIGNED) AS key_value, {} AS column_value \
         FROM {} WHERE {key} BETWEEN ? AND ?",
        quote_identifier(column),
        qualified_table(target)
    )
}

pub(crate) fn length_mismatch_sql(target: &TableTarget, column: &str) -> String {
    let column = quote_identifier(column);
    format!(
        "SELECT COUNT(*) FROM {} WHERE LENGTH({column}) != CHAR_LENGTH({column}) AND {column} IS NOT NULL",
        qualified_table(target)
    )
}

pub(crate) fn column_values_sql(target: &TableTarget, column: &str) -> String {
    format!(
        "SELECT {} AS column_value FROM {}",
        quote_identifier(column),
        qualified_table(target)
    )
}

/// `HEX()` renders each byte as two digits, so a high byte is a pair
/// starting with 8-F at an even offset.
pub(crate) fn compare_encodings_sql(target: &TableTarget, column: &str) -> String {
    let column = quote_identifier(column);
    format!(
        "SELECT CONVERT(CONVERT({column} USING BINARY) USING latin1) AS as_latin1, \
         CONVERT(CONVERT({column} USING BINARY) USING utf8mb4) AS as_utf8 \
         FROM {} WHERE HEX({column}) REGEXP '^(..)*[89A-F]'",
        qualified_table(target)
    )
}
