//! `INFORMATION_SCHEMA` lookups.
//!
//! Name columns are wrapped in `CAST(... AS CHAR)` because MySQL 8 reports
//! several of them as VARBINARY, which sqlx will not decode into `String`.

use super::RowExt;
use crate::Result;
use crate::adapters::TEXT_COLUMN_TYPES;
use crate::error::CharScanError;
use crate::models::{KeyColumn, TableCollation, TableTarget};
use sqlx::MySqlPool;

/// Lists the schemas visible to the connected user.
pub async fn list_databases(pool: &MySqlPool) -> Result<Vec<String>> {
    let rows = sqlx::query(
        r#"
        SELECT CAST(SCHEMA_NAME AS CHAR) AS SCHEMA_NAME
        FROM INFORMATION_SCHEMA.SCHEMATA
        ORDER BY SCHEMA_NAME
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(|e| CharScanError::query_failed("Failed to enumerate databases", e))?;

    rows.iter()
        .map(|row| row.get_field("SCHEMA_NAME", None))
        .collect()
}

/// Lists base tables and views of `database`.
pub async fn list_tables(pool: &MySqlPool, database: &str) -> Result<Vec<String>> {
    let rows = sqlx::query(
        r#"
        SELECT CAST(TABLE_NAME AS CHAR) AS TABLE_NAME
        FROM INFORMATION_SCHEMA.TABLES
        WHERE TABLE_SCHEMA = ?
        ORDER BY TABLE_NAME
        "#,
    )
    .bind(database)
    .fetch_all(pool)
    .await
    .map_err(|e| {
        CharScanError::query_failed(format!("Failed to enumerate tables in {}", database), e)
    })?;

    tracing::debug!("Found {} tables in {}", rows.len(), database);

    rows.iter()
        .map(|row| row.get_field("TABLE_NAME", None))
        .collect()
}

/// Lists every column of the table in ordinal order.
pub async fn list_columns(pool: &MySqlPool, target: &TableTarget) -> Result<Vec<String>> {
    let rows = sqlx::query(
        r#"
        SELECT CAST(COLUMN_NAME AS CHAR) AS COLUMN_NAME
        FROM INFORMATION_SCHEMA.COLUMNS
        WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?
        ORDER BY ORDINAL_POSITION
        "#,
    )
    .bind(&target.database)
    .bind(&target.table)
    .fetch_all(pool)
    .await
    .map_err(|e| CharScanError::query_failed(format!("Failed to list columns of {}", target), e))?;

    rows.iter()
        .map(|row| row.get_field("COLUMN_NAME", Some(&target.table)))
        .collect()
}

/// Primary key columns with their declared types, in key order.
pub async fn primary_keys(pool: &MySqlPool, target: &TableTarget) -> Result<Vec<KeyColumn>> {
    let rows = sqlx::query(
        r#"
        SELECT
            CAST(k.COLUMN_NAME AS CHAR) AS COLUMN_NAME,
            CAST(c.COLUMN_TYPE AS CHAR) AS COLUMN_TYPE
        FROM INFORMATION_SCHEMA.KEY_COLUMN_USAGE k
        JOIN INFORMATION_SCHEMA.COLUMNS c
            ON c.TABLE_SCHEMA = k.TABLE_SCHEMA
            AND c.TABLE_NAME = k.TABLE_NAME
            AND c.COLUMN_NAME = k.COLUMN_NAME
        WHERE k.TABLE_SCHEMA = ?
            AND k.TABLE_NAME = ?
            AND k.CONSTRAINT_NAME = 'PRIMARY'
        ORDER BY k.ORDINAL_POSITION
        "#,
    )
    .bind(&target.database)
    .bind(&target.table)
    .fetch_all(pool)
    .await
    .map_err(|e| {
        CharScanError::query_failed(format!("Failed to read primary key of {}", target), e)
    })?;

    rows.iter()
        .map(|row| {
            let name: String = row.get_field("COLUMN_NAME", Some(&target.table))?;
            let data_type: String = row.get_field("COLUMN_TYPE", Some(&target.table))?;
            Ok(KeyColumn::new(name, data_type))
        })
        .collect()
}

/// Columns declared with one of [`TEXT_COLUMN_TYPES`], in ordinal order.
pub async fn text_columns(pool: &MySqlPool, target: &TableTarget) -> Result<Vec<String>> {
    let sql = text_columns_sql(TEXT_COLUMN_TYPES.len());
    let mut query = sqlx::query(&sql).bind(&target.database).bind(&target.table);
    for data_type in TEXT_COLUMN_TYPES {
        query = query.bind(*data_type);
    }

    let rows = query.fetch_all(pool).await.map_err(|e| {
        CharScanError::query_failed(format!("Failed to list text columns of {}", target), e)
    })?;

    rows.iter()
        .map(|row| row.get_field("COLUMN_NAME", Some(&target.table)))
        .collect()
}

/// Default character set and collation of the table.
///
/// # Errors
/// Returns `NotFound` if the table does not exist.
pub async fn table_collation(pool: &MySqlPool, target: &TableTarget) -> Result<TableCollation> {
    let row = sqlx::query(
        r#"
        SELECT
            CAST(CCSA.CHARACTER_SET_NAME AS CHAR) AS CHARACTER_SET_NAME,
            CAST(T.TABLE_COLLATION AS CHAR) AS TABLE_COLLATION
        FROM INFORMATION_SCHEMA.TABLES T
        LEFT JOIN INFORMATION_SCHEMA.COLLATION_CHARACTER_SET_APPLICABILITY CCSA
            ON T.TABLE_COLLATION = CCSA.COLLATION_NAME
        WHERE T.TABLE_SCHEMA = ? AND T.TABLE_NAME = ?
        "#,
    )
    .bind(&target.database)
    .bind(&target.table)
    .fetch_optional(pool)
    .await
    .map_err(|e| CharScanError::query_failed(format!("Failed to read collation of {}", target), e))?
    .ok_or_else(|| CharScanError::not_found(format!("table {}", target)))?;

    Ok(TableCollation {
        character_set: row.get_field("CHARACTER_SET_NAME", Some(&target.table))?,
        collation: row.get_field("TABLE_COLLATION", Some(&target.table))?,
    })
}

/// Column lookup restricted to `type_count` bound data types.
pub(crate) fn text_columns_sql(type_count: usize) -> String {
    let placeholders = vec!["?"; type_count].join(", ");
    format!(
        "SELECT CAST(COLUMN_NAME AS CHAR) AS COLUMN_NAME \
         FROM INFORMATION_SCHEMA.COLUMNS \
         WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ? AND DATA_TYPE IN ({}) \
         ORDER BY ORDINAL_POSITION",
        placeholders
    )
}
