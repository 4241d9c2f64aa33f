//! Unit tests for the MySQL adapter that do not need a server.
//!
//! These tests verify:
//! - Statement text and identifier quoting
//! - Driver option construction from config and credentials

use super::connection::connect_options;
use super::introspection::text_columns_sql;
use super::scanning::{
    batch_sql, column_values_sql, compare_encodings_sql, key_bounds_sql, length_mismatch_sql,
    signed_bounds,
};
use crate::adapters::ConnectionConfig;
use crate::error::CharScanError;
use crate::models::TableTarget;
use crate::security::Credentials;

fn target() -> TableTarget {
    TableTarget::new("shop", "orders")
}

#[test]
fn test_key_bounds_sql_casts_to_signed() {
    assert_eq!(
        key_bounds_sql(&target(), "id", false),
        "SELECT CAST(MIN(`id`) AS SIGNED) AS min_id, CAST(MAX(`id`) AS SIGNED) AS max_id \
         FROM `shop`.`orders`"
    );
}

#[test]
fn test_key_bounds_sql_keeps_unsigned_keys_unsigned() {
    let sql = key_bounds_sql(&target(), "id", true);
    assert!(sql.starts_with("SELECT CAST(MIN(`id`) AS UNSIGNED) AS min_id"));
    assert!(sql.contains("CAST(MAX(`id`) AS UNSIGNED) AS max_id"));
}

#[test]
fn test_unsigned_bounds_within_i64_are_kept() {
    assert_eq!(signed_bounds(&target(), "id", 1, 42).unwrap(), (1, 42));
    assert_eq!(
        signed_bounds(&target(), "id", 0, 9_223_372_036_854_775_807).unwrap(),
        (0, i64::MAX)
    );
}

#[test]
fn test_unsigned_bounds_above_i64_are_rejected() {
    let error = signed_bounds(&target(), "id", 1, u64::MAX).unwrap_err();
    assert!(matches!(error, CharScanError::UnsupportedKey { .. }));
    assert!(error.to_string().contains("shop"));

    let error = signed_bounds(&target(), "id", 1, 9_223_372_036_854_775_808).unwrap_err();
    assert!(matches!(error, CharScanError::UnsupportedKey { .. }));
}

#[test]
fn test_batch_sql_uses_inclusive_range() {
    let sql = batch_sql(&target(), "id", "note");
    assert!(sql.starts_with("SELECT CAST(`id` AS SIGNED) AS key_value, `note` AS column_value"));
    assert!(sql.contains("FROM `shop`.`orders`"));
    assert!(sql.ends_with("WHERE `id` BETWEEN ? AND ?"));
}

#[test]
fn test_length_mismatch_sql() {
    assert_eq!(
        length_mismatch_sql(&target(), "note"),
        "SELECT COUNT(*) FROM `shop`.`orders` WHERE LENGTH(`note`) != CHAR_LENGTH(`note`) AND `note` IS NOT NULL"
    );
}

#[test]
fn test_column_values_sql() {
    assert_eq!(
        column_values_sql(&target(), "note"),
        "SELECT `note` AS column_value FROM `shop`.`orders`"
    );
}

#[test]
fn test_compare_encodings_sql_filters_high_bytes() {
    let sql = compare_encodings_sql(&target(), "note");
    assert!(sql.contains("CONVERT(CONVERT(`note` USING BINARY) USING latin1) AS as_latin1"));
    assert!(sql.contains("CONVERT(CONVERT(`note` USING BINARY) USING utf8mb4) AS as_utf8"));
    assert!(sql.ends_with("WHERE HEX(`note`) REGEXP '^(..)*[89A-F]'"));
}

#[test]
fn test_identifiers_with_backticks_are_escaped() {
    let target = TableTarget::new("sh`op", "ord`ers");
    let sql = column_values_sql(&target, "no`te");
    assert_eq!(sql, "SELECT `no``te` AS column_value FROM `sh``op`.`ord``ers`");
}

#[test]
fn test_text_columns_sql_placeholders() {
    let sql = text_columns_sql(3);
    assert!(sql.contains("DATA_TYPE IN (?, ?, ?)"));
    assert!(sql.ends_with("ORDER BY ORDINAL_POSITION"));
}

#[test]
fn test_connect_options_from_config() {
    let config = ConnectionConfig::new("db01.internal")
        .with_port(3307)
        .with_database("shop");
    let credentials = Credentials::new("scanner", Some("secret".to_string()));

    let options = connect_options(&config, &credentials);
    assert_eq!(options.get_host(), "db01.internal");
    assert_eq!(options.get_port(), 3307);
    assert_eq!(options.get_username(), "scanner");
    assert_eq!(options.get_database(), Some("shop"));
}

#[test]
fn test_connect_options_without_database() {
    let config = ConnectionConfig::new("localhost");
    let credentials = Credentials::new("root", None);

    let options = connect_options(&config, &credentials);
    assert_eq!(options.get_port(), 3306);
    assert_eq!(options.get_database(), None);
}
