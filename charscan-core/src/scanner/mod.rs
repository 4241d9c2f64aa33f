//! Batched primary-key range scan of a single table.
//!
//! The table's integer primary key interval is split into fixed-width
//! batches. Each batch is queried once per text column, one query at a time,
//! and every non-null value is classified with the Latin-1/CP-1252
//! predicates. Offending keys are collected per column.
//!
//! A batch query that keeps failing after the retry budget aborts the whole
//! scan; no partial report is produced.

mod batch;
mod retry;

pub use batch::BatchPlan;
pub use retry::with_retry;

use crate::Result;
use crate::adapters::{ScanAdapter, ScanConfig};
use crate::classify::is_offending_bytes;
use crate::error::CharScanError;
use crate::models::{KeyColumn, OffendingRecord, TableReport, TableTarget};
use std::time::Instant;

/// Scans `target` for values flagged by the Latin-1 or CP-1252 predicates.
///
/// # Errors
/// - `NoPrimaryKey` if the table has no primary key
/// - `UnsupportedKey` if the key is composite, not an integer type, or an
///   unsigned key beyond `i64::MAX`
/// - `RetriesExhausted` if a batch query fails on every attempt
/// - any error from the metadata queries
pub async fn scan_table(
    adapter: &dyn ScanAdapter,
    target: &TableTarget,
    config: &ScanConfig,
) -> Result<TableReport> {
    config.validate()?;
    let started = Instant::now();

    tracing::info!("Scanning {} for unusual Latin-1/CP-1252 values", target);

    let key = resolve_scan_key(adapter, target).await?;

    let Some((min_id, max_id)) = adapter.key_bounds(target, &key).await? else {
        tracing::info!("{} is empty, nothing to scan", target);
        return Ok(finish(TableReport::empty(target.clone(), Some(key.name)), started));
    };

    let columns = adapter.text_columns(target).await?;
    if columns.is_empty() {
        tracing::info!("{} has no text columns, nothing to scan", target);
        return Ok(finish(TableReport::empty(target.clone(), Some(key.name)), started));
    }

    let plan = BatchPlan::new(min_id, max_id, config.batch_size)?;
    tracing::debug!(
        "{}: key `{}` spans {}..={}, {} batches x {} columns",
        target,
        key.name,
        min_id,
        max_id,
        plan.remaining(),
        columns.len()
    );

    let mut record = OffendingRecord::new(config.max_ids_per_column);
    let mut batches_scanned: u64 = 0;
    let mut values_examined: u64 = 0;

    for range in plan {
        for column in &columns {
            let what = format!("{}.{} batch {}", target, column, range);
            let rows = with_retry(&config.retry, &what, || {
                adapter.fetch_batch(target, &key.name, column, range)
            })
            .await?;

            for row in rows {
                let Some(value) = row.value else { continue };
                values_examined = values_examined.saturating_add(1);
                if is_offending_bytes(&value) {
                    record.record(column, row.key);
                }
            }
        }
        batches_scanned = batches_scanned.saturating_add(1);
        tracing::trace!("{}: finished batch {}", target, range);
    }

    let report = TableReport {
        target: target.clone(),
        key_column: Some(key.name),
        findings: record.into_findings(),
        batches_scanned,
        values_examined,
        elapsed_secs: 0.0,
        scanned_at: chrono::Utc::now(),
    };
    let report = finish(report, started);

    tracing::info!(
        "Scanned {} in {:.2}s: {} batches, {} values, {} offending",
        target,
        report.elapsed_secs,
        report.batches_scanned,
        report.values_examined,
        report.total_offending()
    );

    Ok(report)
}

/// Resolves the single integer key column that drives batching.
async fn resolve_scan_key(adapter: &dyn ScanAdapter, target: &TableTarget) -> Result<KeyColumn> {
    let mut keys = adapter.primary_keys(target).await?;

    match keys.len() {
        0 => Err(CharScanError::no_primary_key(&target.database, &target.table)),
        1 => {
            let key = keys.remove(0);
            if key.is_integer() {
                Ok(key)
            } else {
                Err(CharScanError::unsupported_key(
                    &target.database,
                    &target.table,
                    format!(
                        "primary key `{}` is {}, range batching needs an integer key",
                        key.name, key.data_type
                    ),
                ))
            }
        }
        _ => {
            let names: Vec<&str> = keys.iter().map(|k| k.name.as_str()).collect();
            Err(CharScanError::unsupported_key(
                &target.database,
                &target.table,
                format!("composite primary key ({}) cannot be range-batched", names.join(", ")),
            ))
        }
    }
}

fn finish(mut report: TableReport, started: Instant) -> TableReport {
    report.elapsed_secs = started.elapsed().as_secs_f64();
    report.scanned_at = chrono::Utc::now();
    report
}
