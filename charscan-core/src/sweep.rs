//! Whole-database sweep: length-mismatch counts and raw UTF-8 validation.
//!
//! Unlike the table scan this walks every table and every column, queries
//! each column in full without batching, and does not retry. Findings are
//! handed to the caller's sink as soon as they are found.

use crate::Result;
use crate::adapters::{FailurePolicy, ScanAdapter, SweepConfig};
use crate::models::{SweepFinding, SweepSummary, TableTarget};
use std::time::Instant;

/// Sweeps every table of `database`.
///
/// For each column in ordinal order the byte-length/character-length
/// mismatch count is queried; a non-zero count is reported. Then every
/// non-null value of every column is validated as UTF-8 and each invalid
/// value is reported with its lossy rendering.
///
/// # Errors
/// With [`FailurePolicy::Abort`] the first failing table ends the sweep with
/// its error. With [`FailurePolicy::SkipTable`] the failure is reported as
/// [`SweepFinding::TableFailed`] and the sweep continues; only the table
/// listing itself can then fail the sweep.
pub async fn sweep_database(
    adapter: &dyn ScanAdapter,
    database: &str,
    config: &SweepConfig,
    sink: &mut (dyn FnMut(SweepFinding) + Send),
) -> Result<SweepSummary> {
    let started = Instant::now();
    let tables = adapter.list_tables(database).await?;
    tracing::info!("Sweeping {} tables in {}", tables.len(), database);

    let mut summary = SweepSummary {
        database: database.to_string(),
        ..SweepSummary::default()
    };

    for table in tables {
        let target = TableTarget::new(database, table);
        match sweep_table(adapter, &target, &mut summary, sink).await {
            Ok(()) => summary.tables_scanned = summary.tables_scanned.saturating_add(1),
            Err(error) => match config.failure_policy {
                FailurePolicy::Abort => {
                    tracing::error!("Sweep of {} failed: {}", target, error);
                    return Err(error);
                }
                FailurePolicy::SkipTable => {
                    tracing::warn!("Skipping {} after error: {}", target, error);
                    summary.tables_failed = summary.tables_failed.saturating_add(1);
                    sink(SweepFinding::TableFailed {
                        table: target.table.clone(),
                        message: error.to_string(),
                    });
                }
            },
        }
    }

    tracing::info!(
        "Sweep of {} completed in {:.2}s: {} tables, {} columns, {} length mismatches, {} invalid UTF-8 values",
        database,
        started.elapsed().as_secs_f64(),
        summary.tables_scanned,
        summary.columns_checked,
        summary.length_mismatches,
        summary.invalid_utf8_values
    );

    Ok(summary)
}

async fn sweep_table(
    adapter: &dyn ScanAdapter,
    target: &TableTarget,
    summary: &mut SweepSummary,
    sink: &mut (dyn FnMut(SweepFinding) + Send),
) -> Result<()> {
    let columns = adapter.list_columns(target).await?;
    tracing::debug!("{}: checking {} columns", target, columns.len());

    for column in &columns {
        let count = adapter.length_mismatch_count(target, column).await?;
        summary.columns_checked = summary.columns_checked.saturating_add(1);
        if count > 0 {
            summary.length_mismatches = summary.length_mismatches.saturating_add(1);
            sink(SweepFinding::LengthMismatch {
                table: target.table.clone(),
                column: column.clone(),
                count,
            });
        }
    }

    for column in &columns {
        let mut invalid: u64 = 0;
        let mut visitor = |value: &[u8]| {
            if std::str::from_utf8(value).is_err() {
                invalid = invalid.saturating_add(1);
                sink(SweepFinding::InvalidUtf8 {
                    table: target.table.clone(),
                    column: column.clone(),
                    value: String::from_utf8_lossy(value).into_owned(),
                });
            }
        };
        let visited = adapter
            .visit_column_values(target, column, &mut visitor)
            .await?;
        summary.invalid_utf8_values = summary.invalid_utf8_values.saturating_add(invalid);
        tracing::trace!("{}.{}: validated {} values", target, column, visited);
    }

    Ok(())
}
