//! Rendering of scan results to a text stream.
//!
//! Text output follows the layout operators already grep for ("Current
//! table:", "Column:", "Count of records that need to be fixed:"). Names are
//! blue, counts and failures red, success green. Colors are dropped
//! automatically when the stream is not a terminal.
//!
//! JSON output writes one document per line.

use crate::Result;
use crate::adapters::OutputFormat;
use crate::error::CharScanError;
use crate::models::{
    ConnectionStatus, EncodingComparison, SweepFinding, SweepSummary, TableCollation,
    TableReport, TableTarget,
};
use console::style;
use serde::Serialize;
use std::io::Write;

const LATIN1_WIDTH: usize = 23;
const UTF8_WIDTH: usize = 14;

/// Writes reports in the configured [`OutputFormat`].
pub struct Reporter<W: Write> {
    out: W,
    format: OutputFormat,
}

impl<W: Write> Reporter<W> {
    /// Creates a reporter over `out`.
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self { out, format }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Confirms a successful connection.
    pub fn connection_status(&mut self, status: &ConnectionStatus) -> Result<()> {
        match self.format {
            OutputFormat::Json => self.json(&serde_json::json!({ "connection": status })),
            OutputFormat::Text => self.text(format_args!(
                "Connected to {} ({}): {}\n\n",
                status.host,
                status.server_hostname,
                style("✔").green()
            )),
        }
    }

    /// Reports a failed connection attempt.
    pub fn connection_failed(&mut self, host: &str) -> Result<()> {
        match self.format {
            OutputFormat::Json => self.json(&serde_json::json!({
                "connection": { "host": host, "connected": false }
            })),
            OutputFormat::Text => self.text(format_args!(
                "Failed to connect to {}: {}\n\n",
                host,
                style("✘").red()
            )),
        }
    }

    /// Lists database names, one per line.
    pub fn databases(&mut self, databases: &[String]) -> Result<()> {
        match self.format {
            OutputFormat::Json => self.json(&serde_json::json!({ "databases": databases })),
            OutputFormat::Text => {
                for database in databases {
                    self.text(format_args!("{}\n", database))?;
                }
                Ok(())
            }
        }
    }

    /// Prints the default character set and collation of a table.
    pub fn collation(&mut self, target: &TableTarget, collation: &TableCollation) -> Result<()> {
        match self.format {
            OutputFormat::Json => self.json(&serde_json::json!({
                "table": target,
                "character_set": collation.character_set,
                "collation": collation.collation,
            })),
            OutputFormat::Text => self.text(format_args!(
                "Default character set: {}\nDefault collation: {}\n\n",
                style(collation.character_set.as_deref().unwrap_or("(none)")).red(),
                style(collation.collation.as_deref().unwrap_or("(none)")).red()
            )),
        }
    }

    /// Prints per-column offending IDs and the elapsed time of a table scan.
    pub fn table_report(&mut self, report: &TableReport) -> Result<()> {
        if self.format == OutputFormat::Json {
            return self.json(report);
        }

        for findings in &report.findings {
            self.text(format_args!(
                "\nCurrent table: {}\nColumn: {}\nCount of records that need to be fixed: {}\n\n",
                style(&report.target.table).blue(),
                style(&findings.column).blue(),
                style(findings.count).red()
            ))?;
            self.text(format_args!("Offending IDs:\n{}\n", format_ids(&findings.ids)))?;
            if findings.truncated {
                self.text(format_args!(
                    "(showing first {} of {})\n",
                    findings.ids.len(),
                    findings.count
                ))?;
            }
            self.text(format_args!("\n"))?;
        }

        self.text(format_args!("Time taken: {} seconds\n", report.elapsed_secs))
    }

    /// Prints a single sweep finding as soon as it is found.
    pub fn sweep_finding(&mut self, finding: &SweepFinding) -> Result<()> {
        if self.format == OutputFormat::Json {
            return self.json(finding);
        }

        match finding {
            SweepFinding::LengthMismatch {
                table,
                column,
                count,
            } => self.text(format_args!(
                "\nCurrent table: {}\nColumn: {}\nCount of records that need to be fixed: {}\n\n",
                style(table).blue(),
                style(column).blue(),
                style(count).red()
            )),
            SweepFinding::InvalidUtf8 {
                table,
                column,
                value,
            } => self.text(format_args!(
                "\nNon-UTF8 character found in table: {}, column: {}, value: {}\n\n",
                style(table).blue(),
                style(column).blue(),
                style(value).red()
            )),
            SweepFinding::TableFailed { table, message } => self.text(format_args!(
                "\nSkipped table {}: {}\n\n",
                style(table).blue(),
                style(message).red()
            )),
        }
    }

    /// Prints the closing counters of a sweep.
    pub fn sweep_summary(&mut self, summary: &SweepSummary) -> Result<()> {
        match self.format {
            OutputFormat::Json => self.json(&serde_json::json!({ "summary": summary })),
            OutputFormat::Text => self.text(format_args!(
                "Swept {}: {} tables, {} columns, {} length mismatches, {} invalid UTF-8 values{}\n",
                style(&summary.database).blue(),
                summary.tables_scanned,
                summary.columns_checked,
                style(summary.length_mismatches).red(),
                style(summary.invalid_utf8_values).red(),
                if summary.tables_failed > 0 {
                    format!(", {} tables skipped", summary.tables_failed)
                } else {
                    String::new()
                }
            )),
        }
    }

    /// Prints stored values reinterpreted as latin1 and as utf8.
    pub fn encoding_comparison(&mut self, rows: &[EncodingComparison]) -> Result<()> {
        if self.format == OutputFormat::Json {
            return self.json(&serde_json::json!({ "comparisons": rows }));
        }

        let border = format!(
            "+{}+{}+\n",
            "-".repeat(LATIN1_WIDTH.saturating_add(2)),
            "-".repeat(UTF8_WIDTH.saturating_add(2))
        );
        self.text(format_args!("{}", border))?;
        self.text(format_args!(
            "| {:<lw$} | {:<uw$} |\n",
            "latin1",
            "utf8",
            lw = LATIN1_WIDTH,
            uw = UTF8_WIDTH
        ))?;
        self.text(format_args!("{}", border))?;
        for row in rows {
            self.text(format_args!(
                "| {:<lw$} | {:<uw$} |\n",
                row.latin1,
                row.utf8,
                lw = LATIN1_WIDTH,
                uw = UTF8_WIDTH
            ))?;
        }
        self.text(format_args!("{}", border))
    }

    fn text(&mut self, args: std::fmt::Arguments<'_>) -> Result<()> {
        self.out.write_fmt(args).map_err(|e| CharScanError::Io {
            context: "Failed to write report".to_string(),
            source: e,
        })
    }

    fn json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        serde_json::to_writer(&mut self.out, value).map_err(|e| CharScanError::Serialization {
            context: "Failed to serialize report".to_string(),
            source: e,
        })?;
        self.text(format_args!("\n"))
    }
}

/// Formats IDs as a bracketed, space-separated list: `[1 5 9]`.
fn format_ids(ids: &[i64]) -> String {
    let joined: Vec<String> = ids.iter().map(ToString::to_string).collect();
    format!("[{}]", joined.join(" "))
}
