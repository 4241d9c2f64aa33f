//! MySQL character-encoding scanner.
//!
//! This binary connects to a MySQL server and reports text that is likely
//! mis-encoded: Latin-1/CP-1252 values holding C1 control characters or
//! code points outside those character sets, columns whose byte length and
//! character length disagree, and values that are not valid UTF-8.
//!
//! # Security Guarantees
//! - Read-only session; only SELECT statements are issued
//! - Passwords come from an option file, the environment or a prompt, never argv
//! - Credentials are never logged

mod credentials;

use charscan_core::adapters::ScanAdapter;
use charscan_core::adapters::config::{
    DEFAULT_BATCH_SIZE, DEFAULT_MAX_ATTEMPTS, DEFAULT_MYSQL_PORT, DEFAULT_QUERY_TIMEOUT_SECS,
};
use charscan_core::adapters::mysql::MySqlAdapter;
use charscan_core::{
    ConnectionConfig, FailurePolicy, OutputFormat, Reporter, RetryPolicy, ScanConfig,
    SweepConfig, SweepFinding, TableTarget, init_logging, scan_table, sweep_database,
};
use clap::{Args, CommandFactory, Parser};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "charscan")]
#[command(about = "Scan MySQL data for character-encoding inconsistencies")]
#[command(version)]
#[command(long_about = "
charscan - MySQL character-encoding scanner

Modes, in order of precedence:
  --show                        list databases
  -d DB -t TABLE --compare COL  show offending values read as latin1 and utf8
  -d DB -t TABLE --scan         batched scan for unusual Latin-1/CP-1252 text
  -d DB -t TABLE                default character set and collation
  -d DB                         length-mismatch and UTF-8 sweep of every table

CREDENTIALS:
  user and password are read from ~/.my.cnf ([client] section or bare
  lines), then MYSQL_USER / MYSQL_PASSWORD. Use -p to type the password.

EXAMPLES:
  charscan -s db01 --show
  charscan -s db01 -d shop -t orders --scan
  charscan -s db01 -d shop --skip-failed-tables --format json
")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    /// MySQL server host
    #[arg(short = 's', long, env = "MYSQL_HOST")]
    pub source: Option<String>,

    /// MySQL server port
    #[arg(short = 'P', long, default_value_t = DEFAULT_MYSQL_PORT)]
    pub port: u16,

    /// Database (schema) to inspect
    #[arg(short, long)]
    pub database: Option<String>,

    /// Table to inspect
    #[arg(short, long)]
    pub table: Option<String>,

    /// List databases and exit
    #[arg(long)]
    pub show: bool,

    /// Run the batched Latin-1/CP-1252 scan instead of the collation lookup
    #[arg(long)]
    pub scan: bool,

    /// Show offending values of COLUMN read back as latin1 and utf8
    #[arg(long, value_name = "COLUMN")]
    pub compare: Option<String>,

    /// Width of one primary-key batch
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: u64,

    /// Attempts per batch query before the scan aborts
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    pub max_retries: u32,

    /// Store at most N offending IDs per column (counts stay exact)
    #[arg(long, value_name = "N")]
    pub max_ids_per_column: Option<usize>,

    /// Report failing tables during a sweep and continue
    #[arg(long)]
    pub skip_failed_tables: bool,

    /// Report format
    #[arg(long, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// MySQL option file holding user and password
    #[arg(long, value_name = "PATH")]
    pub defaults_file: Option<PathBuf>,

    /// Login user, overriding the option file
    #[arg(short, long, env = "MYSQL_USER")]
    pub user: Option<String>,

    /// Prompt for the password
    #[arg(short = 'p', long)]
    pub password_prompt: bool,

    /// Server-side statement limit in seconds, 0 for none
    /// [default: 600, or none for the whole-database sweep]
    #[arg(long, value_name = "SECONDS")]
    pub query_timeout: Option<u64>,
}

/// Global arguments shared across all commands
#[derive(Args)]
pub struct GlobalArgs {
    /// Increase verbosity
    #[arg(
        short,
        long,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv)"
    )]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, help = "Suppress all log output except errors")]
    pub quiet: bool,
}

/// What a run does, derived from the flags.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Mode {
    ListDatabases,
    Sweep(String),
    Collation(TableTarget),
    Scan(TableTarget),
    Compare(TableTarget, String),
}

impl Cli {
    /// Resolves the run mode.
    ///
    /// `None` means the flags name no runnable mode: no `--show` and no
    /// database, a table without a database, or `--compare` without a table.
    /// `--scan` without a table falls through to the sweep.
    fn mode(&self) -> Option<Mode> {
        if self.show {
            return Some(Mode::ListDatabases);
        }
        let database = self.database.clone()?;

        let Some(table) = self.table.clone() else {
            if self.compare.is_some() {
                return None;
            }
            return Some(Mode::Sweep(database));
        };
        let target = TableTarget::new(database, table);

        Some(match &self.compare {
            Some(column) => Mode::Compare(target, column.clone()),
            None if self.scan => Mode::Scan(target),
            None => Mode::Collation(target),
        })
    }

    /// The sweep reads whole columns unbatched, so it runs without a
    /// statement limit unless `--query-timeout` sets one.
    fn connection_config(&self, host: &str, mode: &Mode) -> ConnectionConfig {
        let default_timeout = match mode {
            Mode::Sweep(_) => 0,
            _ => DEFAULT_QUERY_TIMEOUT_SECS,
        };
        let timeout = self.query_timeout.unwrap_or(default_timeout);
        let config = ConnectionConfig::new(host)
            .with_port(self.port)
            .with_query_timeout(Duration::from_secs(timeout));
        match &self.database {
            Some(database) => config.with_database(database),
            None => config,
        }
    }

    fn scan_config(&self) -> ScanConfig {
        let config = ScanConfig::new()
            .with_batch_size(self.batch_size)
            .with_retry(RetryPolicy::default().with_max_attempts(self.max_retries));
        match self.max_ids_per_column {
            Some(cap) => config.with_max_ids_per_column(cap),
            None => config,
        }
    }

    fn sweep_config(&self) -> SweepConfig {
        let policy = if self.skip_failed_tables {
            FailurePolicy::SkipTable
        } else {
            FailurePolicy::Abort
        };
        SweepConfig::default().with_failure_policy(policy)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.global.verbose, cli.global.quiet)?;

    let (Some(host), Some(mode)) = (cli.source.clone(), cli.mode()) else {
        eprintln!("{}", Cli::command().render_usage());
        eprintln!("Use --help for usage information");
        std::process::exit(1);
    };

    run(&cli, &host, mode).await.inspect_err(|e| {
        error!("{:#}", e);
    })
}

async fn run(cli: &Cli, host: &str, mode: Mode) -> anyhow::Result<()> {
    let credentials =
        credentials::provider(cli.defaults_file.clone(), cli.user.as_deref(), cli.password_prompt)
            .resolve()?;
    let config = cli.connection_config(host, &mode);
    let mut reporter = Reporter::new(std::io::stdout(), cli.format);

    let adapter = match MySqlAdapter::connect(&config, &credentials).await {
        Ok((adapter, status)) => {
            reporter.connection_status(&status)?;
            adapter
        }
        Err(e) => {
            reporter.connection_failed(host)?;
            return Err(e.into());
        }
    };
    drop(credentials);

    let outcome = dispatch(&adapter, cli, mode, &mut reporter).await;
    adapter.close().await;
    outcome
}

async fn dispatch(
    adapter: &dyn ScanAdapter,
    cli: &Cli,
    mode: Mode,
    reporter: &mut Reporter<std::io::Stdout>,
) -> anyhow::Result<()> {
    match mode {
        Mode::ListDatabases => {
            let databases = adapter.list_databases().await?;
            reporter.databases(&databases)?;
        }
        Mode::Collation(target) => {
            let collation = adapter.table_collation(&target).await?;
            reporter.collation(&target, &collation)?;
        }
        Mode::Scan(target) => {
            let report = scan_table(adapter, &target, &cli.scan_config()).await?;
            reporter.table_report(&report)?;
        }
        Mode::Compare(target, column) => {
            let rows = adapter.compare_encodings(&target, &column).await?;
            info!("{} values of {}.{} contain high bytes", rows.len(), target, column);
            reporter.encoding_comparison(&rows)?;
        }
        Mode::Sweep(database) => {
            let mut write_error = None;
            let mut sink = |finding: SweepFinding| {
                if let Err(e) = reporter.sweep_finding(&finding) {
                    write_error.get_or_insert(e);
                }
            };
            let summary = sweep_database(adapter, &database, &cli.sweep_config(), &mut sink).await?;
            if let Some(e) = write_error {
                return Err(e.into());
            }
            reporter.sweep_summary(&summary)?;
        }
    }
    Ok(())
}
