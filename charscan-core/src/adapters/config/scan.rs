//! Scan, retry and sweep configuration.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Width of one primary-key batch.
pub const DEFAULT_BATCH_SIZE: u64 = 80_000;

/// Attempts per batch query before the scan is aborted.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Bounded retry with linearly increasing backoff.
///
/// After failed attempt `n` the caller sleeps `n * base_delay`, so the
/// default policy waits 1s, 2s, 3s and 4s between its five attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Backoff unit
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after the given failed attempt (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }

    /// Builder method to set the attempt budget.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }
}

/// Settings for a batched single-table scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Number of key values covered by one batch
    pub batch_size: u64,
    /// Retry behavior for each batch query
    pub retry: RetryPolicy,
    /// Cap on stored offending IDs per column; counts stay exact
    pub max_ids_per_column: Option<usize>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            retry: RetryPolicy::default(),
            max_ids_per_column: None,
        }
    }
}

impl ScanConfig {
    /// Creates a scan config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the batch width.
    pub fn with_batch_size(mut self, batch_size: u64) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Builder method to set the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Builder method to cap stored IDs per column.
    pub fn with_max_ids_per_column(mut self, cap: usize) -> Self {
        self.max_ids_per_column = Some(cap);
        self
    }

    /// Validates scan settings.
    ///
    /// # Errors
    /// Returns error if the batch size or attempt budget is zero, or the
    /// batch size does not fit a signed 64-bit key.
    pub fn validate(&self) -> crate::Result<()> {
        if self.batch_size == 0 {
            return Err(crate::error::CharScanError::configuration(
                "batch_size must be greater than 0",
            ));
        }
        if i64::try_from(self.batch_size).is_err() {
            return Err(crate::error::CharScanError::configuration(
                "batch_size must fit in a signed 64-bit integer",
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(crate::error::CharScanError::configuration(
                "max_attempts must be at least 1",
            ));
        }
        Ok(())
    }
}

/// What the whole-database sweep does when one table fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop the run on the first failing table
    #[default]
    Abort,
    /// Report the failure and continue with the next table
    SkipTable,
}

/// Settings for the whole-database sweep.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Per-table failure handling
    pub failure_policy: FailurePolicy,
}

impl SweepConfig {
    /// Builder method to set the failure policy.
    pub fn with_failure_policy(mut self, failure_policy: FailurePolicy) -> Self {
        self.failure_policy = failure_policy;
        self
    }
}

/// Rendering of reports on stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Colored human-readable text
    #[default]
    Text,
    /// One JSON document per report
    Json,
}

impl FromStr for OutputFormat {
    type Err = crate::error::CharScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(crate::error::CharScanError::configuration(format!(
                "Unknown output format '{}': expected 'text' or 'json'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Json => f.write_str("json"),
        }
    }
}
