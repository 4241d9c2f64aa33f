//! Configuration types for the connector, scanner and sweep.
//!
//! - `ConnectionConfig`: where to connect and session limits
//! - `ScanConfig` / `RetryPolicy`: batched table scan settings
//! - `SweepConfig` / `FailurePolicy`: whole-database sweep settings
//! - `OutputFormat`: text or JSON rendering
//!
//! All of these are built once at startup and passed by reference. None of
//! them store passwords; those live in `security::Credentials`.

mod connection;
mod scan;

pub use connection::{ConnectionConfig, DEFAULT_MYSQL_PORT, DEFAULT_QUERY_TIMEOUT_SECS};
pub use scan::{
    DEFAULT_BATCH_SIZE, DEFAULT_MAX_ATTEMPTS, FailurePolicy, OutputFormat, RetryPolicy,
    ScanConfig, SweepConfig,
};
