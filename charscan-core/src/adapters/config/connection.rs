//! Database connection configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Standard MySQL port.
pub const DEFAULT_MYSQL_PORT: u16 = 3306;

/// Server-side statement limit for single-table work, in seconds.
pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 600;

/// Configuration for the single scanning connection.
///
/// # Security
/// This struct intentionally does NOT store the user or password. Those are
/// resolved by a `CredentialProvider` and never logged or serialized.
///
/// # Example
/// ```rust
/// use charscan_core::adapters::ConnectionConfig;
///
/// let config = ConnectionConfig::new("db01.internal")
///     .with_port(3307)
///     .with_database("shop");
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Database host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Default schema for the session
    pub database: Option<String>,
    /// Connection timeout duration
    pub connect_timeout: Duration,
    /// Server-side statement limit (`max_execution_time`); zero disables it
    pub query_timeout: Duration,
    /// Whether to open the session read-only
    pub read_only: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: DEFAULT_MYSQL_PORT,
            database: None,
            connect_timeout: Duration::from_secs(30),
            query_timeout: Duration::from_secs(DEFAULT_QUERY_TIMEOUT_SECS),
            read_only: true,
        }
    }
}

impl std::fmt::Display for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ConnectionConfig({}:{}{})",
            self.host,
            self.port,
            self.database
                .as_ref()
                .map_or_else(String::new, |db| format!("/{}", db))
        )
    }
}

impl ConnectionConfig {
    /// Validates connection configuration parameters.
    ///
    /// # Errors
    /// Returns error if configuration values are invalid
    pub fn validate(&self) -> crate::Result<()> {
        if self.host.trim().is_empty() {
            return Err(crate::error::CharScanError::configuration(
                "host cannot be empty",
            ));
        }

        if self.port == 0 {
            return Err(crate::error::CharScanError::configuration(
                "port must be greater than 0",
            ));
        }

        if let Some(database) = &self.database
            && (database.is_empty() || database.len() > 64)
        {
            return Err(crate::error::CharScanError::configuration(format!(
                "Invalid database name length: must be 1-64 characters, got {}",
                database.len()
            )));
        }

        if self.connect_timeout.is_zero() {
            return Err(crate::error::CharScanError::configuration(
                "connect_timeout must be greater than 0",
            ));
        }

        if self.query_timeout.as_millis() > u128::from(u32::MAX) {
            return Err(crate::error::CharScanError::configuration(format!(
                "query_timeout must fit max_execution_time ({} ms), got {:?}",
                u32::MAX,
                self.query_timeout
            )));
        }

        Ok(())
    }

    /// Creates a new connection config with safe defaults.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Default::default()
        }
    }

    /// Builder method to set port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Builder method to set database.
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Builder method to set the server-side query timeout.
    ///
    /// `Duration::ZERO` lifts the limit, which MySQL spells
    /// `max_execution_time = 0`.
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }
}
