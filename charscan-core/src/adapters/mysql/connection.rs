//! Session setup and server identification.
//!
//! # Security Features
//! - Credentials go straight into `MySqlConnectOptions`; nothing builds a URL
//! - Statement logging is disabled so values never reach the log
//! - Every session is read-only with a server-side statement limit

use super::{ConnectionConfig, MySqlAdapter};
use crate::Result;
use crate::error::CharScanError;
use crate::models::ConnectionStatus;
use crate::security::Credentials;
use sqlx::ConnectOptions;
use sqlx::MySqlPool;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};

impl MySqlAdapter {
    /// Opens the scanning connection and identifies the server.
    ///
    /// # Errors
    /// Returns error if:
    /// - The configuration is invalid
    /// - The server cannot be reached or rejects the credentials
    /// - The liveness probe fails
    pub async fn connect(
        config: &ConnectionConfig,
        credentials: &Credentials,
    ) -> Result<(Self, ConnectionStatus)> {
        config.validate()?;

        let options = connect_options(config, credentials);
        let pool = create_pool(options, config).await?;

        let adapter = Self {
            pool,
            config: config.clone(),
        };
        let status = adapter.server_status().await?;

        tracing::info!(
            "Connected to {}:{} (server {})",
            status.host,
            status.port,
            status.server_hostname
        );
        Ok((adapter, status))
    }

    /// Probes the connection and reads `@@hostname`.
    ///
    /// # Errors
    /// Returns error if either statement fails
    pub async fn server_status(&self) -> Result<ConnectionStatus> {
        let alive: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                CharScanError::connection_failed(
                    format!("Liveness probe against {} failed", self.config),
                    e,
                )
            })?;

        if alive != 1 {
            return Err(CharScanError::configuration(
                "Basic connectivity test failed: unexpected result",
            ));
        }

        let server_hostname: String = sqlx::query_scalar("SELECT CAST(@@hostname AS CHAR)")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| CharScanError::query_failed("Failed to read @@hostname", e))?;

        Ok(ConnectionStatus {
            host: self.config.host.clone(),
            port: self.config.port,
            server_hostname,
        })
    }

    /// Closes the connection gracefully.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Builds driver options from the configuration and resolved credentials.
pub fn connect_options(
    config: &ConnectionConfig,
    credentials: &Credentials,
) -> MySqlConnectOptions {
    let mut options = MySqlConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(credentials.username())
        .charset("utf8mb4");

    if let Some(password) = credentials.expose_password() {
        options = options.password(password);
    }
    if let Some(database) = &config.database {
        options = options.database(database);
    }

    options.disable_statement_logging()
}

/// Creates a one-connection pool with read-only session settings.
async fn create_pool(options: MySqlConnectOptions, config: &ConnectionConfig) -> Result<MySqlPool> {
    let query_timeout_ms = config.query_timeout.as_millis();
    let read_only = config.read_only;

    MySqlPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(config.connect_timeout)
        .test_before_acquire(true)
        .after_connect(move |conn, _meta| {
            Box::pin(async move {
                sqlx::query(&format!("SET max_execution_time = {}", query_timeout_ms))
                    .execute(&mut *conn)
                    .await?;

                if read_only {
                    sqlx::query("SET SESSION TRANSACTION READ ONLY")
                        .execute(&mut *conn)
                        .await?;
                }

                sqlx::query("SET time_zone = '+00:00'")
                    .execute(&mut *conn)
                    .await?;

                Ok(())
            })
        })
        .connect_with(options)
        .await
        .map_err(|e| {
            CharScanError::connection_failed(
                format!("Failed to connect to {}:{}", config.host, config.port),
                e,
            )
        })
}
