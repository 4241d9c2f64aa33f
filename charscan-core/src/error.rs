//! Error types with credential sanitization.
//!
//! Errors carry table and column context but never connection credentials.
//! Query errors from the driver are boxed as sources so callers can still
//! walk the chain when logging at debug level.

use thiserror::Error;

/// Main error type for charscan operations.
#[derive(Debug, Error)]
pub enum CharScanError {
    /// Connection, authentication or liveness probe failed
    #[error("Database connection failed: {context}")]
    Connection {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Table has no primary key, so it cannot be scanned by key range
    #[error("Table {database}.{table} has no primary key")]
    NoPrimaryKey { database: String, table: String },

    /// Primary key exists but cannot drive range batching
    #[error("Table {database}.{table} cannot be range-scanned: {reason}")]
    UnsupportedKey {
        database: String,
        table: String,
        reason: String,
    },

    /// Query execution failed
    #[error("Query execution failed: {context}")]
    Query {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A retried query failed on every attempt
    #[error("Query failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: Box<CharScanError>,
    },

    /// Metadata lookup returned no row
    #[error("Not found: {what}")]
    NotFound { what: String },

    /// Configuration or validation error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Credentials could not be resolved
    #[error("Credential resolution failed: {message}")]
    Credentials { message: String },

    /// I/O operation failed
    #[error("I/O operation failed: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Serialization failed
    #[error("Serialization failed: {context}")]
    Serialization {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results with `CharScanError`
pub type Result<T> = std::result::Result<T, CharScanError>;

impl CharScanError {
    /// Creates a connection error with sanitized context
    pub fn connection_failed<E>(context: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Connection {
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates a query error with context
    pub fn query_failed<E>(context: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Query {
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates a parsing error for a field extracted from a result row
    pub fn parse_field<E>(field_name: &str, table_context: Option<&str>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        let context = match table_context {
            Some(table) => format!(
                "Failed to parse field '{}' from result for table '{}'",
                field_name, table
            ),
            None => format!(
                "Failed to parse field '{}' from database result",
                field_name
            ),
        };
        Self::Query {
            context,
            source: Box::new(error),
        }
    }

    /// Creates a missing primary key error
    pub fn no_primary_key(database: impl Into<String>, table: impl Into<String>) -> Self {
        Self::NoPrimaryKey {
            database: database.into(),
            table: table.into(),
        }
    }

    /// Creates an unsupported key error
    pub fn unsupported_key(
        database: impl Into<String>,
        table: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::UnsupportedKey {
            database: database.into(),
            table: table.into(),
            reason: reason.into(),
        }
    }

    /// Creates a not-found error
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Creates a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a credentials error
    pub fn credentials(message: impl Into<String>) -> Self {
        Self::Credentials {
            message: message.into(),
        }
    }

    /// Wraps the final failure of a retried operation
    pub fn retries_exhausted(attempts: u32, last: Self) -> Self {
        Self::RetriesExhausted {
            attempts,
            source: Box::new(last),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_primary_key_message() {
        let error = CharScanError::no_primary_key("shop", "orders");
        assert_eq!(error.to_string(), "Table shop.orders has no primary key");
    }

    #[test]
    fn test_retries_exhausted_keeps_last_error() {
        let last = CharScanError::query_failed(
            "batch 1..=10 of shop.orders.note",
            std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset"),
        );
        let error = CharScanError::retries_exhausted(5, last);

        let message = error.to_string();
        assert!(message.contains("5 attempts"));
        assert!(message.contains("shop.orders.note"));
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn test_error_creation() {
        let error = CharScanError::configuration("batch_size must be greater than 0");
        assert!(error.to_string().contains("batch_size"));

        let error = CharScanError::not_found("collation for shop.orders");
        assert!(error.to_string().contains("shop.orders"));
    }
}
