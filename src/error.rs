//! Error types for db-sweeper.
//!
//! This module defines all error types using `thiserror` for ergonomic error handling.
//! Variants are split by how the sweep reacts to them: connection and lookup
//! failures abort, a failed statement is recorded and the sweep moves on.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SweepError {
    #[error("Missing required arguments: {}", missing.join(", "))]
    MissingArguments { missing: Vec<String> },

    #[error("Invalid catalog: {message}")]
    InvalidCatalog { message: String },

    #[error("Connection to '{schema}' failed: {message}")]
    Connection {
        schema: String,
        message: String,
        suggestion: String,
    },

    #[error("Connection not found: {schema}")]
    ConnectionNotFound { schema: String },

    #[error("Database error: {message}")]
    Database {
        message: String,
        /// e.g., "42P01" for undefined table
        sql_state: Option<String>,
    },
}

impl SweepError {
    /// Create a missing arguments error from the names of the absent flags.
    pub fn missing_arguments<I, S>(missing: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::MissingArguments {
            missing: missing.into_iter().map(Into::into).collect(),
        }
    }

    /// Create an invalid catalog error.
    pub fn invalid_catalog(message: impl Into<String>) -> Self {
        Self::InvalidCatalog {
            message: message.into(),
        }
    }

    /// Create a connection error with a helpful suggestion.
    pub fn connection(
        schema: impl Into<String>,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::Connection {
            schema: schema.into(),
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create a connection not found error.
    pub fn connection_not_found(schema: impl Into<String>) -> Self {
        Self::ConnectionNotFound {
            schema: schema.into(),
        }
    }

    /// Create a database error with optional SQL state.
    pub fn database(message: impl Into<String>, sql_state: Option<String>) -> Self {
        Self::Database {
            message: message.into(),
            sql_state,
        }
    }

    /// Get the suggestion for this error, if available.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Connection { suggestion, .. } => Some(suggestion),
            _ => None,
        }
    }
}

/// Convert sqlx errors raised by statements to SweepError.
///
/// Open failures never go through this conversion: the connector wraps them
/// in [`SweepError::Connection`] together with the schema name.
impl From<sqlx::Error> for SweepError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().map(|c| c.to_string());
                SweepError::database(db_err.message(), code)
            }
            sqlx::Error::PoolClosed => SweepError::database("Connection pool is closed", None),
            sqlx::Error::Io(io_err) => SweepError::database(format!("I/O error: {}", io_err), None),
            sqlx::Error::Protocol(msg) => {
                SweepError::database(format!("Protocol error: {}", msg), None)
            }
            other => SweepError::database(other.to_string(), None),
        }
    }
}

/// Result type alias for sweep operations.
pub type DbResult<T> = Result<T, SweepError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SweepError::connection("claimsvc", "refused", "Check the server");
        assert_eq!(err.to_string(), "Connection to 'claimsvc' failed: refused");
    }

    #[test]
    fn test_missing_arguments_lists_flags() {
        let err = SweepError::missing_arguments(["--username", "--port"]);
        assert_eq!(
            err.to_string(),
            "Missing required arguments: --username, --port"
        );
    }

    #[test]
    fn test_error_suggestion() {
        let err = SweepError::connection("loansvc", "refused", "Check credentials");
        assert_eq!(err.suggestion(), Some("Check credentials"));
        assert_eq!(SweepError::connection_not_found("x").suggestion(), None);
    }

    #[test]
    fn test_pool_closed_maps_to_database_error() {
        let err: SweepError = sqlx::Error::PoolClosed.into();
        assert!(matches!(err, SweepError::Database { sql_state: None, .. }));
    }
}
