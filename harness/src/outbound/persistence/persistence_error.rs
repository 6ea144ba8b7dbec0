//! Error mapping from pool and client failures to typed persistence errors.
//!
//! Server-side failures always pass through the SQLSTATE classifier, so a
//! caller never receives an opaque error when a code was available.

use sqlstate_classifier::{DatabaseException, ExceptionKind, classify};
use tracing::debug;

use crate::domain::ports::define_port_error;

use super::pool::PoolError;
use super::raw_error::{raw_error_from_diesel, raw_error_from_postgres};

define_port_error! {
    /// Failures raised by the PostgreSQL persistence adapter.
    pub enum PersistenceError {
        /// A connection could not be obtained.
        Connection { message: String } => "database connection failed: {message}",
        /// The server rejected a statement; carries the classified failure.
        Database { source: DatabaseException } => "database operation failed: {source}",
        /// Client-side failure with no server error attached.
        Query { message: String } => "database query failed: {message}",
    }
}

impl PersistenceError {
    /// Classified server failure, if the server reported one.
    pub fn database_exception(&self) -> Option<&DatabaseException> {
        match self {
            Self::Database { source } => Some(source),
            Self::Connection { .. } | Self::Query { .. } => None,
        }
    }

    /// Category of the server failure, if any.
    pub fn exception_kind(&self) -> Option<ExceptionKind> {
        self.database_exception().map(DatabaseException::kind)
    }
}

/// Map pool errors to connection failures.
pub fn map_pool_error(error: PoolError) -> PersistenceError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            PersistenceError::connection(message)
        }
    }
}

/// Map Diesel errors to persistence errors, classifying server failures.
pub fn map_diesel_error(error: diesel::result::Error) -> PersistenceError {
    use diesel::result::Error as DieselError;

    if let Some(raw) = raw_error_from_diesel(&error) {
        let exception = classify(&raw);
        debug!(
            kind = %exception.kind(),
            sql_state = exception.sql_state(),
            message = exception.message(),
            "diesel operation failed"
        );
        return PersistenceError::database(exception);
    }

    debug!(error = %error, "diesel operation failed");
    match error {
        DieselError::NotFound => PersistenceError::query("record not found"),
        DieselError::QueryBuilderError(_) => PersistenceError::query("database query error"),
        other => PersistenceError::query(other.to_string()),
    }
}

/// Map `tokio-postgres` errors to persistence errors, classifying server
/// failures with their exact SQLSTATE.
pub fn map_postgres_error(error: tokio_postgres::Error) -> PersistenceError {
    if let Some(raw) = raw_error_from_postgres(&error) {
        let exception = classify(&raw);
        debug!(
            kind = %exception.kind(),
            sql_state = exception.sql_state(),
            message = exception.message(),
            "postgres operation failed"
        );
        return PersistenceError::database(exception);
    }

    debug!(error = %error, "postgres operation failed");
    if error.is_closed() {
        PersistenceError::connection(error.to_string())
    } else {
        PersistenceError::query(error.to_string())
    }
}
