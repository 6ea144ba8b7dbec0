//! Translation of client library errors into [`RawDatabaseError`] values.
//!
//! The `tokio-postgres` client exposes the server's SQLSTATE and every
//! protocol field. Diesel only exposes a coarse [`DatabaseErrorKind`], so the code is
//! reconstructed from the kind and left empty when the kind is `Unknown`.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tokio_postgres::error::DbError;
use sqlstate_classifier::{PgSqlState, RawDatabaseError, fields};

/// SQLSTATE implied by a Diesel error kind.
fn sql_state_for_kind(kind: &DatabaseErrorKind) -> Option<PgSqlState> {
    match kind {
        DatabaseErrorKind::UniqueViolation => Some(PgSqlState::UniqueViolation),
        DatabaseErrorKind::ForeignKeyViolation => Some(PgSqlState::ForeignKeyViolation),
        DatabaseErrorKind::NotNullViolation => Some(PgSqlState::NotNullViolation),
        DatabaseErrorKind::CheckViolation => Some(PgSqlState::CheckViolation),
        DatabaseErrorKind::SerializationFailure => Some(PgSqlState::SerializationFailure),
        DatabaseErrorKind::ReadOnlyTransaction => Some(PgSqlState::ReadOnlySqlTransaction),
        DatabaseErrorKind::ClosedConnection => Some(PgSqlState::ConnectionDoesNotExist),
        _ => None,
    }
}

fn with_optional_fields<'a>(
    raw: RawDatabaseError,
    optional: impl IntoIterator<Item = (&'static str, Option<&'a str>)>,
) -> RawDatabaseError {
    optional
        .into_iter()
        .fold(raw, |raw, (name, value)| match value {
            Some(value) => raw.with_field(name, value),
            None => raw,
        })
}

/// Raw form of a Diesel database error.
///
/// Returns `None` for errors that did not come from the server, such as
/// `NotFound` or query builder failures.
pub fn raw_error_from_diesel(error: &DieselError) -> Option<RawDatabaseError> {
    let DieselError::DatabaseError(kind, info) = error else {
        return None;
    };
    let raw = RawDatabaseError::new(
        sql_state_for_kind(kind).map(PgSqlState::code),
        Some(info.message()),
    );
    Some(with_optional_fields(
        raw,
        [
            (fields::DETAIL, info.details()),
            (fields::HINT, info.hint()),
            (fields::TABLE, info.table_name()),
            (fields::COLUMN, info.column_name()),
            (fields::CONSTRAINT, info.constraint_name()),
        ],
    ))
}

/// Raw form of a server error reported through `tokio-postgres`.
pub fn raw_error_from_db_error(error: &DbError) -> RawDatabaseError {
    let raw = RawDatabaseError::new(Some(error.code().code()), Some(error.message()))
        .with_field(fields::SEVERITY, error.severity());
    with_optional_fields(
        raw,
        [
            (fields::DETAIL, error.detail()),
            (fields::HINT, error.hint()),
            (fields::SCHEMA, error.schema()),
            (fields::TABLE, error.table()),
            (fields::COLUMN, error.column()),
            (fields::DATATYPE, error.datatype()),
            (fields::CONSTRAINT, error.constraint()),
            (fields::ROUTINE, error.routine()),
        ],
    )
}

/// Raw form of a `tokio-postgres` client error, when the server reported one.
pub fn raw_error_from_postgres(error: &tokio_postgres::Error) -> Option<RawDatabaseError> {
    error.as_db_error().map(raw_error_from_db_error)
}
