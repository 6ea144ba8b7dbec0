//! Typed database exception produced by classification.

use serde::Serialize;

use crate::raw::{RawDatabaseError, fields};

/// Closed set of database failure categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExceptionKind {
    /// Payload or data integrity problem (SQLSTATE class `22`), for example
    /// string truncation or an out-of-range number.
    Data,
    /// A `CHECK` constraint rejected the row.
    CheckViolation,
    /// A unique index or primary key rejected the row.
    UniqueViolation,
    /// A foreign key reference could not be satisfied.
    ForeignKeyViolation,
    /// A `NOT NULL` column received a null.
    NotNullViolation,
    /// Any other integrity constraint violation (SQLSTATE class `23`).
    IntegrityConstraintViolation,
    /// The server rolled the transaction back (serialization failure,
    /// deadlock). Usually safe to retry.
    TransactionRollback,
    /// The connection to the server was lost or never established.
    ConnectionFailure,
    /// Anything the classifier does not recognise, including a missing code.
    Generic,
}

impl ExceptionKind {
    /// Whether this kind belongs to the integrity constraint family.
    #[must_use]
    pub const fn is_constraint_violation(self) -> bool {
        matches!(
            self,
            Self::CheckViolation
                | Self::UniqueViolation
                | Self::ForeignKeyViolation
                | Self::NotNullViolation
                | Self::IntegrityConstraintViolation
        )
    }

    /// Stable machine-readable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Data => "data",
            Self::CheckViolation => "check_violation",
            Self::UniqueViolation => "unique_violation",
            Self::ForeignKeyViolation => "foreign_key_violation",
            Self::NotNullViolation => "not_null_violation",
            Self::IntegrityConstraintViolation => "integrity_constraint_violation",
            Self::TransactionRollback => "transaction_rollback",
            Self::ConnectionFailure => "connection_failure",
            Self::Generic => "generic",
        }
    }
}

impl std::fmt::Display for ExceptionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Database failure carrying its category plus the original SQL state and
/// message.
///
/// ## Invariants
/// - `sql_state` and `message` are copied verbatim from the raw error and may
///   both be absent.
/// - Values are never mutated after construction.
///
/// # Examples
/// ```
/// use sqlstate_classifier::{DatabaseException, ExceptionKind};
///
/// let err = DatabaseException::new(ExceptionKind::UniqueViolation, Some("23505"), None);
/// assert!(err.is_constraint_violation());
/// assert_eq!(err.message(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(rename_all = "camelCase")]
#[error(
    "{kind} database error (sqlstate {state}): {text}",
    state = .sql_state.as_deref().unwrap_or("unknown"),
    text = .message.as_deref().unwrap_or("no message")
)]
pub struct DatabaseException {
    kind: ExceptionKind,
    sql_state: Option<String>,
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    constraint: Option<String>,
}

impl DatabaseException {
    /// Build an exception of `kind` with the given state and message.
    #[must_use]
    pub fn new(kind: ExceptionKind, sql_state: Option<&str>, message: Option<&str>) -> Self {
        Self {
            kind,
            sql_state: sql_state.map(str::to_owned),
            message: message.map(str::to_owned),
            detail: None,
            constraint: None,
        }
    }

    pub(crate) fn from_raw(kind: ExceptionKind, raw: &RawDatabaseError) -> Self {
        Self {
            kind,
            sql_state: raw.sql_state().map(str::to_owned),
            message: raw.message().map(str::to_owned),
            detail: raw.field(fields::DETAIL).map(str::to_owned),
            constraint: raw.field(fields::CONSTRAINT).map(str::to_owned),
        }
    }

    /// Category of the failure.
    #[must_use]
    pub const fn kind(&self) -> ExceptionKind {
        self.kind
    }

    /// SQLSTATE code reported by the server.
    #[must_use]
    pub fn sql_state(&self) -> Option<&str> {
        self.sql_state.as_deref()
    }

    /// Primary message reported by the server.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Detail message, when the server supplied one.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// Name of the violated constraint, when the server supplied one.
    #[must_use]
    pub fn constraint(&self) -> Option<&str> {
        self.constraint.as_deref()
    }

    /// Whether the failure is any integrity constraint violation.
    #[must_use]
    pub const fn is_constraint_violation(&self) -> bool {
        self.kind.is_constraint_violation()
    }
}

#[cfg(test)]
#[expect(
    clippy::expect_used,
    reason = "test code uses expect for clear failure messages"
)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn display_includes_kind_state_and_message() {
        let err = DatabaseException::new(
            ExceptionKind::Data,
            Some("22001"),
            Some("value too long for type character varying(5)"),
        );

        assert_eq!(
            err.to_string(),
            "data database error (sqlstate 22001): value too long for type character varying(5)"
        );
    }

    #[rstest]
    fn display_tolerates_missing_parts() {
        let err = DatabaseException::new(ExceptionKind::Generic, None, None);

        assert_eq!(
            err.to_string(),
            "generic database error (sqlstate unknown): no message"
        );
    }

    #[rstest]
    fn serialises_kind_as_snake_case() {
        let err = DatabaseException::new(ExceptionKind::ForeignKeyViolation, Some("23503"), None);
        let json = serde_json::to_value(&err).expect("serialise exception");

        assert_eq!(
            json.get("kind").and_then(|kind| kind.as_str()),
            Some("foreign_key_violation")
        );
        assert_eq!(
            json.get("sqlState").and_then(|state| state.as_str()),
            Some("23503")
        );
        assert!(json.get("constraint").is_none());
    }

    #[rstest]
    #[case(ExceptionKind::CheckViolation, true)]
    #[case(ExceptionKind::IntegrityConstraintViolation, true)]
    #[case(ExceptionKind::Data, false)]
    #[case(ExceptionKind::Generic, false)]
    fn constraint_family_membership(#[case] kind: ExceptionKind, #[case] expected: bool) {
        assert_eq!(kind.is_constraint_violation(), expected);
    }
}
