//! Named PostgreSQL SQLSTATE codes referenced by the classification rules.

/// PostgreSQL error codes known to the classifier.
///
/// The list is deliberately short: it names the codes that have their own
/// rule plus a few representative members of the classes matched by prefix.
/// See the PostgreSQL manual, appendix "PostgreSQL Error Codes".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PgSqlState {
    /// `08000` connection exception.
    ConnectionException,
    /// `08003` connection does not exist.
    ConnectionDoesNotExist,
    /// `08006` connection failure.
    ConnectionFailure,
    /// `22000` data exception.
    DataException,
    /// `22001` string data, right truncation.
    StringDataRightTruncation,
    /// `22003` numeric value out of range.
    NumericValueOutOfRange,
    /// `22007` invalid datetime format.
    InvalidDatetimeFormat,
    /// `22012` division by zero.
    DivisionByZero,
    /// `22P02` invalid text representation.
    InvalidTextRepresentation,
    /// `23000` integrity constraint violation.
    IntegrityConstraintViolation,
    /// `23001` restrict violation.
    RestrictViolation,
    /// `23502` not null violation.
    NotNullViolation,
    /// `23503` foreign key violation.
    ForeignKeyViolation,
    /// `23505` unique violation.
    UniqueViolation,
    /// `23514` check violation.
    CheckViolation,
    /// `23P01` exclusion violation.
    ExclusionViolation,
    /// `25006` read only SQL transaction.
    ReadOnlySqlTransaction,
    /// `40001` serialization failure.
    SerializationFailure,
    /// `40P01` deadlock detected.
    DeadlockDetected,
    /// `42601` syntax error.
    SyntaxError,
}

impl PgSqlState {
    /// Exact five-character SQLSTATE code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConnectionException => "08000",
            Self::ConnectionDoesNotExist => "08003",
            Self::ConnectionFailure => "08006",
            Self::DataException => "22000",
            Self::StringDataRightTruncation => "22001",
            Self::NumericValueOutOfRange => "22003",
            Self::InvalidDatetimeFormat => "22007",
            Self::DivisionByZero => "22012",
            Self::InvalidTextRepresentation => "22P02",
            Self::IntegrityConstraintViolation => "23000",
            Self::RestrictViolation => "23001",
            Self::NotNullViolation => "23502",
            Self::ForeignKeyViolation => "23503",
            Self::UniqueViolation => "23505",
            Self::CheckViolation => "23514",
            Self::ExclusionViolation => "23P01",
            Self::ReadOnlySqlTransaction => "25006",
            Self::SerializationFailure => "40001",
            Self::DeadlockDetected => "40P01",
            Self::SyntaxError => "42601",
        }
    }

    /// Two-character class prefix of the code.
    #[must_use]
    pub fn class(self) -> &'static str {
        let code = self.code();
        code.get(..2).unwrap_or(code)
    }
}

impl std::fmt::Display for PgSqlState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(PgSqlState::StringDataRightTruncation, "22001", "22")]
    #[case(PgSqlState::InvalidTextRepresentation, "22P02", "22")]
    #[case(PgSqlState::UniqueViolation, "23505", "23")]
    #[case(PgSqlState::DeadlockDetected, "40P01", "40")]
    fn codes_and_classes_are_exact(
        #[case] state: PgSqlState,
        #[case] code: &str,
        #[case] class: &str,
    ) {
        assert_eq!(state.code(), code);
        assert_eq!(state.class(), class);
        assert_eq!(state.to_string(), code);
    }
}
