//! Ordered SQLSTATE classification rules.
//!
//! Rules are evaluated top to bottom and the first match wins, so exact codes
//! sit above the class prefixes they belong to. A code that matches nothing,
//! or no code at all, falls through to [`ExceptionKind::Generic`].

use crate::exception::{DatabaseException, ExceptionKind};
use crate::raw::RawDatabaseError;
use crate::sql_state::PgSqlState;

/// Predicate over a SQLSTATE code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matcher {
    /// Matches one exact five-character code.
    Exact(&'static str),
    /// Matches every code in a two-character class.
    Class(&'static str),
}

impl Matcher {
    /// Whether `code` satisfies this matcher.
    #[must_use]
    pub fn matches(self, code: &str) -> bool {
        match self {
            Self::Exact(expected) => code == expected,
            Self::Class(class) => code.len() == 5 && code.get(..2) == Some(class),
        }
    }
}

/// A matcher paired with the category it produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    /// Code predicate.
    pub matcher: Matcher,
    /// Category produced on match.
    pub kind: ExceptionKind,
}

impl Rule {
    const fn exact(state: PgSqlState, kind: ExceptionKind) -> Self {
        Self {
            matcher: Matcher::Exact(state.code()),
            kind,
        }
    }

    const fn class(class: &'static str, kind: ExceptionKind) -> Self {
        Self {
            matcher: Matcher::Class(class),
            kind,
        }
    }
}

/// Classification table in priority order.
pub const RULES: &[Rule] = &[
    Rule::exact(PgSqlState::UniqueViolation, ExceptionKind::UniqueViolation),
    Rule::exact(
        PgSqlState::ForeignKeyViolation,
        ExceptionKind::ForeignKeyViolation,
    ),
    Rule::exact(PgSqlState::CheckViolation, ExceptionKind::CheckViolation),
    Rule::exact(PgSqlState::NotNullViolation, ExceptionKind::NotNullViolation),
    Rule::class("22", ExceptionKind::Data),
    Rule::class("23", ExceptionKind::IntegrityConstraintViolation),
    Rule::class("40", ExceptionKind::TransactionRollback),
    Rule::class("08", ExceptionKind::ConnectionFailure),
];

/// Category for `raw` without building the full exception.
#[must_use]
pub fn classify_kind(raw: &RawDatabaseError) -> ExceptionKind {
    let Some(code) = raw.sql_state() else {
        return ExceptionKind::Generic;
    };
    RULES
        .iter()
        .find(|rule| rule.matcher.matches(code))
        .map_or(ExceptionKind::Generic, |rule| rule.kind)
}

/// Classify a raw database error.
///
/// Total: never panics and always returns an exception. The SQL state and
/// message are copied verbatim, including when they are absent.
///
/// # Examples
/// ```
/// use sqlstate_classifier::{ExceptionKind, RawDatabaseError, classify};
///
/// let exception = classify(&RawDatabaseError::new(None, None));
/// assert_eq!(exception.kind(), ExceptionKind::Generic);
/// assert_eq!(exception.sql_state(), None);
/// ```
#[must_use]
pub fn classify(raw: &RawDatabaseError) -> DatabaseException {
    DatabaseException::from_raw(classify_kind(raw), raw)
}

impl ExceptionKind {
    /// Whether `raw` classifies as this kind.
    #[must_use]
    pub fn matches(self, raw: &RawDatabaseError) -> bool {
        classify_kind(raw) == self
    }
}

/// Whether `raw` is a data exception (SQLSTATE class `22`).
#[must_use]
pub fn is_data_exception(raw: &RawDatabaseError) -> bool {
    ExceptionKind::Data.matches(raw)
}

/// Whether `raw` is a unique violation.
#[must_use]
pub fn is_unique_violation(raw: &RawDatabaseError) -> bool {
    ExceptionKind::UniqueViolation.matches(raw)
}

/// Whether `raw` is a foreign key violation.
#[must_use]
pub fn is_foreign_key_violation(raw: &RawDatabaseError) -> bool {
    ExceptionKind::ForeignKeyViolation.matches(raw)
}

/// Whether `raw` is a check constraint violation.
#[must_use]
pub fn is_check_violation(raw: &RawDatabaseError) -> bool {
    ExceptionKind::CheckViolation.matches(raw)
}

/// Whether `raw` is a not-null violation.
#[must_use]
pub fn is_not_null_violation(raw: &RawDatabaseError) -> bool {
    ExceptionKind::NotNullViolation.matches(raw)
}

/// Whether `raw` is any integrity constraint violation (SQLSTATE class `23`).
#[must_use]
pub fn is_integrity_constraint_violation(raw: &RawDatabaseError) -> bool {
    classify_kind(raw).is_constraint_violation()
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
    #[case(Matcher::Exact("23505"), "23505", true)]
    #[case(Matcher::Exact("23505"), "23503", false)]
    #[case(Matcher::Class("22"), "22001", true)]
    #[case(Matcher::Class("22"), "22P02", true)]
    #[case(Matcher::Class("22"), "2200", false)]
    #[case(Matcher::Class("22"), "23001", false)]
    #[case(Matcher::Class("22"), "", false)]
    fn matcher_semantics(#[case] matcher: Matcher, #[case] code: &str, #[case] expected: bool) {
        assert_eq!(matcher.matches(code), expected);
    }

    #[rstest]
    fn exact_rules_precede_their_class() {
        let position = |kind: ExceptionKind| RULES.iter().position(|rule| rule.kind == kind);
        let class_23 = position(ExceptionKind::IntegrityConstraintViolation).expect("class rule");

        for kind in [
            ExceptionKind::UniqueViolation,
            ExceptionKind::ForeignKeyViolation,
            ExceptionKind::CheckViolation,
            ExceptionKind::NotNullViolation,
        ] {
            assert!(position(kind).expect("exact rule") < class_23, "{kind}");
        }
    }

    #[rstest]
    fn multibyte_codes_fall_back_without_panicking() {
        let raw = RawDatabaseError::new(Some("2é001"), Some("odd"));

        assert_eq!(classify_kind(&raw), ExceptionKind::Generic);
    }
}
