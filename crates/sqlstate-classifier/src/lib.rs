//! Classification of PostgreSQL SQLSTATE codes into typed database exceptions.
//!
//! Database clients report failures as a five-character SQLSTATE code plus a
//! bag of protocol fields. This crate maps that raw shape onto a small, closed
//! set of [`ExceptionKind`] categories so calling code can branch on meaning
//! (a unique violation, a truncated string) instead of comparing codes.
//!
//! The classifier is pure and total: every input, including one with no code
//! or an unknown code, yields a [`DatabaseException`].
//!
//! # Example
//!
//! ```
//! use sqlstate_classifier::{ExceptionKind, PgSqlState, RawDatabaseError, classify};
//!
//! let raw = RawDatabaseError::new(
//!     Some(PgSqlState::StringDataRightTruncation.code()),
//!     Some("value too long for type character varying(5)"),
//! );
//! let exception = classify(&raw);
//!
//! assert_eq!(exception.kind(), ExceptionKind::Data);
//! assert_eq!(exception.sql_state(), Some("22001"));
//! ```

mod exception;
mod raw;
mod rules;
mod sql_state;

pub use exception::{DatabaseException, ExceptionKind};
pub use raw::{RawDatabaseError, fields};
pub use rules::{
    Matcher, RULES, Rule, classify, classify_kind, is_check_violation, is_data_exception,
    is_foreign_key_violation, is_integrity_constraint_violation, is_not_null_violation,
    is_unique_violation,
};
pub use sql_state::PgSqlState;
