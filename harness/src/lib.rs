//! Transactional execution harness for PostgreSQL.
//!
//! [`domain::run_in_transaction`] runs a unit of work on one connection bound
//! to one transaction. The work is committed when it succeeds and rolled back
//! when it fails, and a rollback failure is reported distinctly from the
//! failure that caused it. The PostgreSQL adapter in
//! [`outbound::persistence`] classifies every server error into a typed
//! [`DatabaseException`] so callers branch on categories, not codes.

pub mod config;
pub mod domain;
pub mod outbound;

pub use sqlstate_classifier::{DatabaseException, ExceptionKind, RawDatabaseError};
