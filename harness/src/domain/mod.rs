//! Transactional execution core and its supporting types.
//!
//! Public surface:
//! - [`run_in_transaction`] and [`TransactionHandle`]: begin, run, and commit
//!   or roll back a single unit of work.
//! - [`TransactionError`]: begin, action, commit, and rollback failures with
//!   their precedence rules.
//! - [`filter_query`] and [`build_parameter_list`]: query plumbing consumed
//!   by actions.
//! - [`ports`]: the provider and compiler contracts adapters implement.

pub mod filter_query;
pub mod parameters;
pub mod ports;
pub mod transaction;
mod transaction_error;


pub use self::filter_query::{ALL_FIELDS, CompiledQuery, DOCUMENT_COLUMN, Page, filter_query};
pub use self::parameters::{ParameterList, build_parameter_list};
pub use self::transaction::{
    ScopedBoxFuture, ScopedFutureExt, TransactionHandle, run_in_transaction,
};
pub use self::transaction_error::TransactionError;
