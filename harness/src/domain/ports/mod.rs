//! Domain ports for the transactional boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod filter_query_compiler;
mod transaction_provider;

#[cfg(test)]
pub use filter_query_compiler::MockFilterQueryCompiler;
pub use filter_query_compiler::{FilterQueryCompiler, FilterQueryError};
pub use transaction_provider::TransactionProvider;
