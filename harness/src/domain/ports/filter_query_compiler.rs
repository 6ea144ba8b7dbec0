//! Port for compiling caller-supplied filter queries into SQL predicates.
//!
//! The query language and its translation to PostgreSQL JSON predicates live
//! outside this crate; only the contract is defined here.

use super::define_port_error;

define_port_error! {
    /// Failures raised while compiling a filter query.
    pub enum FilterQueryError {
        /// The filter query is not syntactically valid.
        Malformed { query: String, message: String } => "malformed filter query '{query}': {message}",
        /// The document field the filter targets cannot be resolved.
        UnknownField { field: String } => "unknown filter field: {field}",
    }
}

/// Compiles filter queries against a JSON document column.
#[cfg_attr(test, mockall::automock)]
pub trait FilterQueryCompiler: Send + Sync {
    /// Compile `filter` against `field` (for example `items.jsonb`) into a SQL
    /// boolean expression. An empty result means "no restriction".
    fn compile(&self, field: &str, filter: &str) -> Result<String, FilterQueryError>;
}
