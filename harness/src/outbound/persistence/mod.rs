//! PostgreSQL persistence adapters.
//!
//! Provides two `TransactionProvider` implementations: one backed by
//! `diesel-async` and `bb8` connection pooling, and one on dedicated
//! `tokio-postgres` sessions that keeps every server SQLSTATE. Client errors
//! are translated into classified [`sqlstate_classifier::DatabaseException`]
//! values.
//!
//! # Example
//!
//! ```ignore
//! use tx_harness::outbound::persistence::{DbPool, DieselTransactionProvider, PoolConfig};
//!
//! let config = PoolConfig::new("postgres://localhost/mydb");
//! let pool = DbPool::new(config).await?;
//! let provider = DieselTransactionProvider::new(pool);
//! ```

mod diesel_transaction_provider;
mod persistence_error;
mod pool;
mod raw_error;
mod search_path;
mod tokio_postgres_transaction_provider;

pub use diesel_transaction_provider::{DieselTransaction, DieselTransactionProvider};
pub use persistence_error::{
    PersistenceError, map_diesel_error, map_pool_error, map_postgres_error,
};
pub use pool::{DbPool, OwnedConnection, PoolConfig, PoolError};
pub use raw_error::{raw_error_from_db_error, raw_error_from_diesel, raw_error_from_postgres};
pub use search_path::{MAX_SCHEMA_NAME_LEN, SearchPath, SearchPathError};
pub use tokio_postgres_transaction_provider::{
    TokioPostgresTransaction, TokioPostgresTransactionProvider,
};
