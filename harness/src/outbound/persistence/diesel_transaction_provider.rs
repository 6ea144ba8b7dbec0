//! PostgreSQL-backed transaction provider.
//!
//! Implements the `TransactionProvider` port on owned pooled
//! `AsyncPgConnection`s, driving `BEGIN`, `COMMIT`, and `ROLLBACK` through
//! Diesel's ANSI transaction manager so its bookkeeping stays consistent with
//! the connection's real state.

use async_trait::async_trait;
use diesel_async::{AnsiTransactionManager, AsyncPgConnection, RunQueryDsl, TransactionManager};
use tracing::{debug, warn};

use crate::domain::TransactionHandle;
use crate::domain::ports::TransactionProvider;

use super::persistence_error::{PersistenceError, map_diesel_error, map_pool_error};
use super::pool::{DbPool, OwnedConnection};
use super::search_path::SearchPath;

/// Transaction handle produced by [`DieselTransactionProvider`].
pub type DieselTransaction = TransactionHandle<OwnedConnection>;

impl TransactionHandle<OwnedConnection> {
    /// Connection to run Diesel queries against inside the transaction.
    pub fn pg_connection(&mut self) -> &mut AsyncPgConnection {
        self.connection_mut()
    }
}

/// Diesel-backed implementation of the transaction provider port.
#[derive(Clone)]
pub struct DieselTransactionProvider {
    pool: DbPool,
    search_path: Option<SearchPath>,
}

impl DieselTransactionProvider {
    /// Create a provider drawing connections from `pool`.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use tx_harness::outbound::persistence::{DbPool, DieselTransactionProvider, PoolConfig};
    ///
    /// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
    /// let pool = DbPool::new(PoolConfig::new("postgres://localhost")).await?;
    /// let provider = DieselTransactionProvider::new(pool);
    /// # let _ = provider;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            search_path: None,
        }
    }

    /// Scope every transaction to `search_path`.
    #[must_use]
    pub fn with_search_path(mut self, search_path: SearchPath) -> Self {
        self.search_path = Some(search_path);
        self
    }

    /// Schema applied to each transaction, if any.
    pub fn search_path(&self) -> Option<&SearchPath> {
        self.search_path.as_ref()
    }

    async fn apply_search_path(
        &self,
        connection: &mut AsyncPgConnection,
    ) -> Result<(), PersistenceError> {
        let Some(search_path) = &self.search_path else {
            return Ok(());
        };
        let applied = diesel::sql_query(search_path.set_local_statement())
            .execute(&mut *connection)
            .await;
        if let Err(error) = applied {
            // The transaction is already open; undo it before reporting.
            if let Err(rollback_error) =
                AnsiTransactionManager::rollback_transaction(&mut *connection).await
            {
                warn!(
                    error = %rollback_error,
                    schema = %search_path,
                    "rollback after failed search path change also failed"
                );
            }
            return Err(map_diesel_error(error));
        }
        debug!(schema = %search_path, "transaction search path applied");
        Ok(())
    }
}

#[async_trait]
impl TransactionProvider for DieselTransactionProvider {
    type Connection = OwnedConnection;
    type Error = PersistenceError;

    async fn begin(&self) -> Result<DieselTransaction, PersistenceError> {
        let mut connection = self.pool.get_owned().await.map_err(map_pool_error)?;
        AnsiTransactionManager::begin_transaction(&mut *connection)
            .await
            .map_err(map_diesel_error)?;
        self.apply_search_path(&mut connection).await?;
        Ok(TransactionHandle::new(connection))
    }

    async fn commit(&self, handle: DieselTransaction) -> Result<(), PersistenceError> {
        let mut connection = handle.into_connection();
        AnsiTransactionManager::commit_transaction(&mut *connection)
            .await
            .map_err(map_diesel_error)
    }

    async fn rollback(&self, handle: DieselTransaction) -> Result<(), PersistenceError> {
        let mut connection = handle.into_connection();
        AnsiTransactionManager::rollback_transaction(&mut *connection)
            .await
            .map_err(map_diesel_error)
    }
}
