//! Transaction provider on a dedicated `tokio-postgres` session.
//!
//! Each `begin` opens its own session, so server errors raised inside the
//! action keep their full SQLSTATE and protocol fields. Dropping the handle
//! closes the session, which makes the server roll back anything left open.

use std::time::Duration;

use async_trait::async_trait;
use tokio_postgres::{Client, Config, NoTls};
use tracing::{debug, warn};

use crate::domain::TransactionHandle;
use crate::domain::ports::TransactionProvider;

use super::persistence_error::{PersistenceError, map_postgres_error};
use super::search_path::SearchPath;

/// Transaction handle produced by [`TokioPostgresTransactionProvider`].
pub type TokioPostgresTransaction = TransactionHandle<Client>;

/// `tokio-postgres` implementation of the transaction provider port.
///
/// # Examples
///
/// ```rust,no_run
/// use tx_harness::domain::{ScopedFutureExt, run_in_transaction};
/// use tx_harness::outbound::persistence::{
///     TokioPostgresTransactionProvider, map_postgres_error,
/// };
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = TokioPostgresTransactionProvider::from_url("postgres://localhost/app")?;
/// let inserted = run_in_transaction(&provider, |tx| {
///     async move {
///         tx.execute("INSERT INTO audit (note) VALUES ('hello')", &[])
///             .await
///             .map_err(map_postgres_error)
///     }
///     .scope_boxed()
/// })
/// .await?;
/// assert_eq!(inserted, 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TokioPostgresTransactionProvider {
    config: Config,
    search_path: Option<SearchPath>,
}

impl TokioPostgresTransactionProvider {
    /// Create a provider connecting with `config`.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            search_path: None,
        }
    }

    /// Parse `database_url` into a provider.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::Connection`] when the URL cannot be parsed.
    pub fn from_url(database_url: &str) -> Result<Self, PersistenceError> {
        database_url
            .parse::<Config>()
            .map(Self::new)
            .map_err(|error| PersistenceError::connection(format!("invalid database URL: {error}")))
    }

    /// Give up on opening a session after `timeout`.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout(timeout);
        self
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

    async fn connect(&self) -> Result<Client, PersistenceError> {
        let (client, connection) = self
            .config
            .connect(NoTls)
            .await
            .map_err(|error| match map_postgres_error(error) {
                PersistenceError::Query { message } => PersistenceError::connection(message),
                other => other,
            })?;
        tokio::spawn(async move {
            if let Err(error) = connection.await {
                warn!(error = %error, "postgres session ended with an error");
            }
        });
        Ok(client)
    }

    async fn apply_search_path(&self, client: &Client) -> Result<(), PersistenceError> {
        let Some(search_path) = &self.search_path else {
            return Ok(());
        };
        if let Err(error) = client
            .batch_execute(&search_path.set_local_statement())
            .await
        {
            if let Err(rollback_error) = client.batch_execute("ROLLBACK").await {
                warn!(
                    error = %rollback_error,
                    schema = %search_path,
                    "rollback after failed search path change also failed"
                );
            }
            return Err(map_postgres_error(error));
        }
        debug!(schema = %search_path, "transaction search path applied");
        Ok(())
    }
}

#[async_trait]
impl TransactionProvider for TokioPostgresTransactionProvider {
    type Connection = Client;
    type Error = PersistenceError;

    async fn begin(&self) -> Result<TokioPostgresTransaction, PersistenceError> {
        let client = self.connect().await?;
        client
            .batch_execute("BEGIN")
            .await
            .map_err(map_postgres_error)?;
        self.apply_search_path(&client).await?;
        Ok(TransactionHandle::new(client))
    }

    async fn commit(&self, handle: TokioPostgresTransaction) -> Result<(), PersistenceError> {
        handle
            .into_connection()
            .batch_execute("COMMIT")
            .await
            .map_err(map_postgres_error)
    }

    async fn rollback(&self, handle: TokioPostgresTransaction) -> Result<(), PersistenceError> {
        handle
            .into_connection()
            .batch_execute("ROLLBACK")
            .await
            .map_err(map_postgres_error)
    }
}
