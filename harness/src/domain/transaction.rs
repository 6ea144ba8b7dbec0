//! Begin, run, and commit or roll back a single unit of work.
//!
//! The runner owns the [`TransactionHandle`] for the whole call: the action
//! borrows it, and exactly one of commit or rollback consumes it afterwards.
//! Every step is awaited in sequence, so the call only returns once the
//! transaction has reached a terminal state.

use std::fmt;
use std::ops::{Deref, DerefMut};

use tracing::{debug, error, info, warn};

pub use diesel_async::scoped_futures::{ScopedBoxFuture, ScopedFutureExt};

use super::ports::TransactionProvider;
use super::transaction_error::TransactionError;

/// Connection bound to a begun transaction.
///
/// Dereferences to the underlying client so actions can issue queries
/// directly. Providers consume the handle on commit or rollback, which makes
/// reuse after either step a compile error.
#[derive(Debug)]
pub struct TransactionHandle<C> {
    connection: C,
}

impl<C> TransactionHandle<C> {
    /// Wrap a connection on which a transaction has just been started.
    pub fn new(connection: C) -> Self {
        Self { connection }
    }

    /// Shared access to the bound connection.
    pub fn connection(&self) -> &C {
        &self.connection
    }

    /// Exclusive access to the bound connection.
    pub fn connection_mut(&mut self) -> &mut C {
        &mut self.connection
    }

    /// Release the connection. Only providers should call this, while ending
    /// the transaction.
    pub fn into_connection(self) -> C {
        self.connection
    }
}

impl<C> Deref for TransactionHandle<C> {
    type Target = C;

    fn deref(&self) -> &Self::Target {
        &self.connection
    }
}

impl<C> DerefMut for TransactionHandle<C> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.connection
    }
}

/// Warns when a run is dropped while its transaction is still open.
struct OpenTransaction {
    open: bool,
}

impl OpenTransaction {
    fn begun() -> Self {
        Self { open: true }
    }

    fn ended(mut self) {
        self.open = false;
    }
}

impl Drop for OpenTransaction {
    fn drop(&mut self) {
        if self.open {
            warn!("transaction abandoned before commit or rollback; connection must be discarded");
        }
    }
}

/// Run `action` inside a transaction obtained from `provider`.
///
/// Outcomes:
/// - begin fails: [`TransactionError::Begin`], nothing else is attempted;
/// - action and commit succeed: `Ok` with the action's value;
/// - action succeeds, commit fails: [`TransactionError::Commit`];
/// - action fails, rollback succeeds: [`TransactionError::Action`];
/// - action fails, rollback fails: [`TransactionError::Rollback`], which
///   still carries the action error.
///
/// No retries are attempted.
///
/// # Examples
///
/// ```rust,no_run
/// use diesel_async::RunQueryDsl;
/// use tx_harness::domain::{ScopedFutureExt, run_in_transaction};
/// use tx_harness::outbound::persistence::{
///     DbPool, DieselTransactionProvider, PoolConfig, map_diesel_error,
/// };
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = DbPool::new(PoolConfig::new("postgres://localhost/app")).await?;
/// let provider = DieselTransactionProvider::new(pool);
///
/// let inserted: usize = run_in_transaction(&provider, |tx| {
///     async move {
///         diesel::sql_query("INSERT INTO audit (note) VALUES ('hello')")
///             .execute(tx.pg_connection())
///             .await
///             .map_err(map_diesel_error)
///     }
///     .scope_boxed()
/// })
/// .await?;
/// assert_eq!(inserted, 1);
/// # Ok(())
/// # }
/// ```
pub async fn run_in_transaction<'a, P, T, E, F>(
    provider: &'a P,
    action: F,
) -> Result<T, TransactionError<E, P::Error>>
where
    P: TransactionProvider + ?Sized,
    F: for<'c> FnOnce(
            &'c mut TransactionHandle<P::Connection>,
        ) -> ScopedBoxFuture<'a, 'c, Result<T, E>>
        + Send
        + 'a,
    T: Send + 'a,
    E: fmt::Display + Send + 'a,
{
    let mut handle = provider.begin().await.map_err(|begin_error| {
        warn!(error = %begin_error, "failed to begin transaction");
        TransactionError::Begin(begin_error)
    })?;
    debug!("transaction started");
    let open = OpenTransaction::begun();

    let outcome = action(&mut handle).await;

    let result = match outcome {
        Ok(value) => match provider.commit(handle).await {
            Ok(()) => {
                debug!("transaction committed");
                Ok(value)
            }
            Err(commit_error) => {
                warn!(error = %commit_error, "transaction commit failed");
                Err(TransactionError::Commit(commit_error))
            }
        },
        Err(action_error) => {
            info!(error = %action_error, "transaction was not successful; rolling back changes");
            match provider.rollback(handle).await {
                Ok(()) => Err(TransactionError::Action(action_error)),
                Err(rollback_error) => {
                    error!(
                        error = %rollback_error,
                        action_error = %action_error,
                        "transaction rollback failed"
                    );
                    Err(TransactionError::Rollback {
                        source: rollback_error,
                        action: action_error,
                    })
                }
            }
        }
    };

    open.ended();
    result
}
