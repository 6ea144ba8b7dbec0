//! Port for starting and ending transactions on a borrowed connection.

use async_trait::async_trait;

use crate::domain::TransactionHandle;

/// Source of transaction-bound connections.
///
/// Implementations hand out one connection per [`begin`](Self::begin) and
/// never share it with another caller while the transaction is open. Pooling
/// and serialising the underlying physical connections is the provider's
/// concern, as is discarding a connection whose transaction was abandoned.
#[async_trait]
pub trait TransactionProvider: Send + Sync {
    /// Client connection exposed to actions through the handle.
    type Connection: Send;

    /// Infrastructure failure raised by begin, commit, or rollback.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Obtain a connection and start a transaction on it.
    async fn begin(&self) -> Result<TransactionHandle<Self::Connection>, Self::Error>;

    /// Commit the transaction bound to `handle`.
    async fn commit(&self, handle: TransactionHandle<Self::Connection>) -> Result<(), Self::Error>;

    /// Roll back the transaction bound to `handle`.
    async fn rollback(&self, handle: TransactionHandle<Self::Connection>)
    -> Result<(), Self::Error>;
}
