//! Failure outcomes of a transactional run.

use std::error::Error as StdError;
use std::fmt;

/// Why [`run_in_transaction`](super::run_in_transaction) did not produce a
/// value.
///
/// `E` is the action's error type and `P` the transaction provider's.
///
/// ## Precedence
/// A failed rollback outranks the action failure that triggered it: the
/// connection may be left in an inconsistent state. The action error stays
/// reachable through [`TransactionError::action_error`].
///
/// ## Error chain
/// [`std::error::Error::source`] yields the provider error for `Begin`,
/// `Commit` and `Rollback`, and the action error for `Action`. A `Rollback`
/// also names the action failure in its `Display` text, so reporters that
/// only walk `source()` still print both; use
/// [`TransactionError::action_error`] to inspect it as a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionError<E, P> {
    /// The transaction could not be started. Nothing was run.
    Begin(P),
    /// The action failed and its changes were rolled back.
    Action(E),
    /// The action succeeded but the commit failed; durability was not
    /// achieved, so the action's value is discarded.
    Commit(P),
    /// The action failed and the rollback failed too.
    Rollback {
        /// Rollback failure, the reported error.
        source: P,
        /// Action failure that triggered the rollback.
        action: E,
    },
}

impl<E, P> TransactionError<E, P> {
    /// Whether the transaction failed to start.
    pub const fn is_begin(&self) -> bool {
        matches!(self, Self::Begin(_))
    }

    /// Whether the action failed and was cleanly rolled back.
    pub const fn is_action(&self) -> bool {
        matches!(self, Self::Action(_))
    }

    /// Whether the commit failed.
    pub const fn is_commit(&self) -> bool {
        matches!(self, Self::Commit(_))
    }

    /// Whether the rollback failed.
    pub const fn is_rollback(&self) -> bool {
        matches!(self, Self::Rollback { .. })
    }

    /// Error raised by the action, if the action failed.
    pub const fn action_error(&self) -> Option<&E> {
        match self {
            Self::Action(action) | Self::Rollback { action, .. } => Some(action),
            Self::Begin(_) | Self::Commit(_) => None,
        }
    }

    /// Consume the error, keeping only the action's failure.
    pub fn into_action_error(self) -> Option<E> {
        match self {
            Self::Action(action) | Self::Rollback { action, .. } => Some(action),
            Self::Begin(_) | Self::Commit(_) => None,
        }
    }

    /// Provider failure for begin, commit, or rollback.
    pub const fn infrastructure_error(&self) -> Option<&P> {
        match self {
            Self::Begin(source) | Self::Commit(source) | Self::Rollback { source, .. } => {
                Some(source)
            }
            Self::Action(_) => None,
        }
    }
}

impl<E> TransactionError<E, E> {
    /// Collapse to the single reported error when action and provider share
    /// an error type.
    pub fn into_reported(self) -> E {
        match self {
            Self::Begin(error) | Self::Action(error) | Self::Commit(error) => error,
            Self::Rollback { source, .. } => source,
        }
    }
}

impl<E, P> fmt::Display for TransactionError<E, P>
where
    E: fmt::Display,
    P: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Begin(source) => write!(f, "failed to begin transaction: {source}"),
            Self::Action(action) => write!(f, "transaction rolled back: {action}"),
            Self::Commit(source) => write!(f, "failed to commit transaction: {source}"),
            Self::Rollback { source, action } => write!(
                f,
                "failed to roll back transaction: {source} (after action failure: {action})"
            ),
        }
    }
}

impl<E, P> StdError for TransactionError<E, P>
where
    E: StdError + 'static,
    P: StdError + 'static,
{
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Begin(source) | Self::Commit(source) | Self::Rollback { source, .. } => {
                Some(source)
            }
            Self::Action(action) => Some(action),
        }
    }
}
