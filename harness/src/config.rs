//! Harness configuration loaded via OrthoConfig.
//!
//! Values come from `TX_HARNESS_*` environment variables, configuration files,
//! and command-line arguments, in OrthoConfig's usual precedence.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::outbound::persistence::{PoolConfig, SearchPath, SearchPathError};

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_MIN_IDLE: u32 = 2;
const DEFAULT_CONNECTION_TIMEOUT_SECS: u64 = 30;

/// Settings that cannot be turned into a working pool or provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    /// No database URL was configured.
    #[error("database URL missing: set TX_HARNESS_DATABASE_URL")]
    MissingDatabaseUrl,
    /// The configured search path is not a valid schema name.
    #[error("invalid search path: {0}")]
    InvalidSearchPath(#[from] SearchPathError),
    /// The pool sizes or timeout are unusable.
    #[error("invalid pool settings: {0}")]
    InvalidPool(String),
}

/// Connection and scoping settings for the transaction harness.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "TX_HARNESS")]
pub struct HarnessSettings {
    /// PostgreSQL connection URL.
    pub database_url: Option<String>,
    /// Maximum pooled connections.
    pub max_connections: Option<u32>,
    /// Idle connections the pool keeps warm.
    pub min_idle: Option<u32>,
    /// Seconds to wait for a pooled connection.
    pub connection_timeout_secs: Option<u64>,
    /// Schema every transaction is scoped to.
    pub search_path: Option<String>,
}

impl HarnessSettings {
    /// Configured pool size, falling back to the default.
    pub fn max_connections(&self) -> u32 {
        self.max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS)
    }

    /// Configured idle floor, falling back to the default and never above
    /// [`Self::max_connections`].
    pub fn min_idle(&self) -> u32 {
        self.min_idle
            .unwrap_or(DEFAULT_MIN_IDLE)
            .min(self.max_connections())
    }

    /// Configured checkout timeout, falling back to the default.
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(
            self.connection_timeout_secs
                .unwrap_or(DEFAULT_CONNECTION_TIMEOUT_SECS),
        )
    }

    /// Pool configuration derived from these settings.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::MissingDatabaseUrl`] when no non-blank URL is
    /// configured and [`SettingsError::InvalidPool`] when the sizes or timeout
    /// cannot form a pool.
    pub fn pool_config(&self) -> Result<PoolConfig, SettingsError> {
        let config = PoolConfig::new(self.database_url()?)
            .with_max_size(self.max_connections())
            .with_min_idle(Some(self.min_idle()))
            .with_connection_timeout(self.connection_timeout());
        config
            .validate()
            .map_err(|error| SettingsError::InvalidPool(error.message().to_owned()))?;
        Ok(config)
    }

    /// Configured database URL.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::MissingDatabaseUrl`] when no non-blank URL is
    /// configured.
    pub fn database_url(&self) -> Result<&str, SettingsError> {
        self.database_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or(SettingsError::MissingDatabaseUrl)
    }

    /// Validated search path, if one is configured.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidSearchPath`] when the schema name is
    /// rejected.
    pub fn search_path(&self) -> Result<Option<SearchPath>, SettingsError> {
        self.search_path
            .as_deref()
            .map(SearchPath::new)
            .transpose()
            .map_err(SettingsError::from)
    }
}
