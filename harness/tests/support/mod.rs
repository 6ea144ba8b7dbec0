//! Shared setup for tests that need a live PostgreSQL server.
//!
//! Set `TX_HARNESS_TEST_DATABASE_URL` to a database the tests may create and
//! drop tables in. When it is unset the tests print a skip marker and pass.

use std::env;
use std::time::Duration;

use postgres::{Client, NoTls};
use tokio::runtime::{Builder, Runtime};
use tx_harness::outbound::persistence::{
    DbPool, DieselTransactionProvider, PoolConfig, TokioPostgresTransactionProvider,
};

pub const DATABASE_URL_VAR: &str = "TX_HARNESS_TEST_DATABASE_URL";

/// Database URL for live tests, or `None` after printing a skip marker.
pub fn live_database_url() -> Option<String> {
    match env::var(DATABASE_URL_VAR) {
        Ok(url) if !url.trim().is_empty() => Some(url),
        _ => {
            eprintln!("SKIP-LIVE-DATABASE: {DATABASE_URL_VAR} is not set");
            None
        }
    }
}

/// A scratch table plus the clients used to exercise it.
///
/// The synchronous `postgres` client must only be used outside
/// `runtime.block_on`, since it drives its own runtime internally.
pub struct LiveDatabase {
    pub runtime: Runtime,
    pub client: Client,
    pub pool: DbPool,
    pub table: String,
    url: String,
}

impl LiveDatabase {
    /// Connect and create `tx_harness_<label>_<pid>` with a short `code` column.
    pub fn connect(url: &str, label: &str) -> Self {
        let table = format!("tx_harness_{label}_{}", std::process::id());
        let mut client = Client::connect(url, NoTls).expect("connect setup client");
        client
            .batch_execute(&format!(
                "DROP TABLE IF EXISTS {table};
                 CREATE TABLE {table} (id INTEGER PRIMARY KEY, code VARCHAR(3) NOT NULL);"
            ))
            .expect("create scratch table");

        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("create runtime");
        let pool = runtime
            .block_on(DbPool::new(
                PoolConfig::new(url).with_max_size(2).with_min_idle(None),
            ))
            .expect("create pool");

        Self {
            runtime,
            client,
            pool,
            table,
            url: url.to_owned(),
        }
    }

    pub fn provider(&self) -> DieselTransactionProvider {
        DieselTransactionProvider::new(self.pool.clone())
    }

    pub fn session_provider(&self) -> TokioPostgresTransactionProvider {
        TokioPostgresTransactionProvider::from_url(&self.url)
            .expect("parse database url")
            .with_connect_timeout(Duration::from_secs(5))
    }

    /// Number of committed rows, as seen by a separate session.
    pub fn row_count(&mut self) -> i64 {
        let row = self
            .client
            .query_one(&format!("SELECT COUNT(*) FROM {}", self.table), &[])
            .expect("count rows");
        row.get(0)
    }
}

impl Drop for LiveDatabase {
    fn drop(&mut self) {
        let statement = format!("DROP TABLE IF EXISTS {}", self.table);
        if let Err(error) = self.client.batch_execute(&statement) {
            eprintln!("failed to drop {}: {error}", self.table);
        }
    }
}
