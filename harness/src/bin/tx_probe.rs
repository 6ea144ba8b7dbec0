//! Run one SQL statement inside a transaction and report how it ended.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::env;
use std::ffi::OsString;
use std::io;

use clap::{Parser, ValueEnum};
use ortho_config::OrthoConfig;
use thiserror::Error;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};
use tx_harness::config::HarnessSettings;
use tx_harness::domain::{ScopedFutureExt, TransactionError, run_in_transaction};
use tx_harness::outbound::persistence::{
    DbPool, DieselTransactionProvider, PersistenceError, TokioPostgresTransactionProvider,
    map_diesel_error, map_postgres_error,
};

/// `tx-probe` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "tx-probe",
    about = "Run a statement in a transaction and print the outcome or the classified SQLSTATE",
    version
)]
struct CliArgs {
    /// Database connection URL. Falls back to `TX_HARNESS_DATABASE_URL`, then
    /// `DATABASE_URL`.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
    /// Statement executed inside the transaction.
    #[arg(long = "statement", value_name = "sql", default_value = "SELECT 1")]
    statement: String,
    /// Roll the transaction back even when the statement succeeds.
    #[arg(long = "dry-run")]
    dry_run: bool,
    /// Client used to run the transaction.
    #[arg(long = "driver", value_enum, default_value_t = Driver::TokioPostgres)]
    driver: Driver,
}

/// Client library behind the transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Driver {
    /// Dedicated `tokio-postgres` session; reports exact SQLSTATEs.
    TokioPostgres,
    /// Pooled Diesel connection; SQLSTATEs limited to Diesel's error kinds.
    Diesel,
}

/// Why the probe's action did not complete.
#[derive(Debug, PartialEq, Error)]
enum ProbeError {
    #[error("{0}")]
    Statement(PersistenceError),
    #[error("dry run: {affected} row(s) affected before rollback")]
    DryRun { affected: u64 },
}

type ProbeOutcome = Result<u64, TransactionError<ProbeError, PersistenceError>>;

fn main() -> io::Result<()> {
    if let Err(error) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .with_writer(io::stderr)
        .try_init()
    {
        warn!(error = %error, "tracing init failed");
    }

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let mut settings = HarnessSettings::load_from_iter([OsString::from("tx-probe")])
        .map_err(|error| io::Error::other(format!("load settings: {error}")))?;

    settings.database_url = Some(resolve_database_url(
        args.database_url,
        settings.database_url.take(),
    )?);
    let search_path = settings
        .search_path()
        .map_err(|error| io::Error::new(io::ErrorKind::InvalidInput, error))?;

    let outcome = match args.driver {
        Driver::TokioPostgres => {
            let database_url = settings
                .database_url()
                .map_err(|error| io::Error::new(io::ErrorKind::InvalidInput, error))?;
            let provider = TokioPostgresTransactionProvider::from_url(database_url)
                .map_err(|error| io::Error::new(io::ErrorKind::InvalidInput, error))?
                .with_connect_timeout(settings.connection_timeout());
            let provider = match search_path {
                Some(search_path) => provider.with_search_path(search_path),
                None => provider,
            };
            run_in_session(&provider, args.statement, args.dry_run).await
        }
        Driver::Diesel => {
            let pool_config = settings
                .pool_config()
                .map_err(|error| io::Error::new(io::ErrorKind::InvalidInput, error))?;
            let pool = DbPool::new(pool_config)
                .await
                .map_err(|error| io::Error::other(format!("create database pool: {error}")))?;
            let provider = match search_path {
                Some(search_path) => {
                    DieselTransactionProvider::new(pool).with_search_path(search_path)
                }
                None => DieselTransactionProvider::new(pool),
            };
            run_with_diesel(&provider, args.statement, args.dry_run).await
        }
    };

    for line in describe_outcome(&outcome) {
        println!("{line}");
    }

    match outcome {
        Ok(_) | Err(TransactionError::Action(ProbeError::DryRun { .. })) => Ok(()),
        Err(error) => Err(io::Error::other(error.to_string())),
    }
}

async fn run_in_session(
    provider: &TokioPostgresTransactionProvider,
    statement: String,
    dry_run: bool,
) -> ProbeOutcome {
    run_in_transaction(provider, move |tx| {
        async move {
            let affected = tx
                .execute(statement.as_str(), &[])
                .await
                .map_err(|error| ProbeError::Statement(map_postgres_error(error)))?;
            settle(affected, dry_run)
        }
        .scope_boxed()
    })
    .await
}

async fn run_with_diesel(
    provider: &DieselTransactionProvider,
    statement: String,
    dry_run: bool,
) -> ProbeOutcome {
    use diesel_async::RunQueryDsl;

    run_in_transaction(provider, move |tx| {
        async move {
            let affected = diesel::sql_query(statement)
                .execute(tx.pg_connection())
                .await
                .map_err(|error| ProbeError::Statement(map_diesel_error(error)))?;
            settle(u64::try_from(affected).unwrap_or(u64::MAX), dry_run)
        }
        .scope_boxed()
    })
    .await
}

/// Turn a dry run into an action failure so the runner rolls back.
fn settle(affected: u64, dry_run: bool) -> Result<u64, ProbeError> {
    if dry_run {
        return Err(ProbeError::DryRun { affected });
    }
    Ok(affected)
}

/// Key/value lines describing how the transaction ended.
fn describe_outcome(outcome: &ProbeOutcome) -> Vec<String> {
    let error = match outcome {
        Ok(affected) => {
            return vec![
                "status=committed".to_owned(),
                format!("affected_rows={affected}"),
            ];
        }
        Err(TransactionError::Action(ProbeError::DryRun { affected })) => {
            return vec![
                "status=rolled_back".to_owned(),
                "reason=dry_run".to_owned(),
                format!("affected_rows={affected}"),
            ];
        }
        Err(error) => error,
    };

    let stage = match error {
        TransactionError::Begin(_) => "begin",
        TransactionError::Action(_) => "action",
        TransactionError::Commit(_) => "commit",
        TransactionError::Rollback { .. } => "rollback",
    };
    let mut lines = vec!["status=failed".to_owned(), format!("stage={stage}")];

    let reported = match error {
        TransactionError::Begin(source)
        | TransactionError::Commit(source)
        | TransactionError::Rollback { source, .. } => Some(source),
        TransactionError::Action(ProbeError::Statement(source)) => Some(source),
        TransactionError::Action(ProbeError::DryRun { .. }) => None,
    };
    if let Some(exception) = reported.and_then(PersistenceError::database_exception) {
        lines.push(format!(
            "sqlstate={}",
            exception.sql_state().unwrap_or("unknown")
        ));
        lines.push(format!("kind={}", exception.kind()));
    }
    if let TransactionError::Rollback {
        action: ProbeError::Statement(action),
        ..
    } = error
    {
        if let Some(exception) = action.database_exception() {
            lines.push(format!(
                "action_sqlstate={}",
                exception.sql_state().unwrap_or("unknown")
            ));
        }
    }
    lines.push(format!("error={error}"));
    lines
}

fn resolve_database_url(explicit: Option<String>, configured: Option<String>) -> io::Result<String> {
    if let Some(value) = explicit {
        if value.trim().is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "--database-url must not be empty when provided",
            ));
        }
        return Ok(value);
    }

    if let Some(value) = configured.filter(|value| !value.trim().is_empty()) {
        return Ok(value);
    }

    let from_env = env::var("DATABASE_URL").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "database URL missing: set --database-url, TX_HARNESS_DATABASE_URL, or DATABASE_URL",
        )
    })?;
    if from_env.trim().is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "DATABASE_URL must not be empty",
        ));
    }
    Ok(from_env)
}
