//! Integration tests for both transaction providers against a live server.
//!
//! Skipped unless `TX_HARNESS_TEST_DATABASE_URL` is set.

use postgres::{Client, NoTls};
use rstest::rstest;
use sqlstate_classifier::classify;
use tx_harness::ExceptionKind;
use tx_harness::domain::{ScopedFutureExt, TransactionError, run_in_transaction};
use tx_harness::outbound::persistence::{
    PersistenceError, SearchPath, map_diesel_error, map_postgres_error, raw_error_from_postgres,
};

mod support;

use support::{LiveDatabase, live_database_url};

type Outcome = Result<usize, TransactionError<PersistenceError, PersistenceError>>;
type SessionOutcome = Result<u64, TransactionError<PersistenceError, PersistenceError>>;

fn insert_in_transaction(db: &LiveDatabase, id: i32, code: &str, then_fail: bool) -> Outcome {
    use diesel_async::RunQueryDsl;

    let provider = db.provider();
    let statement = format!(
        "INSERT INTO {} (id, code) VALUES ({id}, '{code}')",
        db.table
    );
    db.runtime.block_on(run_in_transaction(&provider, move |tx| {
        async move {
            let inserted = diesel::sql_query(statement)
                .execute(tx.pg_connection())
                .await
                .map_err(map_diesel_error)?;
            if then_fail {
                return Err(PersistenceError::query("abandon after insert"));
            }
            Ok(inserted)
        }
        .scope_boxed()
    }))
}

fn insert_in_session(db: &LiveDatabase, id: i32, code: &str, then_fail: bool) -> SessionOutcome {
    let provider = db.session_provider();
    let statement = format!(
        "INSERT INTO {} (id, code) VALUES ({id}, '{code}')",
        db.table
    );
    db.runtime.block_on(run_in_transaction(&provider, move |tx| {
        async move {
            let inserted = tx
                .execute(statement.as_str(), &[])
                .await
                .map_err(map_postgres_error)?;
            if then_fail {
                return Err(PersistenceError::query("abandon after insert"));
            }
            Ok(inserted)
        }
        .scope_boxed()
    }))
}

#[rstest]
fn committed_rows_are_visible_to_other_sessions() {
    let Some(url) = live_database_url() else {
        return;
    };
    let mut db = LiveDatabase::connect(&url, "commit");

    let outcome = insert_in_transaction(&db, 1, "abc", false);

    assert_eq!(outcome, Ok(1));
    assert_eq!(db.row_count(), 1);
}

#[rstest]
fn failed_actions_leave_no_rows() {
    let Some(url) = live_database_url() else {
        return;
    };
    let mut db = LiveDatabase::connect(&url, "rollback");

    let outcome = insert_in_transaction(&db, 1, "abc", true);

    assert_eq!(
        outcome,
        Err(TransactionError::Action(PersistenceError::query(
            "abandon after insert"
        )))
    );
    assert_eq!(db.row_count(), 0);
}

#[rstest]
fn duplicate_keys_are_classified_as_unique_violations() {
    let Some(url) = live_database_url() else {
        return;
    };
    let mut db = LiveDatabase::connect(&url, "unique");
    insert_in_transaction(&db, 7, "abc", false).expect("first insert commits");

    let error = insert_in_transaction(&db, 7, "xyz", false).expect_err("duplicate key");

    assert!(error.is_action());
    let exception = error
        .action_error()
        .and_then(PersistenceError::database_exception)
        .expect("classified exception");
    assert_eq!(exception.kind(), ExceptionKind::UniqueViolation);
    assert_eq!(exception.sql_state(), Some("23505"));
    assert_eq!(db.row_count(), 1);
}

#[rstest]
fn truncation_through_the_runner_is_a_data_exception() {
    let Some(url) = live_database_url() else {
        return;
    };
    let mut db = LiveDatabase::connect(&url, "truncate_runner");

    let error = insert_in_session(&db, 1, "abcd", false).expect_err("value too long");

    assert!(error.is_action());
    let exception = error
        .action_error()
        .and_then(PersistenceError::database_exception)
        .expect("classified exception");
    assert_eq!(exception.kind(), ExceptionKind::Data);
    assert_eq!(exception.sql_state(), Some("22001"));
    assert_eq!(db.row_count(), 0);
}

#[rstest]
fn truncation_through_diesel_keeps_the_server_message() {
    let Some(url) = live_database_url() else {
        return;
    };
    let mut db = LiveDatabase::connect(&url, "truncate_diesel");

    let error = insert_in_transaction(&db, 1, "abcd", false).expect_err("value too long");

    let exception = error
        .action_error()
        .and_then(PersistenceError::database_exception)
        .expect("classified exception");
    assert!(
        exception
            .message()
            .is_some_and(|message| message.contains("too long")),
        "server message is preserved"
    );
    assert_eq!(db.row_count(), 0);
}

#[rstest]
fn session_provider_commits_and_rolls_back() {
    let Some(url) = live_database_url() else {
        return;
    };
    let mut db = LiveDatabase::connect(&url, "session");

    assert_eq!(insert_in_session(&db, 1, "abc", false), Ok(1));
    assert_eq!(
        insert_in_session(&db, 2, "def", true),
        Err(TransactionError::Action(PersistenceError::query(
            "abandon after insert"
        )))
    );

    assert_eq!(db.row_count(), 1);
}

#[rstest]
fn session_provider_classifies_duplicate_keys() {
    let Some(url) = live_database_url() else {
        return;
    };
    let mut db = LiveDatabase::connect(&url, "session_unique");
    insert_in_session(&db, 7, "abc", false).expect("first insert commits");

    let error = insert_in_session(&db, 7, "xyz", false).expect_err("duplicate key");

    assert_eq!(
        error
            .action_error()
            .and_then(PersistenceError::exception_kind),
        Some(ExceptionKind::UniqueViolation)
    );
    assert_eq!(db.row_count(), 1);
}

#[rstest]
fn truncation_through_postgres_is_a_data_exception() {
    let Some(url) = live_database_url() else {
        return;
    };
    let mut db = LiveDatabase::connect(&url, "truncate_pg");
    let statement = format!("INSERT INTO {} (id, code) VALUES (1, 'abcd')", db.table);

    let error = db
        .client
        .execute(&statement, &[])
        .expect_err("value too long");

    let raw = raw_error_from_postgres(&error).expect("server error");
    assert_eq!(raw.field("severity"), Some("ERROR"));
    let exception = classify(&raw);
    assert_eq!(exception.kind(), ExceptionKind::Data);
    assert_eq!(exception.sql_state(), Some("22001"));
}

#[rstest]
fn search_path_scopes_unqualified_names() {
    use diesel_async::RunQueryDsl;

    let Some(url) = live_database_url() else {
        return;
    };
    let schema = format!("tx_harness_tenant_{}", std::process::id());
    let mut setup = Client::connect(&url, NoTls).expect("connect setup client");
    setup
        .batch_execute(&format!(
            "DROP SCHEMA IF EXISTS {schema} CASCADE;
             CREATE SCHEMA {schema};
             CREATE TABLE {schema}.notes (body TEXT NOT NULL);"
        ))
        .expect("create tenant schema");

    let db = LiveDatabase::connect(&url, "search_path");
    let provider = db
        .provider()
        .with_search_path(SearchPath::new(schema.clone()).expect("valid schema"));
    let outcome: Outcome = db.runtime.block_on(run_in_transaction(&provider, |tx| {
        async move {
            diesel::sql_query("INSERT INTO notes (body) VALUES ('scoped')")
                .execute(tx.pg_connection())
                .await
                .map_err(map_diesel_error)
        }
        .scope_boxed()
    }));

    assert_eq!(outcome, Ok(1));
    let count: i64 = setup
        .query_one(&format!("SELECT COUNT(*) FROM {schema}.notes"), &[])
        .expect("count tenant rows")
        .get(0);
    assert_eq!(count, 1);
    setup
        .batch_execute(&format!("DROP SCHEMA IF EXISTS {schema} CASCADE"))
        .expect("drop tenant schema");
}
