mod common;

use common::{record, MockGraph, MockSql};
use dbs_core::auth::EntryPoint;
use dbs_core::config::AccessMode;
use dbs_core::error::DbsError;
use dbs_core::record::{collect_records, message_record};
use dbs_core::server::DbsEngine;
use dbs_core::sql::DDL_SUCCESS_MESSAGE;
use serde_json::json;
use std::sync::Arc;

fn sql_engine(read: bool, write: bool, backend: Arc<MockSql>) -> DbsEngine {
    DbsEngine::new(AccessMode::new(read, write)).with_sql(backend)
}

#[tokio::test]
async fn test_write_entry_rejects_read_when_reads_disabled() {
    let backend = Arc::new(MockSql::default());
    let engine = sql_engine(false, true, backend.clone());

    let result = engine.execute_sql_query(EntryPoint::Write, "SELECT 1").await;

    assert!(matches!(result, Err(DbsError::Configuration(_))));
    assert!(backend.executed().is_empty());
}

#[tokio::test]
async fn test_write_entry_runs_delete_without_reads_enabled() {
    let backend = Arc::new(MockSql::returning(vec![record(&[("id", json!(3))])]));
    let engine = sql_engine(false, true, backend.clone());

    let rows = engine
        .execute_sql_query(EntryPoint::Write, "DELETE FROM t")
        .await
        .unwrap();
    let rows = collect_records(rows).await.unwrap();

    assert_eq!(rows, vec![record(&[("id", json!(3))])]);
    assert_eq!(backend.executed(), vec!["DELETE FROM t RETURNING *"]);
}

#[tokio::test]
async fn test_create_table_yields_ddl_record() {
    let backend = Arc::new(MockSql::default());
    let engine = sql_engine(true, true, backend.clone());

    let rows = engine
        .execute_sql_query(EntryPoint::Write, "CREATE TABLE t (id int)")
        .await
        .unwrap();
    let rows = collect_records(rows).await.unwrap();

    assert_eq!(rows, vec![message_record(DDL_SUCCESS_MESSAGE)]);
    assert_eq!(backend.executed(), vec!["CREATE TABLE t (id int)"]);
}

#[tokio::test]
async fn test_read_entry_never_executes_writes() {
    let backend = Arc::new(MockSql::default());
    let engine = sql_engine(true, true, backend.clone());

    let result = engine
        .execute_sql_query(EntryPoint::Read, "insert into t values (1)")
        .await;

    assert!(matches!(result, Err(DbsError::PolicyViolation(_))));
    assert!(backend.executed().is_empty());
}

#[tokio::test]
async fn test_read_entry_returns_rows_untouched() {
    let rows = vec![
        record(&[("id", json!(1)), ("name", json!("a"))]),
        record(&[("id", json!(2)), ("name", json!("b"))]),
    ];
    let backend = Arc::new(MockSql::returning(rows.clone()));
    let engine = sql_engine(true, false, backend.clone());

    let got = engine
        .execute_sql_query(EntryPoint::Read, "select id, name from t")
        .await
        .unwrap();

    assert_eq!(collect_records(got).await.unwrap(), rows);
    assert_eq!(backend.executed(), vec!["select id, name from t"]);
}

#[tokio::test]
async fn test_empty_read_is_not_rewritten() {
    let backend = Arc::new(MockSql::default());
    let engine = sql_engine(true, false, backend);

    let got = engine
        .execute_sql_query(EntryPoint::Read, "SELECT * FROM t WHERE false")
        .await
        .unwrap();

    assert!(collect_records(got).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_backend_errors_surface() {
    let backend = Arc::new(MockSql {
        fail_queries: true,
        ..Default::default()
    });
    let engine = sql_engine(true, false, backend);

    let result = engine.execute_sql_query(EntryPoint::Read, "SELECT * FROM t").await;
    match result {
        Err(DbsError::Backend(msg)) => assert!(msg.contains("does not exist")),
        Err(e) => panic!("unexpected error: {e}"),
        Ok(_) => panic!("expected a backend error"),
    }
}

#[tokio::test]
async fn test_cypher_gate_uses_cypher_vocabulary() {
    let backend = Arc::new(MockGraph::default());
    let engine = DbsEngine::new(AccessMode::new(true, false)).with_graph(backend.clone());

    let rejected = engine
        .execute_graph_query(EntryPoint::Read, "MATCH (n) SET n.seen = true")
        .await;
    assert!(matches!(rejected, Err(DbsError::PolicyViolation(_))));

    let accepted = engine
        .execute_graph_query(EntryPoint::Read, "MATCH (n) RETURN n.offset")
        .await;
    assert!(accepted.is_ok());
    assert_eq!(backend.executed(), vec!["MATCH (n) RETURN n.offset"]);
}

#[tokio::test]
async fn test_graph_write_results_pass_through() {
    let backend = Arc::new(MockGraph::default());
    let engine = DbsEngine::new(AccessMode::new(true, true)).with_graph(backend.clone());

    let rows = engine
        .execute_graph_query(EntryPoint::Write, "CREATE (n:Person {name: 'x'})")
        .await
        .unwrap();

    assert!(collect_records(rows).await.unwrap().is_empty());
    assert_eq!(backend.executed().len(), 1);
}

#[tokio::test]
async fn test_unconfigured_backend_is_a_configuration_error() {
    let engine = DbsEngine::new(AccessMode::new(true, true));
    let result = engine.execute_graph_query(EntryPoint::Read, "MATCH (n) RETURN n").await;
    assert!(matches!(result, Err(DbsError::Configuration(_))));
}

#[tokio::test]
async fn test_failed_health_check_is_startup_error() {
    let backend = Arc::new(MockGraph {
        ping_fails: true,
        ..Default::default()
    });
    let engine = DbsEngine::new(AccessMode::default()).with_graph(backend);

    let err = engine.verify_connections().await.unwrap_err();
    assert!(matches!(
        err,
        DbsError::StartupConnectivity { backend: "neo4j", .. }
    ));
}
