use rwsplit_config::OperationKind;

use super::*;
use crate::session::Session;
use crate::test::{data_source, scripted_data_source, MockProvider, ScriptedRouter};
use crate::types::Value;

#[tokio::test]
async fn test_statements_bind_lazily() {
    let provider = MockProvider::new();
    let conn = data_source(&provider).connection(&Session::new());

    let stmt = conn
        .create_statement_with(
            StatementOptions::new(ResultSetType::ScrollInsensitive, Concurrency::Updatable)
                .with_holdability(Holdability::CloseCursorsAtCommit),
        )
        .unwrap();
    let prepared = conn
        .prepare_statement_with_keys(
            "INSERT INTO users (name) VALUES ($1)",
            GeneratedKeys::ColumnNames(vec!["id".into()]),
        )
        .unwrap();

    assert!(!stmt.binding().bound());
    assert!(!prepared.binding().bound());
    assert_eq!(stmt.options().result_set_type, ResultSetType::ScrollInsensitive);
    assert_eq!(stmt.options().concurrency, Concurrency::Updatable);
    assert_eq!(
        stmt.options().holdability,
        Some(Holdability::CloseCursorsAtCommit)
    );
    assert_eq!(prepared.sql(), "INSERT INTO users (name) VALUES ($1)");
    assert_eq!(
        prepared.generated_keys(),
        &GeneratedKeys::ColumnNames(vec!["id".into()])
    );

    for name in ["m", "r1", "r2"] {
        assert_eq!(provider.lookups(name), 0);
    }

    conn.close().await.unwrap();
}

#[tokio::test]
async fn test_default_router_splits_reads() {
    let provider = MockProvider::new();
    let conn = data_source(&provider).connection(&Session::new());
    let mut stmt = conn.create_statement().unwrap();

    let rows = stmt.execute_query("SELECT 1").await.unwrap();
    let replica = stmt.binding().data_source().unwrap().to_string();
    assert!(replica == "r1" || replica == "r2");
    assert_eq!(rows, vec![vec![Value::Text(replica.clone())]]);

    assert_eq!(stmt.execute_update("DELETE FROM t").await.unwrap(), 1);
    assert_eq!(stmt.binding().data_source(), Some("m"));

    stmt.execute_query("SELECT 1").await.unwrap();
    assert_eq!(stmt.binding().data_source(), Some("m"));

    conn.close().await.unwrap();
}

#[tokio::test]
async fn test_default_router_keeps_transactions_on_master() {
    let provider = MockProvider::new();
    let conn = data_source(&provider).connection(&Session::new());
    conn.set_autocommit(false).await.unwrap();

    let mut stmt = conn.create_statement().unwrap();
    stmt.execute_query("SELECT 1").await.unwrap();
    assert_eq!(stmt.binding().data_source(), Some("m"));

    conn.close().await.unwrap();
}

#[tokio::test]
async fn test_batch_routes_each_statement() {
    let provider = MockProvider::new();
    let router = ScriptedRouter::new();
    router.route("UPDATE a SET x = 1", "r1");
    router.route("UPDATE b SET x = 1", "r2");

    let conn = scripted_data_source(&provider, &router).connection(&Session::new());
    let mut stmt = conn.create_statement().unwrap();

    stmt.add_batch("UPDATE a SET x = 1").unwrap();
    stmt.add_batch("UPDATE b SET x = 1").unwrap();
    stmt.add_batch("UPDATE c SET x = 1").unwrap();

    let counts = stmt.execute_batch().await.unwrap();
    assert_eq!(counts, vec![1, 1, 1]);

    assert_eq!(
        provider.last("r1").unwrap().executed(),
        vec!["UPDATE a SET x = 1"]
    );
    assert_eq!(
        provider.last("r2").unwrap().executed(),
        vec!["UPDATE b SET x = 1"]
    );
    assert_eq!(
        provider.last("m").unwrap().executed(),
        vec!["UPDATE c SET x = 1"]
    );
    assert_eq!(stmt.binding().data_source(), Some("m"));
    assert_eq!(
        conn.bound_data_sources().await,
        vec!["r1", "r2", "m"]
    );

    // Batch is gone after execution.
    assert!(stmt.execute_batch().await.unwrap().is_empty());

    conn.close().await.unwrap();
}

#[tokio::test]
async fn test_prepared_statement_parameters() {
    let provider = MockProvider::new();
    let router = ScriptedRouter::new();
    router.route("SELECT * FROM users WHERE id = $1", "r1");

    let conn = scripted_data_source(&provider, &router).connection(&Session::new());
    let mut stmt = conn
        .prepare_statement("SELECT * FROM users WHERE id = $1")
        .unwrap();

    assert!(matches!(
        stmt.set_parameter(0, 1),
        Err(Error::ParameterIndex(0))
    ));

    stmt.set_parameter(1, 42).unwrap();
    stmt.execute_query().await.unwrap();

    stmt.set_parameter(3, "x").unwrap();
    assert_eq!(
        stmt.parameters(),
        &[Value::Int(42), Value::Null, Value::Text("x".into())]
    );

    stmt.clear_parameters();
    stmt.set_parameter(1, Option::<i64>::None).unwrap();
    stmt.execute_query().await.unwrap();

    assert_eq!(
        provider.last("r1").unwrap().executed_with_parameters(),
        vec![
            (
                "SELECT * FROM users WHERE id = $1".to_string(),
                vec![Value::Int(42)]
            ),
            (
                "SELECT * FROM users WHERE id = $1".to_string(),
                vec![Value::Null]
            ),
        ]
    );

    conn.close().await.unwrap();
}

#[tokio::test]
async fn test_prepared_batch() {
    let provider = MockProvider::new();
    let conn = data_source(&provider).connection(&Session::new());
    let mut stmt = conn
        .prepare_statement("INSERT INTO users (id) VALUES ($1)")
        .unwrap();

    for id in 1..=3 {
        stmt.set_parameter(1, id).unwrap();
        stmt.add_batch().unwrap();
    }

    assert_eq!(stmt.execute_batch().await.unwrap(), vec![1, 1, 1]);

    let executed = provider.last("m").unwrap().executed_with_parameters();
    let ids = executed
        .into_iter()
        .map(|(_, params)| params)
        .collect::<Vec<_>>();
    assert_eq!(
        ids,
        vec![vec![Value::Int(1)], vec![Value::Int(2)], vec![Value::Int(3)]]
    );

    conn.close().await.unwrap();
}

#[tokio::test]
async fn test_unexpected_outcome() {
    let provider = MockProvider::new();
    let conn = data_source(&provider).connection(&Session::new());
    let mut stmt = conn.create_statement().unwrap();

    assert!(matches!(
        stmt.execute_query("DELETE FROM t").await,
        Err(Error::UnexpectedOutcome(_))
    ));
    assert!(matches!(
        stmt.execute_update("SHOW tables").await,
        Err(Error::UnexpectedOutcome(_))
    ));
    assert!(matches!(
        stmt.execute("SHOW tables").await,
        Ok(Outcome::Rows(_))
    ));

    conn.close().await.unwrap();
}

#[tokio::test]
async fn test_bind_errors_reach_statement() {
    let provider = MockProvider::new();
    let router = ScriptedRouter::new();
    router.route("SELECT 1", "r1");

    let conn = scripted_data_source(&provider, &router).connection(&Session::new());
    conn.set_read_only(true).await.unwrap();
    provider.fail_on("r1", OperationKind::ReadOnly);

    let mut stmt = conn.create_statement().unwrap();
    assert!(matches!(
        stmt.execute_query("SELECT 1").await,
        Err(Error::StateSync { .. })
    ));

    provider.heal("r1");
    stmt.execute_query("SELECT 1").await.unwrap();
    assert_eq!(stmt.binding().data_source(), Some("r1"));
    assert_eq!(provider.lookups("r1"), 2);

    conn.close().await.unwrap();
}

#[tokio::test]
async fn test_closed_statements() {
    let provider = MockProvider::new();
    let conn = data_source(&provider).connection(&Session::new());

    let mut stmt = conn.create_statement().unwrap();
    stmt.execute_update("DELETE FROM t").await.unwrap();
    stmt.close();

    assert!(stmt.is_closed());
    assert!(!stmt.binding().bound());
    assert!(matches!(
        stmt.execute("DELETE FROM t").await,
        Err(Error::Closed)
    ));

    let mut prepared = conn.prepare_statement("SELECT 1").unwrap();
    conn.close().await.unwrap();

    assert!(prepared.is_closed());
    assert!(matches!(prepared.execute().await, Err(Error::Closed)));
    assert!(matches!(prepared.set_parameter(1, 1), Err(Error::Closed)));
}

#[tokio::test]
async fn test_failed_execution_unbinds() {
    let provider = MockProvider::new();
    let router = ScriptedRouter::new();
    router.route("SELECT 1", "r1");
    router.route("SELECT 2", "r2");
    provider.unreachable("r2");

    let conn = scripted_data_source(&provider, &router).connection(&Session::new());

    let mut stmt = conn.create_statement().unwrap();
    stmt.execute_query("SELECT 1").await.unwrap();
    assert_eq!(stmt.binding().data_source(), Some("r1"));

    assert!(matches!(
        stmt.execute_query("SELECT 2").await,
        Err(Error::Connectivity { .. })
    ));
    assert!(!stmt.binding().bound());

    let mut prepared = conn.prepare_statement("SELECT 1").unwrap();
    prepared.execute_query().await.unwrap();
    assert_eq!(prepared.binding().data_source(), Some("r1"));

    conn.session()
        .tracker()
        .set_hint(crate::session::Hint::DataSource("r2".into()));
    assert!(matches!(
        prepared.execute_query().await,
        Err(Error::Connectivity { .. })
    ));
    assert!(prepared.binding().data_source().is_none());

    conn.close().await.unwrap();
}
