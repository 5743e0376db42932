//! End-to-end tests against a throwaway Solr stand-in.
//!
//! The stand-in answers:
//! - `/query`: echoes every query string and form argument under `response`,
//!   sleeping `s` seconds first when asked to
//! - `/update`: parses the batch, duplicate keys included, and lists its operations
//! - `/error`: HTTP 500
//! - `/garbage`: HTTP 200 with a body that is not JSON

use crate::client::{AsyncHttpExecutor, ClientConfig, HttpExecutor};
use crate::command::{Command, QueryCommand, UpdateCommand, UpdateConfig, UpdateEntry};
use crate::error::ErrorKind;
use axum::extract::RawQuery;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde_json::{json, Map, Value};
use std::fmt;
use std::time::Duration;
use tokio::sync::oneshot;
use url::form_urlencoded;

/// Top-level members of a JSON object in document order, duplicates kept.
#[derive(Debug)]
struct OrderedEntries(Vec<(String, Value)>);

impl<'de> Deserialize<'de> for OrderedEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = OrderedEntries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut map: A,
            ) -> std::result::Result<OrderedEntries, A::Error> {
                let mut entries = Vec::new();
                while let Some((key, value)) = map.next_entry::<String, Value>()? {
                    entries.push((key, value));
                }
                Ok(OrderedEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

async fn query_handler(RawQuery(raw): RawQuery, body: String) -> Json<Value> {
    let raw = raw.unwrap_or_default();
    let mut arguments = Map::new();
    for (name, value) in
        form_urlencoded::parse(raw.as_bytes()).chain(form_urlencoded::parse(body.as_bytes()))
    {
        let values = arguments
            .entry(name.into_owned())
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(values) = values {
            values.push(Value::String(value.into_owned()));
        }
    }

    let sleep = arguments
        .get("s")
        .and_then(|v| v[0].as_str())
        .and_then(|s| s.parse::<u64>().ok());
    if let Some(secs) = sleep {
        tokio::time::sleep(Duration::from_secs(secs)).await;
    }

    Json(json!({"responseHeader": {"status": 0}, "response": arguments}))
}

async fn update_handler(body: String) -> std::result::Result<Json<Value>, (StatusCode, String)> {
    let entries: OrderedEntries =
        serde_json::from_str(&body).map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    let ops: Vec<&str> = entries.0.iter().map(|(op, _)| op.as_str()).collect();
    Ok(Json(json!({"responseHeader": {"status": 0}, "ops": ops})))
}

fn router() -> Router {
    Router::new()
        .route("/query", post(query_handler).get(query_handler))
        .route("/update", post(update_handler))
        .route(
            "/error",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, r#"{"key":"value"}"#) }),
        )
        .route("/garbage", post(|| async { "this is not json" }))
}

/// Serve on the current runtime.
async fn spawn_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router()).await.unwrap();
    });
    format!("http://{}", address)
}

/// Serve from a dedicated thread, for the blocking executor.
fn spawn_server_thread() -> String {
    let (tx, rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            tx.send(listener.local_addr().unwrap()).unwrap();
            axum::serve(listener, router()).await.unwrap();
        });
    });
    format!("http://{}", rx.recv().unwrap())
}

fn update_batch() -> UpdateCommand {
    let mut update = UpdateCommand::with_config(UpdateConfig {
        handler: "/update".to_string(),
        commit_within: Some(1000),
        ..Default::default()
    });
    update
        .add_documents(&json!([{"id": "a", "n": 1}, {"id": "b", "n": 2}]), Some(1.5), None)
        .unwrap();
    update.add_delete_by_id("c");
    update.add_delete_by_query(vec!["n:[10 TO *]", "id:z*"]);
    update.add_commit();
    update.add_optimize(true, false);
    update
}

#[test]
fn test_fan_out_counts_and_order() {
    let update = update_batch();
    let ops: Vec<&str> = update.entries().iter().map(UpdateEntry::op_name).collect();
    assert_eq!(
        ops,
        ["add", "add", "delete", "delete", "delete", "commit", "optimize"]
    );
}

#[test]
fn test_update_body_round_trip() {
    let update = update_batch();
    let parsed: OrderedEntries = serde_json::from_str(&update.body().unwrap()).unwrap();
    let expected: Vec<(String, Value)> = update
        .entries()
        .iter()
        .map(|e| (e.op_name().to_string(), e.payload()))
        .collect();
    assert_eq!(parsed.0, expected);
}

#[test]
fn test_clear_then_reuse() {
    let mut update = update_batch();
    update.clear();
    assert_eq!(update.body().unwrap(), "{}");
    assert_eq!(update.handler().to_string(), "/update?wt=json&commitWithin=1000");

    update.add_delete_by_id(["x", "y"]);
    let parsed: OrderedEntries = serde_json::from_str(&update.body().unwrap()).unwrap();
    assert_eq!(parsed.0.len(), 2);
}

#[test]
fn test_blocking_query_and_update() {
    let address = spawn_server_thread();
    let executor = HttpExecutor::new(&address).with_name("blocking");

    let mut query = QueryCommand::with_handler("/query");
    query.add_param("q", "test query");
    query.add_param("fq", "a");
    query.add_param("fq", "b");
    let response = executor.execute(&query).unwrap();
    assert_eq!(response.name.as_deref(), Some("blocking"));
    assert_eq!(response.body["response"]["wt"], json!(["json"]));
    assert_eq!(response.body["response"]["q"], json!(["test query"]));
    assert_eq!(response.body["response"]["fq"], json!(["a", "b"]));

    let response = executor.execute(&update_batch()).unwrap();
    assert_eq!(
        response.body["ops"],
        json!(["add", "add", "delete", "delete", "delete", "commit", "optimize"])
    );
}

#[test]
fn test_blocking_error_classification() {
    let address = spawn_server_thread();
    let executor = HttpExecutor::new(&address);

    let mut error = QueryCommand::with_handler("/error");
    error.add_param("q", "a");
    let err = executor.execute(&error).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Remote);
    assert_eq!(err.status_code(), 500);
    assert_eq!(err.response_body(), Some(r#"{"key":"value"}"#));
    assert_eq!(err.url(), format!("{}/error?wt=json", address));

    let mut garbage = QueryCommand::with_handler("/garbage");
    garbage.add_param("q", "a");
    let err = executor.execute(&garbage).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
    assert_eq!(err.status_code(), -1);
    assert_eq!(err.response_body(), Some("this is not json"));
}

#[tokio::test]
async fn test_async_query() {
    let address = spawn_server().await;
    let executor = AsyncHttpExecutor::new(&address);

    let mut query = QueryCommand::with_handler("/query");
    query.add_param("q", "a");
    let response = executor.execute(&query).await.unwrap();
    assert_eq!(response.body["response"]["q"], json!(["a"]));
}

#[tokio::test]
async fn test_async_callback_timeout() {
    let address = spawn_server().await;
    let executor = AsyncHttpExecutor::with_config(
        &address,
        ClientConfig {
            request_timeout_ms: 500,
            ..Default::default()
        },
    );

    let mut query = QueryCommand::with_handler("/query");
    query.add_param("q", "a");
    query.add_param("s", 3);

    let (tx, rx) = oneshot::channel();
    executor
        .execute_with_callback(&query, move |result| {
            let _ = tx.send(result);
        })
        .unwrap();

    let err = rx.await.unwrap().unwrap_err();
    assert!(err.timed_out());
    assert_eq!(err.message(), "Request timed out after 0.5s");
}

#[tokio::test]
async fn test_async_fan_out_keeps_order() {
    let address = spawn_server().await;
    let executor = AsyncHttpExecutor::new(&address);

    let commands: Vec<QueryCommand> = (0..5)
        .map(|i| {
            let mut query = QueryCommand::with_handler("/query");
            query.add_param("q", format!("id:{}", i));
            query
        })
        .collect();
    let results = executor.execute_all(&commands).await;
    for (i, result) in results.into_iter().enumerate() {
        let body = result.unwrap().into_body();
        assert_eq!(body["response"]["q"], json!([format!("id:{}", i)]));
    }
}

#[test]
fn test_async_execute_from_blocking_context() {
    let address = spawn_server_thread();
    let mut query = QueryCommand::with_handler("/query");
    query.add_param("q", "a");

    let response = tokio_test::block_on(async {
        let executor = AsyncHttpExecutor::new(&address).with_name("block-on");
        executor.execute(&query).await
    })
    .unwrap();
    assert_eq!(response.name.as_deref(), Some("block-on"));
}
