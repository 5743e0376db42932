//! Index a few documents and query them back.
//!
//! Usage: `cargo run --example query_demo -- [http://localhost:8983]`

use chrono::{TimeZone, Utc};
use serde::Serialize;
use solr_client::protocol::encoder::timestamp;
use solr_client::{AsyncHttpExecutor, ClientConfig, HttpExecutor, QueryCommand, UpdateCommand};

#[derive(Serialize)]
struct Book {
    id: String,
    title: String,
    #[serde(serialize_with = "timestamp::serialize")]
    published: chrono::DateTime<Utc>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let address = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "http://localhost:8983".to_string());
    let config = ClientConfig {
        request_timeout_ms: 5000,
        ..Default::default()
    };

    let books = vec![
        Book {
            id: "1".to_string(),
            title: "The Rust Programming Language".to_string(),
            published: Utc.with_ymd_and_hms(2018, 8, 12, 0, 0, 0).unwrap(),
        },
        Book {
            id: "2".to_string(),
            title: "Programming Rust".to_string(),
            published: Utc.with_ymd_and_hms(2021, 6, 21, 0, 0, 0).unwrap(),
        },
    ];

    let mut update = UpdateCommand::new();
    update.add_documents(&books, None, Some(true))?;
    update.add_commit();

    let blocking_address = address.clone();
    let blocking_config = config.clone();
    tokio::task::spawn_blocking(move || {
        HttpExecutor::with_config(&blocking_address, blocking_config)
            .with_name("indexer")
            .execute(&update)
    })
    .await??;
    tracing::info!(count = books.len(), "indexed books");

    let executor = AsyncHttpExecutor::with_config(&address, config).with_name("search");
    let mut query = QueryCommand::new();
    query.add_param("q", "title:rust");
    query.add_param("fl", "id,title,published");

    let response = executor.execute(&query).await?;
    tracing::info!(found = ?response.num_found(), "query finished");
    println!("{}", serde_json::to_string_pretty(&response.body)?);
    Ok(())
}
