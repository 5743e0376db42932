#![warn(missing_docs)]

//! # solr_client: Solr commands over HTTP and request/reply sockets
//!
//! This crate builds update and query requests against a named Solr handler,
//! serializes them into the wire formats Solr expects, and executes them
//! blocking, non-blocking (awaited or with a callback), or over pooled
//! request/reply sockets. Every failure is normalized into one error type.
//!
//! ## Overview
//!
//! 1. **Commands** - [`UpdateCommand`] batches adds, deletes, commits and
//!    optimizes as JSON; [`QueryCommand`] collects form encoded parameters
//! 2. **Encoding** - standard JSON, with timestamps written as
//!    `YYYY-MM-DDTHH:MM:SSZ`
//! 3. **Executors** - [`HttpExecutor`], [`AsyncHttpExecutor`] and
//!    [`SocketExecutor`] send a command and classify the outcome
//! 4. **Errors** - [`SolrError`] carries the message, called URL, request and
//!    response bodies, a timeout flag and a status code (`-1` when the host
//!    was never reached)
//!
//! ## Wire Formats
//!
//! | Request | Method | Content-Type | Body |
//! |---------|--------|--------------|------|
//! | Update | `POST` | `application/json; charset=utf-8` | `{"add":{"doc":{...}},"delete":{"id":"1"}}` |
//! | Query | `POST` (`GET` when empty) | `application/x-www-form-urlencoded; charset=utf-8` | `q=a&fq=b&fq=c` |
//! | Socket | - | - | `/select?wt=json q=a` |
//!
//! ## Usage
//!
//! ```ignore
//! use solr_client::{HttpExecutor, QueryCommand, UpdateCommand};
//! use serde_json::json;
//!
//! let executor = HttpExecutor::new("http://localhost:8983");
//!
//! let mut update = UpdateCommand::new();
//! update.add_documents(&json!([{"id": "1"}, {"id": "2"}]), None, None)?;
//! update.add_commit();
//! executor.execute(&update)?;
//!
//! let mut query = QueryCommand::new();
//! query.add_param("q", "id:1");
//! let response = executor.execute(&query)?;
//! println!("found {:?}", response.num_found());
//! ```
//!
//! ## Module Structure
//!
//! - **[command]** - Command trait, update and query commands
//! - **[protocol]** - Wire constants, JSON encoder, response envelope checks
//! - **[client]** - Executors, transports, socket pool, configuration
//! - **[error]** - Error type and result alias
//! - **[types]** - Response type

pub mod client;
pub mod command;
pub mod error;
pub mod protocol;
pub mod types;

pub use client::{AsyncHttpExecutor, ClientConfig, HttpExecutor, SocketExecutor, SocketPool};
pub use command::{Command, Handler, QueryCommand, UpdateCommand, UpdateConfig};
pub use error::{ErrorKind, Result, SolrError};
pub use protocol::encoder::{BoostedField, Timestamp};
pub use types::Response;

#[cfg(test)]
mod tests;
