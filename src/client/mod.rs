//! Executors for Solr commands.
//!
//! An executor is bound to one target address. It asks a command for its
//! handler, body and content type, hands the request to a transport, and
//! classifies the outcome into the parsed reply or a single
//! [`SolrError`](crate::SolrError). No executor retries; retry policy belongs
//! to the caller.
//!
//! # Module Organization
//!
//! ```text
//! client/
//! ├── blocking    - HttpExecutor (caller's thread waits)
//! ├── nonblocking - AsyncHttpExecutor and PendingRequest (tokio)
//! ├── socket      - SocketExecutor (request/reply sockets)
//! ├── pool        - SocketPool and the socket traits
//! ├── transport   - HTTP transport traits and reqwest backends
//! ├── classify    - request building and outcome classification
//! ├── config      - ClientConfig
//! └── utils       - Utility functions
//! ```
//!
//! # Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`HttpExecutor`] | Blocking HTTP execution |
//! | [`AsyncHttpExecutor`] | Awaitable or callback-based HTTP execution |
//! | [`SocketExecutor`] | Execution over pooled request/reply sockets |
//! | [`SocketPool`] | Bounded per-address socket pools |
//! | [`ClientConfig`] | Timeout, concurrency and credential options |
//!
//! # Examples
//!
//! ## Creating an Executor
//!
//! ```
//! use solr_client::client::{ClientConfig, HttpExecutor};
//!
//! let config = ClientConfig {
//!     request_timeout_ms: 5000,
//!     ..Default::default()
//! };
//! let executor = HttpExecutor::with_config("http://localhost:8983", config)
//!     .with_name("primary");
//! assert_eq!(executor.name(), Some("primary"));
//! ```
//!
//! ## Classifying Errors
//!
//! ```ignore
//! match executor.execute(&query) {
//!     Ok(response) => println!("{}", response.body),
//!     Err(e) if e.timed_out() => eprintln!("slow server: {}", e),
//!     Err(e) if !e.reached_remote() => eprintln!("unreachable: {}", e),
//!     Err(e) => eprintln!("Solr said {}: {:?}", e.status_code(), e.response_body()),
//! }
//! ```

mod blocking;
mod classify;
mod config;
mod nonblocking;
mod pool;
mod socket;
mod transport;
mod utils;

pub use blocking::HttpExecutor;
pub use classify::{build_request, classify, RequestContext};
pub use config::{ClientConfig, Credentials};
pub use nonblocking::{AsyncHttpExecutor, PendingRequest};
pub use pool::{PooledSocket, ReqSocket, SocketConnector, SocketPool};
pub use socket::SocketExecutor;
pub use transport::{
    AsyncTransport, BlockingReqwestTransport, ReqwestTransport, Transport, TransportFailure,
    TransportRequest, TransportResponse,
};
pub use utils::*;
