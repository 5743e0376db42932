//! HTTP transports.
//!
//! A transport accepts `(url, method, body, headers, timeout)` and returns
//! either a `(status, body)` pair or a [`TransportFailure`]. It never
//! interprets the status or the body; that is the classifier's job.
//!
//! | Transport | Trait | Backend |
//! |-----------|-------|---------|
//! | [`BlockingReqwestTransport`] | [`Transport`] | `reqwest::blocking` |
//! | [`ReqwestTransport`] | [`AsyncTransport`] | `reqwest` on tokio |
//!
//! Tests and alternative backends implement the traits directly.

use async_trait::async_trait;
use bytes::Bytes;
use http::Method;
use std::time::Duration;
use thiserror::Error;

/// A fully built request.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    /// `POST` when there is a body, `GET` otherwise
    pub method: Method,
    /// Absolute URL including the handler query string
    pub url: String,
    /// Request body
    pub body: Option<String>,
    /// Header name/value pairs
    pub headers: Vec<(String, String)>,
    /// Upper bound on the whole exchange
    pub timeout: Duration,
}

/// Raw reply from the server.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// Raw body
    pub body: Bytes,
}

impl TransportResponse {
    /// Create a response
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        TransportResponse {
            status,
            body: body.into(),
        }
    }
}

/// The server could not be talked to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportFailure {
    /// No reply within the request timeout.
    #[error("request timed out")]
    Timeout,
    /// Connection refused, reset, DNS failure, protocol error.
    #[error("{0}")]
    Connection(String),
}

/// Blocking transport: the caller's thread waits for the reply.
pub trait Transport: Send + Sync {
    /// Perform one exchange
    fn send(&self, request: &TransportRequest) -> Result<TransportResponse, TransportFailure>;
}

/// Non-blocking transport driven by the tokio runtime.
#[async_trait]
pub trait AsyncTransport: Send + Sync {
    /// Perform one exchange
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportFailure>;
}

fn failure_from(err: reqwest::Error) -> TransportFailure {
    if err.is_timeout() {
        TransportFailure::Timeout
    } else {
        TransportFailure::Connection(err.to_string())
    }
}

/// [`Transport`] backed by `reqwest::blocking`.
///
/// Like every `reqwest::blocking` client, it must not be created or dropped
/// from within an async runtime.
#[derive(Debug, Clone, Default)]
pub struct BlockingReqwestTransport {
    client: reqwest::blocking::Client,
}

impl BlockingReqwestTransport {
    /// Create a transport with a fresh client
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an existing client
    pub fn with_client(client: reqwest::blocking::Client) -> Self {
        BlockingReqwestTransport { client }
    }
}

impl Transport for BlockingReqwestTransport {
    fn send(&self, request: &TransportRequest) -> Result<TransportResponse, TransportFailure> {
        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .timeout(request.timeout);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().map_err(failure_from)?;
        let status = response.status().as_u16();
        let body = response.bytes().map_err(failure_from)?;
        Ok(TransportResponse { status, body })
    }
}

/// [`AsyncTransport`] backed by an async `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with a fresh client
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an existing client
    pub fn with_client(client: reqwest::Client) -> Self {
        ReqwestTransport { client }
    }
}

#[async_trait]
impl AsyncTransport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportFailure> {
        let mut builder = self
            .client
            .request(request.method, &request.url)
            .timeout(request.timeout);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(failure_from)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(failure_from)?;
        Ok(TransportResponse { status, body })
    }
}
