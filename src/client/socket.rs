//! Request/reply socket executor.
//!
//! Each command is sent as one opaque message:
//!
//! ```text
//! <handler>?wt=json[&params] [<body>]
//! ```
//!
//! where `<handler>` has any leading `/solr` removed and the body, when not
//! empty, follows a single space. The reply must be JSON carrying
//! `responseHeader.status`; `0` is success.
//!
//! | Reply | Result |
//! |-------|--------|
//! | nothing within the timeout | timeout, status `504` |
//! | socket error | transport error, status `-1` |
//! | not JSON | parse error |
//! | no `responseHeader` | parse error |
//! | no `responseHeader.status` | parse error |
//! | non-zero status | remote error carrying that status |
//!
//! The socket is returned to its pool only after a successful exchange.

use super::config::ClientConfig;
use super::pool::{ReqSocket, SocketConnector, SocketPool};
use super::utils::preview;
use crate::command::Command;
use crate::error::{Result, SolrError};
use crate::protocol::{check_envelope, EnvelopeError};
use crate::types::Response;
use serde_json::Value;
use std::io;
use std::sync::Arc;
use std::time::Duration;

/// Executes commands over pooled request/reply sockets.
pub struct SocketExecutor<C: SocketConnector> {
    address: String,
    name: Option<String>,
    pool: Arc<SocketPool<C>>,
    config: Arc<ClientConfig>,
}

impl<C: SocketConnector> Clone for SocketExecutor<C> {
    fn clone(&self) -> Self {
        SocketExecutor {
            address: self.address.clone(),
            name: self.name.clone(),
            pool: Arc::clone(&self.pool),
            config: Arc::clone(&self.config),
        }
    }
}

impl<C: SocketConnector> SocketExecutor<C> {
    /// Executor for `address` (e.g. `tcp://localhost:5555`) drawing sockets from `pool`
    pub fn new(address: &str, pool: Arc<SocketPool<C>>, config: ClientConfig) -> Self {
        SocketExecutor {
            address: address.to_string(),
            name: None,
            pool,
            config: Arc::new(config),
        }
    }

    /// Tag every response and error with `name`.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Send `command` and wait for the reply on the caller's thread.
    pub fn execute<Cmd: Command + ?Sized>(&self, command: &Cmd) -> Result<Response> {
        let body = command.body().map_err(|e| e.with_name(self.name.clone()))?;
        let handler = command.handler().socket_form();
        let url = format!("{}{}", self.address, handler);
        let message = if body.is_empty() {
            handler
        } else {
            format!("{} {}", handler, body)
        };
        let request_body = (!body.is_empty()).then_some(body);

        let mut socket = self.pool.checkout(&self.address).map_err(|e| {
            SolrError::transport(e.to_string(), url.as_str())
                .with_request_body(request_body.clone())
                .with_name(self.name.clone())
        })?;

        if self.config.enable_logging {
            tracing::debug!(url = %url, "sending Solr socket request");
        }

        let timeout = self.config.timeout();
        let outcome = exchange(&mut *socket, message.as_bytes(), timeout);
        match classify_reply(outcome, &url, timeout) {
            Ok(body) => Ok(Response::new(self.name.clone(), body)),
            Err(e) => {
                socket.discard();
                let e = e.with_request_body(request_body).with_name(self.name.clone());
                if self.config.enable_logging {
                    tracing::warn!(
                        url = %e.url(),
                        status = e.status_code(),
                        timed_out = e.timed_out(),
                        "Solr socket request failed: {}",
                        e
                    );
                }
                Err(e)
            }
        }
    }

    /// Address sockets connect to
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Correlation name
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

fn exchange<S: ReqSocket + ?Sized>(
    socket: &mut S,
    message: &[u8],
    timeout: Duration,
) -> io::Result<Option<Vec<u8>>> {
    socket.send(message)?;
    socket.recv_timeout(timeout)
}

fn classify_reply(
    outcome: io::Result<Option<Vec<u8>>>,
    url: &str,
    timeout: Duration,
) -> Result<Value> {
    let raw = match outcome {
        Ok(Some(raw)) => raw,
        Ok(None) => return Err(SolrError::timeout(timeout.as_secs_f64(), url)),
        Err(e) if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) => {
            return Err(SolrError::timeout(timeout.as_secs_f64(), url));
        }
        Err(e) => return Err(SolrError::transport(e.to_string(), url)),
    };

    let text = String::from_utf8_lossy(&raw);
    let reply: Value = serde_json::from_slice(&raw).map_err(|e| {
        SolrError::parse(format!("Response body could not be parsed: {}", e), url)
            .with_response_body(text.as_ref())
    })?;

    match check_envelope(&reply) {
        Ok(()) => Ok(reply),
        Err(EnvelopeError::MissingHeader) => Err(SolrError::parse(
            format!("Response has no responseHeader: {}", preview(&text, 200)),
            url,
        )
        .with_response_body(text.as_ref())),
        Err(EnvelopeError::MissingStatus) => Err(SolrError::parse(
            "Response responseHeader has no status",
            url,
        )
        .with_response_body(text.as_ref())),
        Err(EnvelopeError::Status(status)) => Err(SolrError::remote(
            i32::try_from(status).unwrap_or(i32::MAX),
            format!("Solr returned status {}", status),
            url,
        )
        .with_response_body(text.as_ref())),
    }
}
