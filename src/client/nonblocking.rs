//! Non-blocking executor.
//!
//! Requests run on the tokio runtime. Commands can be awaited directly with
//! [`AsyncHttpExecutor::execute`], or handed off with
//! [`AsyncHttpExecutor::execute_with_callback`], which returns immediately
//! and later invokes the callback exactly once with the outcome.
//!
//! # Examples
//!
//! ```ignore
//! use solr_client::client::AsyncHttpExecutor;
//! use solr_client::command::QueryCommand;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let executor = AsyncHttpExecutor::new("http://localhost:8983");
//!     let mut query = QueryCommand::new();
//!     query.add_param("q", "*:*");
//!
//!     let pending = executor.execute_with_callback(&query, |result| match result {
//!         Ok(response) => println!("{}", response.body),
//!         Err(e) => eprintln!("Error: {}", e),
//!     })?;
//!     pending.await;
//!     Ok(())
//! }
//! ```

use super::classify::{build_request, classify, RequestContext};
use super::config::ClientConfig;
use super::transport::{AsyncTransport, ReqwestTransport, TransportRequest};
use crate::command::Command;
use crate::error::{Result, SolrError};
use crate::types::Response;
use futures::future::join_all;
use futures::FutureExt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::runtime::Handle;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

/// Executes commands on the tokio runtime.
///
/// At most `max_clients` requests of one executor (and its clones) are in
/// flight at a time; further requests wait for a slot.
pub struct AsyncHttpExecutor<T = ReqwestTransport> {
    address: String,
    name: Option<String>,
    transport: Arc<T>,
    config: Arc<ClientConfig>,
    slots: Arc<Semaphore>,
}

impl<T> Clone for AsyncHttpExecutor<T> {
    fn clone(&self) -> Self {
        AsyncHttpExecutor {
            address: self.address.clone(),
            name: self.name.clone(),
            transport: Arc::clone(&self.transport),
            config: Arc::clone(&self.config),
            slots: Arc::clone(&self.slots),
        }
    }
}

impl AsyncHttpExecutor<ReqwestTransport> {
    /// Executor for `address` with default configuration
    pub fn new(address: &str) -> Self {
        Self::with_config(address, ClientConfig::default())
    }

    /// Executor for `address` with custom configuration
    pub fn with_config(address: &str, config: ClientConfig) -> Self {
        Self::with_transport(address, config, ReqwestTransport::new())
    }
}

impl<T: AsyncTransport + 'static> AsyncHttpExecutor<T> {
    /// Executor using a caller-provided transport
    pub fn with_transport(address: &str, config: ClientConfig, transport: T) -> Self {
        AsyncHttpExecutor {
            address: address.trim_end_matches('/').to_string(),
            name: None,
            transport: Arc::new(transport),
            slots: Arc::new(Semaphore::new(config.max_clients.max(1))),
            config: Arc::new(config),
        }
    }

    /// Tag every response and error with `name`.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Execute `command` and await the parsed reply.
    pub async fn execute<C: Command + ?Sized>(&self, command: &C) -> Result<Response> {
        let request = build_request(command, &self.address, &self.config)
            .map_err(|e| e.with_name(self.name.clone()))?;
        self.dispatch(request).await
    }

    /// Execute every command concurrently, results in the order of `commands`.
    pub async fn execute_all<C: Command>(&self, commands: &[C]) -> Vec<Result<Response>> {
        join_all(commands.iter().map(|command| self.execute(command))).await
    }

    /// Start `command` and return immediately.
    ///
    /// `callback` is invoked exactly once, from a task on the current
    /// runtime (the loop thread itself on a current-thread runtime). Build
    /// errors and a missing runtime are returned here instead, and the
    /// callback is then never invoked.
    pub fn execute_with_callback<C, F>(&self, command: &C, callback: F) -> Result<PendingRequest>
    where
        C: Command + ?Sized,
        F: FnOnce(Result<Response>) + Send + 'static,
    {
        let runtime = Handle::try_current().map_err(|_| {
            SolrError::usage(
                "a running tokio runtime is required for non-blocking execution",
                format!("{}{}", self.address, command.handler()),
            )
            .with_name(self.name.clone())
        })?;
        let request = build_request(command, &self.address, &self.config)
            .map_err(|e| e.with_name(self.name.clone()))?;

        let executor = self.clone();
        let task = runtime.spawn(async move {
            let result = executor.dispatch(request).await;
            callback(result);
        });
        Ok(PendingRequest { task })
    }

    async fn dispatch(&self, request: TransportRequest) -> Result<Response> {
        let _slot = self.slots.acquire().await.map_err(|_| {
            SolrError::usage("executor has been shut down", request.url.clone())
                .with_name(self.name.clone())
        })?;

        if self.config.enable_logging {
            tracing::debug!(url = %request.url, method = %request.method, "dispatching Solr request");
        }

        let outcome = self.transport.send(request.clone()).await;
        let ctx = RequestContext::of(&request, self.name.as_deref());
        match classify(outcome, &ctx) {
            Ok(body) => Ok(Response::new(self.name.clone(), body)),
            Err(e) => {
                if self.config.enable_logging {
                    tracing::warn!(
                        url = %e.url(),
                        status = e.status_code(),
                        timed_out = e.timed_out(),
                        "Solr request failed: {}",
                        e
                    );
                }
                Err(e)
            }
        }
    }

    /// Base address requests are sent to
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Correlation name
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Get the executor configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

/// Handle of a request started with [`AsyncHttpExecutor::execute_with_callback`].
///
/// Awaiting it waits until the callback has returned. Dropping it does not
/// cancel the request; the callback still runs.
#[derive(Debug)]
pub struct PendingRequest {
    task: JoinHandle<()>,
}

impl PendingRequest {
    /// Whether the callback has already run
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Future for PendingRequest {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.task.poll_unpin(cx).map(|_| ())
    }
}
