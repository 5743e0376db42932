//! Blocking executor.
//!
//! The caller's thread waits until the reply arrives or the configured
//! timeout expires.
//!
//! # Examples
//!
//! ```ignore
//! use solr_client::client::HttpExecutor;
//! use solr_client::command::QueryCommand;
//!
//! let executor = HttpExecutor::new("http://localhost:8983");
//! let mut query = QueryCommand::new();
//! query.add_param("q", "*:*");
//! let response = executor.execute(&query)?;
//! println!("{}", response.body);
//! ```

use super::classify::{build_request, classify, RequestContext};
use super::config::ClientConfig;
use super::transport::{BlockingReqwestTransport, Transport};
use crate::command::Command;
use crate::error::Result;
use crate::types::Response;
use std::sync::Arc;

/// Executes commands synchronously over HTTP.
#[derive(Clone)]
pub struct HttpExecutor<T = BlockingReqwestTransport> {
    address: String,
    name: Option<String>,
    transport: Arc<T>,
    config: Arc<ClientConfig>,
}

impl HttpExecutor<BlockingReqwestTransport> {
    /// Executor for `address` (e.g. `http://localhost:8983`) with default configuration
    pub fn new(address: &str) -> Self {
        Self::with_config(address, ClientConfig::default())
    }

    /// Executor for `address` with custom configuration
    pub fn with_config(address: &str, config: ClientConfig) -> Self {
        Self::with_transport(address, config, BlockingReqwestTransport::new())
    }
}

impl<T: Transport> HttpExecutor<T> {
    /// Executor using a caller-provided transport
    pub fn with_transport(address: &str, config: ClientConfig, transport: T) -> Self {
        HttpExecutor {
            address: address.trim_end_matches('/').to_string(),
            name: None,
            transport: Arc::new(transport),
            config: Arc::new(config),
        }
    }

    /// Tag every response and error with `name`.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Execute `command`, returning the parsed reply.
    ///
    /// Produces exactly one outcome and never retries.
    pub fn execute<C: Command + ?Sized>(&self, command: &C) -> Result<Response> {
        let request = build_request(command, &self.address, &self.config)
            .map_err(|e| e.with_name(self.name.clone()))?;

        if self.config.enable_logging {
            tracing::debug!(url = %request.url, method = %request.method, "dispatching Solr request");
        }

        let outcome = self.transport.send(&request);
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
