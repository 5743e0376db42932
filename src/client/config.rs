//! Executor configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Username and password for HTTP basic authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// User name
    pub user: String,
    /// Password
    pub password: String,
}

/// Configuration shared by the executors.
///
/// # Examples
///
/// ```
/// use solr_client::client::ClientConfig;
///
/// let config = ClientConfig {
///     request_timeout_ms: 2000,
///     ..Default::default()
/// };
/// assert_eq!(config.max_clients, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Timeout of a single request in milliseconds, enforced on every platform
    pub request_timeout_ms: u64,
    /// Maximum number of in-flight non-blocking requests per executor
    pub max_clients: usize,
    /// Capacity of each per-address socket pool
    pub pool_size: usize,
    /// Basic authentication for HTTP executors
    pub credentials: Option<Credentials>,
    /// Emit `tracing` events for dispatches and failures
    pub enable_logging: bool,
}

impl ClientConfig {
    /// Request timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            request_timeout_ms: 30_000,
            max_clients: 10,
            pool_size: 10,
            credentials: None,
            enable_logging: true,
        }
    }
}
