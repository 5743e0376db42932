//! Error types for Solr command execution.
//!
//! Every failure a command can meet, from building the request body to
//! reading the reply, is normalized into one [`SolrError`]. Callers branch on
//! [`SolrError::kind`], [`SolrError::timed_out`] and [`SolrError::status_code`]
//! rather than on transport-specific error types.
//!
//! # Status Codes
//!
//! | `status_code` | Meaning |
//! |---------------|---------|
//! | `-1` | The remote host was never reached, or replied with an unusable body |
//! | `504` | The request timed out |
//! | any other | The HTTP status (or `responseHeader.status`) returned by Solr |

use thiserror::Error;

/// Sentinel status code meaning the remote host was never reached.
pub const STATUS_NOT_REACHED: i32 = -1;

/// Status code recorded on timed out requests.
pub const STATUS_TIMEOUT: i32 = 504;

/// Classification of a [`SolrError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The command could not be serialized; nothing was sent.
    Build,
    /// No response arrived within the configured timeout.
    Timeout,
    /// Connection refused, reset, DNS failure and the like.
    Transport,
    /// Solr answered with a non-success status.
    Remote,
    /// Solr answered with success but the body was unusable.
    Parse,
    /// The executor was used outside of its contract (e.g. no runtime).
    Usage,
}

/// The single error type surfaced by every executor.
///
/// Created once per failed execution and never mutated afterwards, apart
/// from the builder-style setters used while it is being assembled.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct SolrError {
    kind: ErrorKind,
    message: String,
    url: String,
    request_body: Option<String>,
    response_body: Option<String>,
    timed_out: bool,
    status_code: i32,
    name: Option<String>,
}

impl SolrError {
    fn new(kind: ErrorKind, message: impl Into<String>, url: impl Into<String>) -> Self {
        SolrError {
            kind,
            message: message.into(),
            url: url.into(),
            request_body: None,
            response_body: None,
            timed_out: false,
            status_code: STATUS_NOT_REACHED,
            name: None,
        }
    }

    /// The command could not be serialized.
    pub fn build(message: impl Into<String>, url: impl Into<String>) -> Self {
        Self::new(ErrorKind::Build, message, url)
    }

    /// No response within `timeout_secs`.
    pub fn timeout(timeout_secs: f64, url: impl Into<String>) -> Self {
        let mut err = Self::new(
            ErrorKind::Timeout,
            format!("Request timed out after {}s", timeout_secs),
            url,
        );
        err.timed_out = true;
        err.status_code = STATUS_TIMEOUT;
        err
    }

    /// Connection level failure; the host was never reached.
    pub fn transport(message: impl Into<String>, url: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transport, message, url)
    }

    /// Solr replied with `status`.
    pub fn remote(status: i32, message: impl Into<String>, url: impl Into<String>) -> Self {
        let mut err = Self::new(ErrorKind::Remote, message, url);
        err.status_code = status;
        err
    }

    /// Solr replied with success but the body could not be used.
    pub fn parse(message: impl Into<String>, url: impl Into<String>) -> Self {
        Self::new(ErrorKind::Parse, message, url)
    }

    /// The executor was called outside of its contract.
    pub fn usage(message: impl Into<String>, url: impl Into<String>) -> Self {
        Self::new(ErrorKind::Usage, message, url)
    }

    /// Attach the body that was sent.
    pub fn with_request_body(mut self, body: Option<String>) -> Self {
        self.request_body = body;
        self
    }

    /// Attach the raw body that was received.
    pub fn with_response_body(mut self, body: impl Into<String>) -> Self {
        self.response_body = Some(body.into());
        self
    }

    /// Attach the correlation name of the executor.
    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    /// Error classification
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Human readable description
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The address that was called, or the command handler if nothing was sent
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The body that was sent, if it was built
    pub fn request_body(&self) -> Option<&str> {
        self.request_body.as_deref()
    }

    /// The raw body received, if any
    pub fn response_body(&self) -> Option<&str> {
        self.response_body.as_deref()
    }

    /// Whether the request timed out
    pub fn timed_out(&self) -> bool {
        self.timed_out
    }

    /// Status code, `-1` if the remote host was never reached
    pub fn status_code(&self) -> i32 {
        self.status_code
    }

    /// Correlation name of the executor that produced this error
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Whether the remote host answered at all.
    ///
    /// True for remote and parse errors. A timeout carries status `504` but
    /// nothing answered; a parse error carries status `-1` but a reply arrived.
    pub fn reached_remote(&self) -> bool {
        matches!(self.kind, ErrorKind::Remote | ErrorKind::Parse)
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SolrError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_error_fields() {
        let err = SolrError::timeout(2.0, "http://localhost:8983/solr/select?wt=json");
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert!(err.timed_out());
        assert_eq!(err.status_code(), 504);
        assert_eq!(err.to_string(), "Request timed out after 2s");
        assert!(!err.reached_remote());
    }

    #[test]
    fn test_parse_error_reached_remote() {
        let err = SolrError::parse("Response body could not be parsed", "http://h/x")
            .with_response_body("garbage");
        assert_eq!(err.status_code(), STATUS_NOT_REACHED);
        assert!(err.reached_remote());
    }

    #[test]
    fn test_transport_error_never_reached() {
        let err = SolrError::transport("connection refused", "http://nowhere");
        assert!(!err.timed_out());
        assert_eq!(err.status_code(), STATUS_NOT_REACHED);
        assert!(!err.reached_remote());
        assert!(err.response_body().is_none());
    }

    #[test]
    fn test_remote_error_carries_bodies() {
        let err = SolrError::remote(500, "HTTP 500: Internal Server Error", "http://h/x")
            .with_request_body(Some("q=a".to_string()))
            .with_response_body("{\"key\":\"value\"}")
            .with_name(Some("shard-1".to_string()));
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.request_body(), Some("q=a"));
        assert_eq!(err.response_body(), Some("{\"key\":\"value\"}"));
        assert_eq!(err.name(), Some("shard-1"));
        assert!(err.reached_remote());
    }
}
