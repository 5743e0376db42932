//! Request building and outcome classification for the HTTP executors.
//!
//! # Classification
//!
//! | Transport outcome | Result |
//! |-------------------|--------|
//! | timeout | [`ErrorKind::Timeout`], `timed_out`, status `504` |
//! | connection failure | [`ErrorKind::Transport`], status `-1` |
//! | status other than 200 | [`ErrorKind::Remote`], the status and raw body |
//! | 200, body is not JSON | [`ErrorKind::Parse`], status `-1`, raw body |
//! | 200, body is JSON | parsed value |
//!
//! Classification is terminal: nothing here retries.
//!
//! [`ErrorKind::Timeout`]: crate::error::ErrorKind::Timeout
//! [`ErrorKind::Transport`]: crate::error::ErrorKind::Transport
//! [`ErrorKind::Remote`]: crate::error::ErrorKind::Remote
//! [`ErrorKind::Parse`]: crate::error::ErrorKind::Parse

use super::config::ClientConfig;
use super::transport::{TransportFailure, TransportRequest, TransportResponse};
use super::utils::{request_headers, status_message};
use crate::command::Command;
use crate::error::{Result, SolrError};
use http::Method;
use serde_json::Value;
use std::time::Duration;

/// What the classifier needs to know about the request it is judging.
#[derive(Debug, Clone, Copy)]
pub struct RequestContext<'a> {
    /// Address that was called
    pub url: &'a str,
    /// Body that was sent
    pub body: Option<&'a str>,
    /// Timeout the request ran under
    pub timeout: Duration,
    /// Correlation name of the executor
    pub name: Option<&'a str>,
}

impl<'a> RequestContext<'a> {
    /// Context of a prepared request
    pub fn of(request: &'a TransportRequest, name: Option<&'a str>) -> Self {
        RequestContext {
            url: &request.url,
            body: request.body.as_deref(),
            timeout: request.timeout,
            name,
        }
    }

    fn decorate(&self, err: SolrError) -> SolrError {
        err.with_request_body(self.body.map(str::to_string))
            .with_name(self.name.map(str::to_string))
    }
}

/// Build the transport request for `command` against `address`.
///
/// The method is `POST` when the body is non-empty and `GET` otherwise.
/// A body that cannot be built is returned as a build error and nothing is
/// sent.
pub fn build_request<C: Command + ?Sized>(
    command: &C,
    address: &str,
    config: &ClientConfig,
) -> Result<TransportRequest> {
    let body = command.body()?;
    let url = format!("{}{}", address.trim_end_matches('/'), command.handler());
    let (method, body) = if body.is_empty() {
        (Method::GET, None)
    } else {
        (Method::POST, Some(body))
    };
    Ok(TransportRequest {
        method,
        url,
        body,
        headers: request_headers(command.content_type(), config),
        timeout: config.timeout(),
    })
}

/// Turn a raw transport outcome into the parsed body or one [`SolrError`].
pub fn classify(
    outcome: std::result::Result<TransportResponse, TransportFailure>,
    ctx: &RequestContext<'_>,
) -> Result<Value> {
    let response = match outcome {
        Ok(response) => response,
        Err(TransportFailure::Timeout) => {
            return Err(ctx.decorate(SolrError::timeout(ctx.timeout.as_secs_f64(), ctx.url)));
        }
        Err(TransportFailure::Connection(message)) => {
            return Err(ctx.decorate(SolrError::transport(message, ctx.url)));
        }
    };

    let text = String::from_utf8_lossy(&response.body);
    if response.status != 200 {
        return Err(ctx.decorate(
            SolrError::remote(
                i32::from(response.status),
                status_message(response.status),
                ctx.url,
            )
            .with_response_body(text),
        ));
    }

    serde_json::from_slice(&response.body).map_err(|e| {
        ctx.decorate(
            SolrError::parse(format!("Response body could not be parsed: {}", e), ctx.url)
                .with_response_body(text),
        )
    })
}
