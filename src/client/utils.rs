//! Utility functions for the executors.
//!
//! - Status code messages
//! - Request header construction
//! - Body previews for log events

use super::config::{ClientConfig, Credentials};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use http::StatusCode;

/// Build the message recorded for an HTTP status, e.g. `HTTP 404: Not Found`.
///
/// # Examples
///
/// ```
/// use solr_client::client::status_message;
///
/// assert_eq!(status_message(500), "HTTP 500: Internal Server Error");
/// assert_eq!(status_message(599), "HTTP 599: Unknown");
/// ```
pub fn status_message(status: u16) -> String {
    let reason = StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown");
    format!("HTTP {}: {}", status, reason)
}

/// `Authorization` header value for basic authentication.
pub fn basic_auth_value(credentials: &Credentials) -> String {
    let token = STANDARD.encode(format!("{}:{}", credentials.user, credentials.password));
    format!("Basic {}", token)
}

/// Headers sent with every HTTP request of a command.
pub fn request_headers(content_type: &str, config: &ClientConfig) -> Vec<(String, String)> {
    let mut headers = vec![("content-type".to_string(), content_type.to_string())];
    if let Some(credentials) = &config.credentials {
        headers.push(("authorization".to_string(), basic_auth_value(credentials)));
    }
    headers
}

/// First `max` characters of a body, for log events.
pub fn preview(body: &str, max: usize) -> &str {
    match body.char_indices().nth(max) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
