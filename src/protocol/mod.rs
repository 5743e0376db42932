//! Solr wire protocol constants and response envelope checks.
//!
//! # Wire Formats
//!
//! | Request | Content-Type | Body |
//! |---------|--------------|------|
//! | Update | `application/json; charset=utf-8` | `{"add": {...},"delete": {...}}` (duplicate keys allowed) |
//! | Query | `application/x-www-form-urlencoded; charset=utf-8` | `q=a&fq=b&fq=c` |
//!
//! Every handler carries `wt=json` as its first query parameter so Solr
//! replies in JSON.

pub mod encoder;

use serde_json::Value;

/// Protocol constants.
pub mod constants {
    /// Content type of update (JSON batch) requests.
    pub const CONTENT_JSON: &str = "application/json; charset=utf-8";

    /// Content type of query (form encoded) requests.
    pub const CONTENT_FORM: &str = "application/x-www-form-urlencoded; charset=utf-8";

    /// Default JSON update handler.
    pub const DEFAULT_UPDATE_HANDLER: &str = "/solr/update/json";

    /// Default select handler.
    pub const DEFAULT_QUERY_HANDLER: &str = "/solr/select";

    /// Response writer parameter name.
    pub const WRITER_PARAM: &str = "wt";

    /// Response writer requested on every handler.
    pub const WRITER_JSON: &str = "json";

    /// Prefix removed from handlers sent over the socket transport.
    pub const SOLR_PREFIX: &str = "/solr";
}

/// Problems found in a reply's `responseHeader`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeError {
    /// The reply has no `responseHeader` object.
    MissingHeader,
    /// The header has no numeric `status` field.
    MissingStatus,
    /// Solr reported a non-zero status.
    Status(i64),
}

/// Check the `responseHeader.status` of a parsed reply.
///
/// A status of exactly `0` is success.
pub fn check_envelope(reply: &Value) -> std::result::Result<(), EnvelopeError> {
    let header = reply
        .get("responseHeader")
        .filter(|h| h.is_object())
        .ok_or(EnvelopeError::MissingHeader)?;
    let status = header
        .get("status")
        .and_then(Value::as_i64)
        .ok_or(EnvelopeError::MissingStatus)?;
    if status == 0 {
        Ok(())
    } else {
        Err(EnvelopeError::Status(status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_success() {
        let reply = json!({"responseHeader": {"status": 0, "QTime": 3}});
        assert_eq!(check_envelope(&reply), Ok(()));
    }

    #[test]
    fn test_envelope_missing_header() {
        assert_eq!(
            check_envelope(&json!({"response": {}})),
            Err(EnvelopeError::MissingHeader)
        );
        assert_eq!(
            check_envelope(&json!({"responseHeader": 0})),
            Err(EnvelopeError::MissingHeader)
        );
    }

    #[test]
    fn test_envelope_missing_status() {
        let reply = json!({"responseHeader": {"QTime": 3}});
        assert_eq!(check_envelope(&reply), Err(EnvelopeError::MissingStatus));
    }

    #[test]
    fn test_envelope_error_status() {
        let reply = json!({"responseHeader": {"status": 400}});
        assert_eq!(check_envelope(&reply), Err(EnvelopeError::Status(400)));
    }
}
