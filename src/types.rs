//! Response types shared by all executors.

use serde_json::Value;

pub use http::Method;

/// A successfully parsed Solr reply.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// Correlation name of the executor that produced the reply, if any
    pub name: Option<String>,
    /// Parsed JSON body
    pub body: Value,
}

impl Response {
    /// Create a response
    pub fn new(name: Option<String>, body: Value) -> Self {
        Response { name, body }
    }

    /// Consume the response, keeping only the body
    pub fn into_body(self) -> Value {
        self.body
    }

    /// `responseHeader.status`, when present
    pub fn status(&self) -> Option<i64> {
        self.body
            .get("responseHeader")
            .and_then(|h| h.get("status"))
            .and_then(Value::as_i64)
    }

    /// `response.numFound` of a select reply, when present
    pub fn num_found(&self) -> Option<u64> {
        self.body
            .get("response")
            .and_then(|r| r.get("numFound"))
            .and_then(Value::as_u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_response_accessors() {
        let response = Response::new(
            None,
            json!({"responseHeader": {"status": 0}, "response": {"numFound": 12, "docs": []}}),
        );
        assert_eq!(response.status(), Some(0));
        assert_eq!(response.num_found(), Some(12));
    }
}
