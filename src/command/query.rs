//! Form encoded requests against any handler.

use super::{encode_pairs, Command, Handler};
use crate::error::Result;
use crate::protocol::constants::{CONTENT_FORM, DEFAULT_QUERY_HANDLER};

/// Named parameters sent to a handler, e.g. `/solr/select`.
///
/// Any request can be issued this way by choosing the handler and adding
/// parameters. Names do not have to be unique, so repeated `fq` filters are
/// simply added several times.
#[derive(Debug, Clone)]
pub struct QueryCommand {
    handler: Handler,
    params: Vec<(String, String)>,
}

impl QueryCommand {
    /// Query against `/solr/select`.
    pub fn new() -> Self {
        Self::with_handler(DEFAULT_QUERY_HANDLER)
    }

    /// Query against `handler`.
    pub fn with_handler(handler: &str) -> Self {
        QueryCommand {
            handler: Handler::new(handler),
            params: Vec::new(),
        }
    }

    /// Add a named parameter; the value is stringified.
    pub fn add_param(&mut self, name: impl Into<String>, value: impl ToString) {
        self.params.push((name.into(), value.to_string()));
    }

    /// Add a parameter to the handler's query string instead of the body.
    ///
    /// Unlike [`Command::clear`], nothing removes these.
    pub fn add_handler_param(&mut self, name: impl Into<String>, value: impl ToString) {
        self.handler.push_param(name, value);
    }

    /// Parameters in insertion order
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }
}

impl Default for QueryCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl Command for QueryCommand {
    fn handler(&self) -> &Handler {
        &self.handler
    }

    fn content_type(&self) -> &'static str {
        CONTENT_FORM
    }

    fn body(&self) -> Result<String> {
        Ok(encode_pairs(&self.params))
    }

    fn clear(&mut self) {
        self.params.clear();
    }
}
