//! Commands: batches of operations bound to a Solr handler.
//!
//! A command accumulates operations and exposes, deterministically from
//! that state, the handler path with its query string, the request body and
//! the content type. Executors only ever talk to commands through the
//! [`Command`] trait.
//!
//! | Type | Content-Type | Default handler |
//! |------|--------------|-----------------|
//! | [`UpdateCommand`] | `application/json; charset=utf-8` | `/solr/update/json` |
//! | [`QueryCommand`] | `application/x-www-form-urlencoded; charset=utf-8` | `/solr/select` |
//!
//! # Examples
//!
//! ```
//! use solr_client::command::{Command, QueryCommand};
//!
//! let mut query = QueryCommand::with_handler("/solr/test/search/");
//! query.add_param("q", "test query");
//! query.add_param("sort", "name asc");
//!
//! assert_eq!(query.handler().to_string(), "/solr/test/search?wt=json");
//! assert_eq!(query.body().unwrap(), "q=test+query&sort=name+asc");
//! ```

mod query;
mod update;

pub use query::QueryCommand;
pub use update::{IntoKeys, UpdateCommand, UpdateConfig, UpdateEntry};

use crate::error::Result;
use crate::protocol::constants::{SOLR_PREFIX, WRITER_JSON, WRITER_PARAM};
use std::fmt;
use url::form_urlencoded;

/// A request that can be handed to an executor.
///
/// Only concrete commands define a wire format, so there is no default
/// body: every implementor must provide [`Command::body`].
pub trait Command {
    /// Handler path and query string, appended to the executor's address.
    fn handler(&self) -> &Handler;

    /// Value of the `content-type` header.
    fn content_type(&self) -> &'static str;

    /// Serialize the current operations. Computed on every call.
    fn body(&self) -> Result<String>;

    /// Drop all accumulated operations, keeping handler and content type.
    fn clear(&mut self);
}

/// A handler path with its query parameters.
///
/// The path is normalized to a single leading slash and no trailing slash,
/// and `wt=json` is always the first parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handler {
    path: String,
    params: Vec<(String, String)>,
}

impl Handler {
    /// Create a handler for `path`, e.g. `solr/select/` becomes `/solr/select`.
    pub fn new(path: &str) -> Self {
        Handler {
            path: format!("/{}", path.trim_matches('/')),
            params: vec![(WRITER_PARAM.to_string(), WRITER_JSON.to_string())],
        }
    }

    /// Append a query parameter. Names may repeat.
    pub fn push_param(&mut self, name: impl Into<String>, value: impl ToString) {
        self.params.push((name.into(), value.to_string()));
    }

    /// The normalized path without query string
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Query parameters in insertion order
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Encoded query string, without the leading `?`.
    pub fn query_string(&self) -> String {
        encode_pairs(&self.params)
    }

    /// Handler form used on the socket transport: a leading `/solr` is removed.
    pub fn socket_form(&self) -> String {
        let path = match self.path.strip_prefix(SOLR_PREFIX) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
            _ => self.path.as_str(),
        };
        format!("{}?{}", path, self.query_string())
    }
}

impl fmt::Display for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}?{}", self.path, self.query_string())
    }
}

/// `application/x-www-form-urlencoded` join of `pairs`, preserving order.
pub(crate) fn encode_pairs(pairs: &[(String, String)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs.iter())
        .finish()
}
