//! JSON update batches.
//!
//! An [`UpdateCommand`] holds an ordered list of operations that Solr
//! applies in sequence. The body is written entry by entry, so the same
//! operation name may appear several times at the top level:
//!
//! ```text
//! {"add":{"doc":{"id":"a"}},"add":{"doc":{"id":"b"}},"delete":{"id":"c"},"commit":{}}
//! ```
//!
//! Duplicate names are valid JSON (RFC 4627, section 2.2) and are what the
//! JSON update handler expects, which is why no map type is involved.

use super::{Command, Handler};
use crate::error::{Result, SolrError};
use crate::protocol::constants::{CONTENT_JSON, DEFAULT_UPDATE_HANDLER};
use crate::protocol::encoder;
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Construction options of an [`UpdateCommand`].
///
/// # Examples
///
/// ```
/// use solr_client::command::{Command, UpdateCommand, UpdateConfig};
///
/// let update = UpdateCommand::with_config(UpdateConfig {
///     commit_within: Some(60000),
///     ..Default::default()
/// });
/// assert_eq!(
///     update.handler().to_string(),
///     "/solr/update/json?wt=json&commitWithin=60000"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateConfig {
    /// Handler on the remote host
    pub handler: String,
    /// Milliseconds within which the documents must be committed
    pub commit_within: Option<u64>,
    /// Commit once the batch is applied; takes precedence over `commit_within`
    pub commit: bool,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        UpdateConfig {
            handler: DEFAULT_UPDATE_HANDLER.to_string(),
            commit_within: None,
            commit: false,
        }
    }
}

/// One operation of an update batch.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateEntry {
    /// Add or replace a document.
    Add {
        /// Field name to value
        doc: Map<String, Value>,
        /// Document boost
        boost: Option<f64>,
        /// Overwrite a document with the same unique key
        overwrite: Option<bool>,
    },
    /// Delete by unique key.
    DeleteById(String),
    /// Delete every document matching a query.
    DeleteByQuery(String),
    /// Make pending changes visible.
    Commit,
    /// Compact the index.
    Optimize {
        /// Block until index changes are flushed to disk
        wait_flush: bool,
        /// Block until a new searcher is opened
        wait_searcher: bool,
    },
}

impl UpdateEntry {
    /// Top-level key of the entry in the batch body.
    pub fn op_name(&self) -> &'static str {
        match self {
            UpdateEntry::Add { .. } => "add",
            UpdateEntry::DeleteById(_) | UpdateEntry::DeleteByQuery(_) => "delete",
            UpdateEntry::Commit => "commit",
            UpdateEntry::Optimize { .. } => "optimize",
        }
    }

    /// Value written after the key.
    pub fn payload(&self) -> Value {
        match self {
            UpdateEntry::Add {
                doc,
                boost,
                overwrite,
            } => {
                let mut payload = Map::new();
                payload.insert("doc".to_string(), Value::Object(doc.clone()));
                if let Some(boost) = boost {
                    payload.insert("boost".to_string(), json!(boost));
                }
                if let Some(overwrite) = overwrite {
                    payload.insert("overwrite".to_string(), Value::Bool(*overwrite));
                }
                Value::Object(payload)
            }
            UpdateEntry::DeleteById(id) => json!({ "id": id }),
            UpdateEntry::DeleteByQuery(query) => json!({ "query": query }),
            UpdateEntry::Commit => json!({}),
            UpdateEntry::Optimize {
                wait_flush,
                wait_searcher,
            } => json!({ "waitFlush": wait_flush, "waitSearcher": wait_searcher }),
        }
    }
}

/// A single key or a sequence of keys, for the delete operations.
///
/// Scalars fan out to one entry, sequences to one entry per element.
pub trait IntoKeys {
    /// Stringified keys in order
    fn into_keys(self) -> Vec<String>;
}

macro_rules! scalar_keys {
    ($($t:ty),* $(,)?) => {
        $(
            impl IntoKeys for $t {
                fn into_keys(self) -> Vec<String> {
                    vec![self.to_string()]
                }
            }
        )*
    };
}

scalar_keys!(&str, String, &String, i32, i64, u32, u64, usize);

impl<T: ToString> IntoKeys for Vec<T> {
    fn into_keys(self) -> Vec<String> {
        self.iter().map(ToString::to_string).collect()
    }
}

impl<T: ToString> IntoKeys for &[T] {
    fn into_keys(self) -> Vec<String> {
        self.iter().map(ToString::to_string).collect()
    }
}

impl<T: ToString, const N: usize> IntoKeys for [T; N] {
    fn into_keys(self) -> Vec<String> {
        self.iter().map(ToString::to_string).collect()
    }
}

/// A batch of updates for the JSON update handler.
///
/// # Examples
///
/// ```
/// use solr_client::command::{Command, UpdateCommand};
/// use serde_json::json;
///
/// let mut update = UpdateCommand::new();
/// update.add_documents(&json!([{"a": 1}, {"b": 2}]), None, None).unwrap();
/// update.add_delete_by_id(["3", "4"]);
/// update.add_commit();
///
/// assert_eq!(update.len(), 5);
/// assert_eq!(
///     update.body().unwrap(),
///     r#"{"add":{"doc":{"a":1}},"add":{"doc":{"b":2}},"delete":{"id":"3"},"delete":{"id":"4"},"commit":{}}"#
/// );
/// ```
#[derive(Debug, Clone)]
pub struct UpdateCommand {
    handler: Handler,
    config: UpdateConfig,
    entries: Vec<UpdateEntry>,
}

impl UpdateCommand {
    /// Update command on `/solr/update/json` with no commit options.
    pub fn new() -> Self {
        Self::with_config(UpdateConfig::default())
    }

    /// Update command with explicit options.
    ///
    /// `commit=true` or `commitWithin=<ms>` is added to the query string here
    /// and never recomputed.
    pub fn with_config(config: UpdateConfig) -> Self {
        let mut handler = Handler::new(&config.handler);
        if config.commit {
            handler.push_param("commit", "true");
        } else if let Some(ms) = config.commit_within {
            handler.push_param("commitWithin", ms);
        }
        UpdateCommand {
            handler,
            config,
            entries: Vec::new(),
        }
    }

    /// Add one document or a sequence of documents.
    ///
    /// `data` may be any serializable value that encodes to a JSON object
    /// (a map, or a struct whose fields become the document fields), or to an
    /// array of such objects, each of which becomes its own `add` entry with
    /// the same `boost` and `overwrite`. Returns the number of entries added.
    ///
    /// Nothing is added when any element fails to encode or when `boost` is
    /// NaN or infinite.
    pub fn add_documents<D: Serialize + ?Sized>(
        &mut self,
        data: &D,
        boost: Option<f64>,
        overwrite: Option<bool>,
    ) -> Result<usize> {
        if let Some(boost) = boost.filter(|b| !b.is_finite()) {
            return Err(SolrError::build(
                format!("boost must be a finite number, got {}", boost),
                self.handler.to_string(),
            ));
        }
        let docs = match self.encode(data)? {
            Value::Object(doc) => vec![doc],
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Object(doc) => Ok(doc),
                    other => Err(self.not_a_document(&other)),
                })
                .collect::<Result<Vec<_>>>()?,
            other => return Err(self.not_a_document(&other)),
        };

        let added = docs.len();
        self.entries.extend(docs.into_iter().map(|doc| UpdateEntry::Add {
            doc,
            boost,
            overwrite,
        }));
        Ok(added)
    }

    /// Delete one id or a sequence of ids.
    pub fn add_delete_by_id(&mut self, ids: impl IntoKeys) {
        self.entries
            .extend(ids.into_keys().into_iter().map(UpdateEntry::DeleteById));
    }

    /// Delete by one query or a sequence of queries.
    pub fn add_delete_by_query(&mut self, queries: impl IntoKeys) {
        self.entries
            .extend(queries.into_keys().into_iter().map(UpdateEntry::DeleteByQuery));
    }

    /// Append a commit.
    pub fn add_commit(&mut self) {
        self.entries.push(UpdateEntry::Commit);
    }

    /// Append an optimize.
    ///
    /// Optimizing can take a long time; a timed out call does not stop the
    /// optimize on the server.
    pub fn add_optimize(&mut self, wait_flush: bool, wait_searcher: bool) {
        self.entries.push(UpdateEntry::Optimize {
            wait_flush,
            wait_searcher,
        });
    }

    /// Accumulated entries in insertion order
    pub fn entries(&self) -> &[UpdateEntry] {
        &self.entries
    }

    /// Number of accumulated entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries have been added
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Options the command was built with
    pub fn config(&self) -> &UpdateConfig {
        &self.config
    }

    fn encode<D: Serialize + ?Sized>(&self, data: &D) -> Result<Value> {
        encoder::to_value(data)
            .map_err(|e| SolrError::build(e.to_string(), self.handler.to_string()))
    }

    fn not_a_document(&self, value: &Value) -> SolrError {
        SolrError::build(
            format!(
                "a document must encode to a JSON object or an array of objects, got {}",
                json_type(value)
            ),
            self.handler.to_string(),
        )
    }
}

impl Default for UpdateCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl Command for UpdateCommand {
    fn handler(&self) -> &Handler {
        &self.handler
    }

    fn content_type(&self) -> &'static str {
        CONTENT_JSON
    }

    fn body(&self) -> Result<String> {
        let mut body = String::from("{");
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                body.push(',');
            }
            let payload = encoder::to_string(&entry.payload())
                .map_err(|e| SolrError::build(e.to_string(), self.handler.to_string()))?;
            body.push('"');
            body.push_str(entry.op_name());
            body.push_str("\":");
            body.push_str(&payload);
        }
        body.push('}');
        Ok(body)
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
