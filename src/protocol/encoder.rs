//! JSON value encoding for update batches.
//!
//! Standard `serde_json` encoding with one domain rule: timestamps are
//! written as second-precision UTC strings, `YYYY-MM-DDTHH:MM:SSZ`, the
//! format Solr's date fields accept.
//!
//! # Examples
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use serde::Serialize;
//! use solr_client::protocol::encoder::{self, Timestamp};
//!
//! #[derive(Serialize)]
//! struct Doc {
//!     id: &'static str,
//!     #[serde(serialize_with = "encoder::timestamp::serialize")]
//!     indexed_at: chrono::DateTime<Utc>,
//!     published: Timestamp,
//! }
//!
//! let when = Utc.with_ymd_and_hms(1970, 2, 3, 11, 20, 42).unwrap();
//! let doc = Doc { id: "a", indexed_at: when, published: when.into() };
//! let encoded = encoder::to_string(&doc).unwrap();
//! assert_eq!(
//!     encoded,
//!     r#"{"id":"a","indexed_at":"1970-02-03T11:20:42Z","published":"1970-02-03T11:20:42Z"}"#
//! );
//! ```

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::ser::{Error as _, SerializeStruct};
use serde::{Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

/// `strftime` pattern of encoded timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// A value could not be encoded as JSON.
#[derive(Debug, Error)]
#[error("unable to encode value as JSON: {0}")]
pub struct EncodingError(#[from] serde_json::Error);

/// Anything that can be read as a UTC instant.
///
/// Naive date-times are assumed to already be in UTC.
pub trait UtcInstant {
    /// The instant in UTC
    fn to_utc(&self) -> DateTime<Utc>;
}

impl UtcInstant for DateTime<Utc> {
    fn to_utc(&self) -> DateTime<Utc> {
        *self
    }
}

impl UtcInstant for NaiveDateTime {
    fn to_utc(&self) -> DateTime<Utc> {
        self.and_utc()
    }
}

impl UtcInstant for Timestamp {
    fn to_utc(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Format an instant the way Solr expects it.
pub fn format_timestamp<T: UtcInstant + ?Sized>(value: &T) -> String {
    value.to_utc().format(TIMESTAMP_FORMAT).to_string()
}

/// A UTC timestamp that serializes as `YYYY-MM-DDTHH:MM:SSZ`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub DateTime<Utc>);

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Timestamp(value)
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(value: NaiveDateTime) -> Self {
        Timestamp(value.and_utc())
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&format_timestamp(self))
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// `serialize_with` helpers for chrono fields.
pub mod timestamp {
    use super::{format_timestamp, UtcInstant};
    use serde::Serializer;

    /// Serialize a `DateTime<Utc>` or `NaiveDateTime` field.
    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: UtcInstant,
        S: Serializer,
    {
        serializer.serialize_str(&format_timestamp(value))
    }

    /// Serialize an optional timestamp field, `None` becomes `null`.
    pub fn serialize_option<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: UtcInstant,
        S: Serializer,
    {
        match value {
            Some(v) => serializer.serialize_str(&format_timestamp(v)),
            None => serializer.serialize_none(),
        }
    }
}

/// A field value with an index-time boost.
///
/// Encodes as `{"value": <value>, "boost": <boost>}`. A boost that is NaN or
/// infinite has no JSON form and fails to encode.
#[derive(Debug, Clone, PartialEq)]
pub struct BoostedField<T> {
    /// Field value
    pub value: T,
    /// Boost applied to the field
    pub boost: f64,
}

impl<T> BoostedField<T> {
    /// Wrap `value` with `boost`
    pub fn new(value: T, boost: f64) -> Self {
        BoostedField { value, boost }
    }
}

impl<T: Serialize> Serialize for BoostedField<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if !self.boost.is_finite() {
            return Err(S::Error::custom(format!(
                "boost must be a finite number, got {}",
                self.boost
            )));
        }
        let mut field = serializer.serialize_struct("BoostedField", 2)?;
        field.serialize_field("value", &self.value)?;
        field.serialize_field("boost", &self.boost)?;
        field.end()
    }
}

/// Encode `value` into a JSON value tree.
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value, EncodingError> {
    Ok(serde_json::to_value(value)?)
}

/// Encode `value` as compact JSON text.
pub fn to_string<T: Serialize + ?Sized>(value: &T) -> Result<String, EncodingError> {
    Ok(serde_json::to_string(value)?)
}
