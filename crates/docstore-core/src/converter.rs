// SPDX-FileCopyrightText: 2026 Docstore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Converters bridging application types and backend records.

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::types::Record;

/// A pair of pure functions applied to every read and write of a reference.
///
/// Errors are reported as `serde_json::Error` so callers can attach the
/// document path they were converting.
pub trait Converter<T>: Send + Sync + 'static {
    fn to_record(&self, value: &T) -> Result<Record, serde_json::Error>;

    fn from_record(&self, record: Record) -> Result<T, serde_json::Error>;
}

/// The default converter: serde in both directions, no schema checks.
pub struct JsonConverter<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonConverter<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for JsonConverter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for JsonConverter<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> Copy for JsonConverter<T> {}

impl<T> fmt::Debug for JsonConverter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("JsonConverter")
    }
}

impl<T> Converter<T> for JsonConverter<T>
where
    T: Serialize + DeserializeOwned + 'static,
{
    fn to_record(&self, value: &T) -> Result<Record, serde_json::Error> {
        to_record(value)
    }

    fn from_record(&self, record: Record) -> Result<T, serde_json::Error> {
        serde_json::from_value(serde_json::Value::Object(record))
    }
}

/// Serializes any value into a record; non-object values are rejected.
pub fn to_record<V: Serialize + ?Sized>(value: &V) -> Result<Record, serde_json::Error> {
    match serde_json::to_value(value)? {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(serde::ser::Error::custom(format!(
            "documents must serialize to an object, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
