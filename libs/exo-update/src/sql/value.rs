// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::fmt::{Debug, Display};

use bytes::Bytes;
use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexMap;
use uuid::Uuid;

/// A loosely typed object such as a row, an entity, or a map of primary key values. Keys are
/// property names (or column names in raw-table mode) and insertion order is preserved.
pub type ObjectLiteral = IndexMap<String, Value>;

/// A domain object targeted by an update (see `UpdateQueryBuilder::where_entity`).
pub type Entity = ObjectLiteral;

/// Named parameters bound to a statement.
pub type Parameters = IndexMap<String, Value>;

/// A value that can be bound to a statement or returned from one.
///
/// Leaf values (dates, bytes, uuids, json) are never treated as structured objects, so
/// referenced-column dereferencing only applies to [`Value::Object`].
#[derive(Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Bytes),
    Timestamp(DateTime<Utc>),
    Date(NaiveDate),
    Uuid(Uuid),
    Json(serde_json::Value),
    Object(ObjectLiteral),
    Array(Vec<Value>),
    /// A value tagged with the native type the driver should bind it as (see
    /// `Dialect::parametrize`)
    Typed {
        native_type: String,
        value: Box<Value>,
    },
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_object(&self) -> Option<&ObjectLiteral> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Walk a dotted path through nested objects. An empty path returns the value itself.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        if path.is_empty() {
            return Some(self);
        }
        path.split('.')
            .try_fold(self, |current, segment| current.as_object()?.get(segment))
    }

    /// Strip any dialect type tag.
    pub fn untyped(&self) -> &Value {
        match self {
            Value::Typed { value, .. } => value.untyped(),
            value => value,
        }
    }

    /// Convert to JSON (used when a structured value must be serialized for a text or json
    /// column).
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;

        match self {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(i) => Json::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Value::Text(s) => Json::String(s.clone()),
            Value::Bytes(b) => Json::Array(b.iter().map(|byte| Json::from(*byte)).collect()),
            Value::Timestamp(ts) => Json::String(ts.to_rfc3339()),
            Value::Date(date) => Json::String(date.to_string()),
            Value::Uuid(uuid) => Json::String(uuid.to_string()),
            Value::Json(json) => json.clone(),
            Value::Object(object) => Json::Object(
                object
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
            Value::Array(values) => Json::Array(values.iter().map(Value::to_json).collect()),
            Value::Typed { value, .. } => value.to_json(),
        }
    }
}

/// Set (or create) the value at a dotted path, creating intermediate objects as needed.
pub(crate) fn set_path(object: &mut ObjectLiteral, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            object.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let entry = object
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(ObjectLiteral::new()));
            if !matches!(entry, Value::Object(_)) {
                *entry = Value::Object(ObjectLiteral::new());
            }
            if let Value::Object(nested) = entry {
                set_path(nested, rest, value);
            }
        }
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(s) => write!(f, "{s:?}"),
            Value::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Value::Timestamp(ts) => write!(f, "{}", ts.to_rfc3339()),
            Value::Date(date) => write!(f, "{date}"),
            Value::Uuid(uuid) => write!(f, "{uuid}"),
            Value::Json(json) => write!(f, "{json}"),
            Value::Object(object) => f.debug_map().entries(object.iter()).finish(),
            Value::Array(values) => f.debug_list().entries(values.iter()).finish(),
            Value::Typed { native_type, value } => write!(f, "{value:?}::{native_type}"),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            other => Debug::fmt(other, f),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Bytes> for Value {
    fn from(b: Bytes) -> Self {
        Value::Bytes(b)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(ts: DateTime<Utc>) -> Self {
        Value::Timestamp(ts)
    }
}

impl From<NaiveDate> for Value {
    fn from(date: NaiveDate) -> Self {
        Value::Date(date)
    }
}

impl From<Uuid> for Value {
    fn from(uuid: Uuid) -> Self {
        Value::Uuid(uuid)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        Value::Json(json)
    }
}

impl From<ObjectLiteral> for Value {
    fn from(object: ObjectLiteral) -> Self {
        Value::Object(object)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::Array(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Build an [`ObjectLiteral`] from `key => value` pairs.
#[macro_export]
macro_rules! object {
    () => { $crate::ObjectLiteral::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut object = $crate::ObjectLiteral::new();
        $(object.insert($key.to_string(), $crate::Value::from($value));)+
        object
    }};
}
