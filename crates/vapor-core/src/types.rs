//! Parameter documents and their value union

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::{Error, Result};

/// Discriminant of a stored leaf value.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    String,
    Number,
    Boolean,
    Array,
    Null,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Number => write!(f, "number"),
            Self::Boolean => write!(f, "boolean"),
            Self::Array => write!(f, "array"),
            Self::Null => write!(f, "null"),
        }
    }
}

/// A single concrete value held by one leaf document.
///
/// Mappings are never leaf values: a mapping is stored as one leaf per
/// key below its own path.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "valueType", content = "value", rename_all = "lowercase")]
pub enum ParamValue {
    String(String),
    Number(serde_json::Number),
    Boolean(bool),
    Array(Vec<Value>),
    Null,
}

impl ParamValue {
    /// Classify a JSON value destined for the leaf at `path`.
    pub fn classify(path: &str, value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Self::Null),
            Value::Bool(b) => Ok(Self::Boolean(*b)),
            Value::Number(n) => Ok(Self::Number(n.clone())),
            Value::String(s) => Ok(Self::String(s.clone())),
            Value::Array(items) => Ok(Self::Array(items.clone())),
            Value::Object(_) => Err(Error::invalid_value_type(path, json_kind(value))),
        }
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            Self::String(_) => ValueType::String,
            Self::Number(_) => ValueType::Number,
            Self::Boolean(_) => ValueType::Boolean,
            Self::Array(_) => ValueType::Array,
            Self::Null => ValueType::Null,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::String(s) => Value::String(s.clone()),
            Self::Number(n) => Value::Number(n.clone()),
            Self::Boolean(b) => Value::Bool(*b),
            Self::Array(items) => Value::Array(items.clone()),
            Self::Null => Value::Null,
        }
    }
}

/// Short name of a JSON value's shape, for diagnostics.
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Leaf document: one value at one canonical key path.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Param {
    pub key_path: String,
    #[serde(flatten)]
    pub value: ParamValue,
    pub creator_path: String,
    pub creator_ipv4: String,
    pub created: DateTime<Utc>,
}

impl Param {
    pub fn new(
        key_path: impl Into<String>,
        value: ParamValue,
        creator_path: impl Into<String>,
        creator_ipv4: impl Into<String>,
    ) -> Self {
        Self {
            key_path: key_path.into(),
            value,
            creator_path: creator_path.into(),
            creator_ipv4: creator_ipv4.into(),
            created: Utc::now(),
        }
    }

    /// Override the creation time (imports, replays).
    pub fn created_at(mut self, created: DateTime<Utc>) -> Self {
        self.created = created;
        self
    }

    pub fn value_type(&self) -> ValueType {
        self.value.value_type()
    }
}

/// Exact-path subscription of a remote node to a parameter.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ParamSub {
    pub key_path: String,
    pub subscriber_path: String,
    pub subscriber_uri: String,
    pub subscriber_ipv4: String,
}

/// One outbound notification: `value` was written at `key_path`, and the
/// node at `subscriber_path` asked to hear about it at `subscriber_uri`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParamUpdate {
    pub subscriber_uri: String,
    pub subscriber_path: String,
    pub key_path: String,
    pub value: Value,
}
