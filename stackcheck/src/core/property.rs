//! Untyped resource output properties.
//!
//! Resource outputs are produced by third-party APIs and have no fixed schema.
//! [`PropertyValue`] models them as a closed recursive sum type so every
//! traversal can match on the node kind instead of probing dynamic values.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// String-keyed mapping node. Key order carries no meaning.
pub type Mapping = BTreeMap<String, PropertyValue>;

/// Scalar leaf of a property tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

/// Recursive property tree: scalar, ordered sequence or mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum PropertyValue {
    Scalar(Scalar),
    Sequence(Vec<PropertyValue>),
    Mapping(Mapping),
}

/// Shape of a node, used when reporting mismatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Null,
    Bool,
    Number,
    String,
    Sequence,
    Mapping,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Null => "null",
            NodeKind::Bool => "bool",
            NodeKind::Number => "number",
            NodeKind::String => "string",
            NodeKind::Sequence => "sequence",
            NodeKind::Mapping => "mapping",
        };
        f.write_str(name)
    }
}

impl PropertyValue {
    pub fn null() -> Self {
        PropertyValue::Scalar(Scalar::Null)
    }

    pub fn empty_mapping() -> Self {
        PropertyValue::Mapping(Mapping::new())
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            PropertyValue::Scalar(Scalar::Null) => NodeKind::Null,
            PropertyValue::Scalar(Scalar::Bool(_)) => NodeKind::Bool,
            PropertyValue::Scalar(Scalar::Number(_)) => NodeKind::Number,
            PropertyValue::Scalar(Scalar::String(_)) => NodeKind::String,
            PropertyValue::Sequence(_) => NodeKind::Sequence,
            PropertyValue::Mapping(_) => NodeKind::Mapping,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Scalar(Scalar::Null))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Scalar(Scalar::String(value)) => Some(value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Scalar(Scalar::Bool(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PropertyValue::Scalar(Scalar::Number(value)) => value.as_i64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Scalar(Scalar::Number(value)) => value.as_f64(),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[PropertyValue]> {
        match self {
            PropertyValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            PropertyValue::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a direct child of a mapping node.
    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.as_mapping().and_then(|map| map.get(key))
    }

    /// Render as a `serde_json::Value` without consuming the tree.
    pub fn to_json(&self) -> Value {
        match self {
            PropertyValue::Scalar(Scalar::Null) => Value::Null,
            PropertyValue::Scalar(Scalar::Bool(value)) => Value::Bool(*value),
            PropertyValue::Scalar(Scalar::Number(value)) => Value::Number(value.clone()),
            PropertyValue::Scalar(Scalar::String(value)) => Value::String(value.clone()),
            PropertyValue::Sequence(items) => {
                Value::Array(items.iter().map(PropertyValue::to_json).collect())
            }
            PropertyValue::Mapping(map) => Value::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl From<Value> for PropertyValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => PropertyValue::Scalar(Scalar::Null),
            Value::Bool(value) => PropertyValue::Scalar(Scalar::Bool(value)),
            Value::Number(value) => PropertyValue::Scalar(Scalar::Number(value)),
            Value::String(value) => PropertyValue::Scalar(Scalar::String(value)),
            Value::Array(items) => {
                PropertyValue::Sequence(items.into_iter().map(PropertyValue::from).collect())
            }
            Value::Object(map) => PropertyValue::Mapping(
                map.into_iter()
                    .map(|(key, value)| (key, PropertyValue::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<PropertyValue> for Value {
    fn from(value: PropertyValue) -> Self {
        match value {
            PropertyValue::Scalar(Scalar::Null) => Value::Null,
            PropertyValue::Scalar(Scalar::Bool(value)) => Value::Bool(value),
            PropertyValue::Scalar(Scalar::Number(value)) => Value::Number(value),
            PropertyValue::Scalar(Scalar::String(value)) => Value::String(value),
            PropertyValue::Sequence(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            PropertyValue::Mapping(map) => Value::Object(
                map.into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Scalar(Scalar::String(value.to_string()))
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Scalar(Scalar::String(value))
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Scalar(Scalar::Bool(value))
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Scalar(Scalar::Number(Number::from(value)))
    }
}
