//! Tagged tree model for reported state and reported metadata.
//!
//! Shadow documents are arbitrary nested JSON. [`ShadowValue`] makes the three
//! shapes the normalizer cares about explicit: scalars, arrays (opaque, never
//! descended into) and objects. Conversion to and from [`serde_json::Value`]
//! is lossless, and (de)serialization goes through it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// Mapping level of a shadow tree.
pub type ShadowMap = BTreeMap<String, ShadowValue>;

/// Leaf value of a shadow tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

/// One node of a shadow tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum ShadowValue {
    Scalar(Scalar),
    /// Arrays are carried verbatim; their elements are never interpreted.
    Array(Vec<Value>),
    Object(ShadowMap),
}

impl ShadowValue {
    #[must_use]
    pub const fn as_object(&self) -> Option<&ShadowMap> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_object(self) -> Option<ShadowMap> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Scalar(Scalar::Number(n)) => n.as_i64(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Scalar(Scalar::Number(n)) => n.as_u64(),
            _ => None,
        }
    }
}

/// Convert a JSON object into a [`ShadowMap`]. Returns `None` for non-objects.
#[must_use]
pub fn map_from_json(value: Value) -> Option<ShadowMap> {
    ShadowValue::from(value).into_object()
}

impl From<Value> for ShadowValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Scalar(Scalar::Null),
            Value::Bool(b) => Self::Scalar(Scalar::Bool(b)),
            Value::Number(n) => Self::Scalar(Scalar::Number(n)),
            Value::String(s) => Self::Scalar(Scalar::String(s)),
            Value::Array(items) => Self::Array(items),
            Value::Object(map) => {
                Self::Object(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<ShadowValue> for Value {
    fn from(value: ShadowValue) -> Self {
        match value {
            ShadowValue::Scalar(Scalar::Null) => Self::Null,
            ShadowValue::Scalar(Scalar::Bool(b)) => Self::Bool(b),
            ShadowValue::Scalar(Scalar::Number(n)) => Self::Number(n),
            ShadowValue::Scalar(Scalar::String(s)) => Self::String(s),
            ShadowValue::Array(items) => Self::Array(items),
            ShadowValue::Object(map) => Self::Object(
                map.into_iter()
                    .map(|(k, v)| (k, Self::from(v)))
                    .collect::<serde_json::Map<_, _>>(),
            ),
        }
    }
}

impl From<ShadowMap> for ShadowValue {
    fn from(map: ShadowMap) -> Self {
        Self::Object(map)
    }
}

impl From<i64> for ShadowValue {
    fn from(n: i64) -> Self {
        Self::Scalar(Scalar::Number(n.into()))
    }
}

impl From<u64> for ShadowValue {
    fn from(n: u64) -> Self {
        Self::Scalar(Scalar::Number(n.into()))
    }
}

impl From<&str> for ShadowValue {
    fn from(s: &str) -> Self {
        Self::Scalar(Scalar::String(s.to_string()))
    }
}
