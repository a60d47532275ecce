//! Scalar and list property values that can be stored on graph nodes.

use serde::Serialize;
use std::collections::BTreeMap;

/// Properties of a single node or edge, keyed by property name.
pub type PropertyMap = BTreeMap<String, PropertyValue>;

/// A value the graph store accepts as a property.
///
/// Lists are homogeneous and never nested; maps are not representable.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<PropertyValue>),
}

impl PropertyValue {
    /// Convert a decoded TOML value into a property value.
    ///
    /// Datetimes become their RFC 3339 text. Tables, nested arrays and
    /// mixed-type arrays are rejected.
    pub fn from_toml(key: &str, value: toml::Value) -> Result<Self, String> {
        match value {
            toml::Value::Array(items) => {
                let values = items
                    .into_iter()
                    .map(|item| Self::scalar_from_toml(key, item))
                    .collect::<Result<Vec<_>, _>>()?;

                if let Some(first) = values.first() {
                    let kind = first.kind();
                    if let Some(other) = values.iter().find(|v| v.kind() != kind) {
                        return Err(format!(
                            "field '{}' mixes {} and {} values",
                            key,
                            kind,
                            other.kind()
                        ));
                    }
                }
                Ok(Self::List(values))
            }
            other => Self::scalar_from_toml(key, other),
        }
    }

    fn scalar_from_toml(key: &str, value: toml::Value) -> Result<Self, String> {
        match value {
            toml::Value::String(s) => Ok(Self::String(s)),
            toml::Value::Integer(i) => Ok(Self::Integer(i)),
            toml::Value::Float(f) => Ok(Self::Float(f)),
            toml::Value::Boolean(b) => Ok(Self::Bool(b)),
            toml::Value::Datetime(dt) => Ok(Self::String(dt.to_string())),
            toml::Value::Array(_) => Err(format!("field '{}' contains a nested array", key)),
            toml::Value::Table(_) => Err(format!(
                "field '{}' is a table and cannot be stored as a property",
                key
            )),
        }
    }

    /// Short type name used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::List(_) => "list",
        }
    }

    /// The string content, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Vec<String>> for PropertyValue {
    fn from(values: Vec<String>) -> Self {
        Self::List(values.into_iter().map(Self::String).collect())
    }
}
