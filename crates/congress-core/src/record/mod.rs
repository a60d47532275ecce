//! Typed records for the three synchronized entity kinds.
//!
//! Every record is decoded from one TOML document into an explicit schema
//! struct. Keys outside the schema land in an `extra` extension map after
//! validation, and relationship-bearing fields are never persisted as node
//! properties.

pub mod committee;
pub mod person;
pub mod session;
pub mod value;

use serde::de::DeserializeOwned;
use serde::Serialize;

pub use committee::Committee;
pub use person::{Membership, Person};
pub use session::Session;
pub use value::{PropertyMap, PropertyValue};

/// Highest document `schema_version` this build understands.
pub const SCHEMA_VERSION: u32 = 1;

/// Graph labels managed by the sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum NodeLabel {
    Congress,
    Committee,
    Person,
}

impl NodeLabel {
    /// All managed labels, in dependency order.
    pub const ALL: [NodeLabel; 3] = [NodeLabel::Congress, NodeLabel::Committee, NodeLabel::Person];

    /// The graph label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Congress => "Congress",
            Self::Committee => "Committee",
            Self::Person => "Person",
        }
    }

    /// Name of the data subdirectory holding documents of this kind.
    pub fn directory(&self) -> &'static str {
        match self {
            Self::Congress => "congress",
            Self::Committee => "committee",
            Self::Person => "person",
        }
    }
}

impl std::fmt::Display for NodeLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record that is written to the graph as a node.
pub trait Entity: DeserializeOwned + Send + 'static {
    /// Label of the node this record becomes.
    const LABEL: NodeLabel;

    /// Stable primary identifier.
    fn id(&self) -> &str;

    /// The complete property set of the node.
    fn to_node(&self) -> NodeRecord;
}

/// Store-facing node shape: the primary key plus every persisted property.
///
/// `properties` always contains `id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeRecord {
    pub id: String,
    pub properties: PropertyMap,
}

impl NodeRecord {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let mut properties = PropertyMap::new();
        properties.insert("id".to_string(), PropertyValue::String(id.clone()));
        Self { id, properties }
    }

    /// Set a property.
    pub fn with(mut self, key: &str, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }

    /// Set a property only when a value is present.
    pub fn with_opt<V: Into<PropertyValue>>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.with(key, v),
            None => self,
        }
    }

    /// Copy extension properties onto the node. Schema fields win on conflict.
    pub fn with_extra(mut self, extra: &PropertyMap) -> Self {
        for (key, value) in extra {
            self.properties
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
        self
    }
}

/// Checks shared by every document kind; returns the validated extension map.
pub(crate) fn finish_document(
    id: &str,
    schema_version: Option<u32>,
    extra: toml::Table,
) -> Result<PropertyMap, String> {
    if id.trim().is_empty() {
        return Err("'id' must not be empty".to_string());
    }

    if let Some(version) = schema_version {
        if version > SCHEMA_VERSION {
            return Err(format!(
                "schema_version {} is newer than supported version {}",
                version, SCHEMA_VERSION
            ));
        }
    }

    extra
        .into_iter()
        .map(|(key, value)| PropertyValue::from_toml(&key, value).map(|v| (key, v)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_record_carries_id() {
        let node = NodeRecord::new("s1").with("name", "19th");
        assert_eq!(node.properties["id"], PropertyValue::from("s1"));
        assert_eq!(node.properties.len(), 2);
    }

    #[test]
    fn test_extra_does_not_override_schema_fields() {
        let mut extra = PropertyMap::new();
        extra.insert("name".into(), PropertyValue::from("shadow"));
        extra.insert("year_start".into(), PropertyValue::from(2022));
        let node = NodeRecord::new("s1").with("name", "19th").with_extra(&extra);
        assert_eq!(node.properties["name"], PropertyValue::from("19th"));
        assert_eq!(node.properties["year_start"], PropertyValue::Integer(2022));
    }

    #[test]
    fn test_finish_document_rejects_future_schema() {
        let err = finish_document("s1", Some(SCHEMA_VERSION + 1), toml::Table::new()).unwrap_err();
        assert!(err.contains("schema_version"));
    }

    #[test]
    fn test_finish_document_rejects_blank_id() {
        assert!(finish_document("  ", None, toml::Table::new()).is_err());
    }
}
