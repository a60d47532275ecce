//! Committee records.

use serde::Deserialize;

use super::{finish_document, Entity, NodeLabel, NodeRecord, PropertyMap};

/// A committee and the sessions it belongs to.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "CommitteeDocument")]
pub struct Committee {
    pub id: String,
    pub name: String,
    pub senate_website_keys: Option<Vec<String>>,
    /// Natural-key references to sessions. Consumed only to build edges.
    pub session_numbers: Vec<i64>,
    pub extra: PropertyMap,
}

#[derive(Deserialize)]
struct CommitteeDocument {
    id: String,
    name: String,
    #[serde(default)]
    senate_website_keys: Option<Vec<String>>,
    #[serde(default, alias = "congresses")]
    session_numbers: Vec<i64>,
    #[serde(default)]
    schema_version: Option<u32>,
    #[serde(flatten)]
    extra: toml::Table,
}

impl TryFrom<CommitteeDocument> for Committee {
    type Error = String;

    fn try_from(doc: CommitteeDocument) -> Result<Self, Self::Error> {
        let extra = finish_document(&doc.id, doc.schema_version, doc.extra)?;
        Ok(Self {
            id: doc.id,
            name: doc.name,
            senate_website_keys: doc.senate_website_keys,
            session_numbers: doc.session_numbers,
            extra,
        })
    }
}

impl Entity for Committee {
    const LABEL: NodeLabel = NodeLabel::Committee;

    fn id(&self) -> &str {
        &self.id
    }

    fn to_node(&self) -> NodeRecord {
        NodeRecord::new(&self.id)
            .with("name", self.name.as_str())
            .with_opt("senate_website_keys", self.senate_website_keys.clone())
            .with_extra(&self.extra)
    }
}
