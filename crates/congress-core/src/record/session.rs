//! Legislative session records (graph label `Congress`).

use serde::Deserialize;

use super::{finish_document, Entity, NodeLabel, NodeRecord, PropertyMap};

/// A legislative session.
///
/// `session_number` is the natural key other records use to reference the
/// session. It is stored as a property but never used as a join key.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "SessionDocument")]
pub struct Session {
    pub id: String,
    pub session_number: i64,
    pub name: Option<String>,
    pub extra: PropertyMap,
}

#[derive(Deserialize)]
struct SessionDocument {
    id: String,
    #[serde(alias = "congress_number")]
    session_number: i64,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    schema_version: Option<u32>,
    #[serde(flatten)]
    extra: toml::Table,
}

impl TryFrom<SessionDocument> for Session {
    type Error = String;

    fn try_from(doc: SessionDocument) -> Result<Self, Self::Error> {
        let extra = finish_document(&doc.id, doc.schema_version, doc.extra)?;
        Ok(Self {
            id: doc.id,
            session_number: doc.session_number,
            name: doc.name,
            extra,
        })
    }
}

impl Entity for Session {
    const LABEL: NodeLabel = NodeLabel::Congress;

    fn id(&self) -> &str {
        &self.id
    }

    fn to_node(&self) -> NodeRecord {
        NodeRecord::new(&self.id)
            .with("session_number", self.session_number)
            .with_opt("name", self.name.clone())
            .with_extra(&self.extra)
    }
}
