//! Graph mutation protocol.
//!
//! Relationships managed by the sync:
//! - (:Committee)-[:BELONGS_TO]->(:Congress)
//! - (:Person)-[:SERVED_IN {position, type}]->(:Congress)

use async_trait::async_trait;
use serde::Serialize;

use congress_core::{NodeLabel, NodeRecord, PropertyMap, PropertyValue};

use crate::error::GraphResult;

/// Relationship types managed by the sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum EdgeType {
    BelongsTo,
    ServedIn,
}

impl EdgeType {
    pub const ALL: [EdgeType; 2] = [EdgeType::BelongsTo, EdgeType::ServedIn];

    /// The relationship type name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BelongsTo => "BELONGS_TO",
            Self::ServedIn => "SERVED_IN",
        }
    }

    /// Labels of the (source, target) nodes.
    pub fn endpoints(&self) -> (NodeLabel, NodeLabel) {
        match self {
            Self::BelongsTo => (NodeLabel::Committee, NodeLabel::Congress),
            Self::ServedIn => (NodeLabel::Person, NodeLabel::Congress),
        }
    }
}

impl std::fmt::Display for EdgeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A relationship to find-or-create between two nodes identified by `id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum EdgeDescriptor {
    BelongsTo {
        committee_id: String,
        session_id: String,
    },
    ServedIn {
        person_id: String,
        session_id: String,
        position: String,
        kind: String,
    },
}

impl EdgeDescriptor {
    pub fn edge_type(&self) -> EdgeType {
        match self {
            Self::BelongsTo { .. } => EdgeType::BelongsTo,
            Self::ServedIn { .. } => EdgeType::ServedIn,
        }
    }

    pub fn from_id(&self) -> &str {
        match self {
            Self::BelongsTo { committee_id, .. } => committee_id,
            Self::ServedIn { person_id, .. } => person_id,
        }
    }

    pub fn to_id(&self) -> &str {
        match self {
            Self::BelongsTo { session_id, .. } | Self::ServedIn { session_id, .. } => session_id,
        }
    }

    /// Edge properties. These replace whatever the edge carried before.
    pub fn properties(&self) -> PropertyMap {
        let mut props = PropertyMap::new();
        if let Self::ServedIn { position, kind, .. } = self {
            props.insert("position".to_string(), PropertyValue::from(position.as_str()));
            props.insert("type".to_string(), PropertyValue::from(kind.as_str()));
        }
        props
    }
}

/// Operations the sync needs from a graph store.
///
/// Each `upsert_*` call is applied atomically: on error nothing from the
/// batch is visible.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Verify the store is reachable.
    async fn ping(&self) -> GraphResult<()>;

    /// Create a lookup index on `label.property` unless one exists.
    async fn ensure_index(&self, label: NodeLabel, property: &str) -> GraphResult<()>;

    /// Find-or-create each node by `id` and replace its properties.
    async fn upsert_nodes(&self, label: NodeLabel, nodes: &[NodeRecord]) -> GraphResult<()>;

    /// Find-or-create each edge between existing endpoints and replace its
    /// properties. Descriptors whose endpoints are missing are ignored.
    async fn upsert_edges(&self, edge_type: EdgeType, edges: &[EdgeDescriptor]) -> GraphResult<()>;

    async fn count_nodes(&self, label: NodeLabel) -> GraphResult<usize>;

    async fn count_edges(&self, edge_type: EdgeType) -> GraphResult<usize>;

    /// Count edges of a type whose string property equals `value`.
    async fn count_edges_with(
        &self,
        edge_type: EdgeType,
        property: &str,
        value: &str,
    ) -> GraphResult<usize>;

    /// Count nodes carrying any of `labels`.
    async fn count_nodes_with_labels(&self, labels: &[NodeLabel]) -> GraphResult<usize>;

    /// Delete nodes carrying any of `labels` together with their edges.
    /// Returns the number of nodes deleted.
    async fn delete_nodes_by_labels(&self, labels: &[NodeLabel]) -> GraphResult<usize>;
}
