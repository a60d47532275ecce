//! In-process graph store with the same merge semantics as the Neo4j client.
//!
//! Backs `--dry-run` and makes the sync pipeline testable without a server.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use tokio::sync::Mutex;

use congress_core::{NodeLabel, NodeRecord, PropertyMap};

use crate::error::{GraphError, GraphResult};
use crate::store::{EdgeDescriptor, EdgeType, GraphStore};

type NodeKey = (NodeLabel, String);
type EdgeKey = (EdgeType, String, String);

/// Point-in-time copy of the whole graph, for comparisons.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphSnapshot {
    pub nodes: BTreeMap<NodeKey, PropertyMap>,
    pub edges: BTreeMap<EdgeKey, PropertyMap>,
}

#[derive(Debug, Default)]
struct State {
    graph: GraphSnapshot,
    indexes: BTreeSet<(NodeLabel, String)>,
    failing_ids: BTreeSet<String>,
    reject_indexes: bool,
    offline: bool,
    batches_applied: usize,
}

/// Graph store held in memory.
#[derive(Debug, Default)]
pub struct MemoryGraph {
    state: Mutex<State>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every batch that mentions `id` fail as a whole.
    pub async fn fail_batches_with(&self, id: impl Into<String>) {
        self.state.lock().await.failing_ids.insert(id.into());
    }

    /// Make every index creation fail.
    pub async fn reject_indexes(&self) {
        self.state.lock().await.reject_indexes = true;
    }

    /// Make every call fail as if the server went away.
    pub async fn go_offline(&self) {
        self.state.lock().await.offline = true;
    }

    pub async fn snapshot(&self) -> GraphSnapshot {
        self.state.lock().await.graph.clone()
    }

    pub async fn node(&self, label: NodeLabel, id: &str) -> Option<PropertyMap> {
        let state = self.state.lock().await;
        state.graph.nodes.get(&(label, id.to_string())).cloned()
    }

    pub async fn edge(&self, edge_type: EdgeType, from_id: &str, to_id: &str) -> Option<PropertyMap> {
        let state = self.state.lock().await;
        state
            .graph
            .edges
            .get(&(edge_type, from_id.to_string(), to_id.to_string()))
            .cloned()
    }

    pub async fn indexes(&self) -> Vec<(NodeLabel, String)> {
        self.state.lock().await.indexes.iter().cloned().collect()
    }

    /// Number of successful `upsert_*` calls so far.
    pub async fn batches_applied(&self) -> usize {
        self.state.lock().await.batches_applied
    }
}

impl State {
    fn check_online(&self) -> GraphResult<()> {
        if self.offline {
            return Err(GraphError::Connection {
                uri: "memory".to_string(),
                reason: "store is offline".to_string(),
            });
        }
        Ok(())
    }

    fn check_batch<'a>(&self, ids: impl IntoIterator<Item = &'a str>) -> GraphResult<()> {
        self.check_online()?;
        for id in ids {
            if self.failing_ids.contains(id) {
                return Err(GraphError::Rejected(format!("batch contains '{}'", id)));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl GraphStore for MemoryGraph {
    async fn ping(&self) -> GraphResult<()> {
        self.state.lock().await.check_online()
    }

    async fn ensure_index(&self, label: NodeLabel, property: &str) -> GraphResult<()> {
        let mut state = self.state.lock().await;
        if state.reject_indexes {
            return Err(GraphError::Query(format!(
                "index on {}.{} not supported",
                label, property
            )));
        }
        state.indexes.insert((label, property.to_string()));
        Ok(())
    }

    async fn upsert_nodes(&self, label: NodeLabel, nodes: &[NodeRecord]) -> GraphResult<()> {
        let mut state = self.state.lock().await;
        state.check_batch(nodes.iter().map(|n| n.id.as_str()))?;

        for node in nodes {
            state
                .graph
                .nodes
                .insert((label, node.id.clone()), node.properties.clone());
        }
        state.batches_applied += 1;
        Ok(())
    }

    async fn upsert_edges(&self, edge_type: EdgeType, edges: &[EdgeDescriptor]) -> GraphResult<()> {
        let mut state = self.state.lock().await;
        state.check_batch(edges.iter().flat_map(|e| [e.from_id(), e.to_id()]))?;

        let (from_label, to_label) = edge_type.endpoints();
        for edge in edges {
            let from_exists = state
                .graph
                .nodes
                .contains_key(&(from_label, edge.from_id().to_string()));
            let to_exists = state
                .graph
                .nodes
                .contains_key(&(to_label, edge.to_id().to_string()));
            if !(from_exists && to_exists) {
                continue;
            }
            state.graph.edges.insert(
                (edge_type, edge.from_id().to_string(), edge.to_id().to_string()),
                edge.properties(),
            );
        }
        state.batches_applied += 1;
        Ok(())
    }

    async fn count_nodes(&self, label: NodeLabel) -> GraphResult<usize> {
        let state = self.state.lock().await;
        Ok(state.graph.nodes.keys().filter(|(l, _)| *l == label).count())
    }

    async fn count_edges(&self, edge_type: EdgeType) -> GraphResult<usize> {
        let state = self.state.lock().await;
        Ok(state
            .graph
            .edges
            .keys()
            .filter(|(t, _, _)| *t == edge_type)
            .count())
    }

    async fn count_edges_with(
        &self,
        edge_type: EdgeType,
        property: &str,
        value: &str,
    ) -> GraphResult<usize> {
        let state = self.state.lock().await;
        Ok(state
            .graph
            .edges
            .iter()
            .filter(|((t, _, _), props)| {
                *t == edge_type && props.get(property).and_then(|v| v.as_str()) == Some(value)
            })
            .count())
    }

    async fn count_nodes_with_labels(&self, labels: &[NodeLabel]) -> GraphResult<usize> {
        let state = self.state.lock().await;
        Ok(state
            .graph
            .nodes
            .keys()
            .filter(|(l, _)| labels.contains(l))
            .count())
    }

    async fn delete_nodes_by_labels(&self, labels: &[NodeLabel]) -> GraphResult<usize> {
        let mut state = self.state.lock().await;
        let before = state.graph.nodes.len();
        state.graph.nodes.retain(|(l, _), _| !labels.contains(l));
        let deleted = before - state.graph.nodes.len();

        let GraphSnapshot { nodes, edges } = &mut state.graph;
        edges.retain(|(edge_type, from_id, to_id), _| {
            let (from_label, to_label) = edge_type.endpoints();
            nodes.contains_key(&(from_label, from_id.clone()))
                && nodes.contains_key(&(to_label, to_id.clone()))
        });
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use congress_core::PropertyValue;

    fn belongs_to(committee: &str, session: &str) -> EdgeDescriptor {
        EdgeDescriptor::BelongsTo {
            committee_id: committee.into(),
            session_id: session.into(),
        }
    }

    #[tokio::test]
    async fn test_upsert_replaces_properties() {
        let graph = MemoryGraph::new();
        let first = NodeRecord::new("s1").with("name", "19th").with("note", "x");
        graph.upsert_nodes(NodeLabel::Congress, &[first]).await.unwrap();

        let second = NodeRecord::new("s1").with("name", "Nineteenth");
        graph.upsert_nodes(NodeLabel::Congress, &[second]).await.unwrap();

        let props = graph.node(NodeLabel::Congress, "s1").await.unwrap();
        assert_eq!(props["name"], PropertyValue::from("Nineteenth"));
        assert!(!props.contains_key("note"));
        assert_eq!(graph.count_nodes(NodeLabel::Congress).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_edge_requires_both_endpoints() {
        let graph = MemoryGraph::new();
        graph
            .upsert_nodes(NodeLabel::Committee, &[NodeRecord::new("c1")])
            .await
            .unwrap();
        graph
            .upsert_edges(EdgeType::BelongsTo, &[belongs_to("c1", "s1")])
            .await
            .unwrap();
        assert_eq!(graph.count_edges(EdgeType::BelongsTo).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_edge_endpoint_labels_matter() {
        let graph = MemoryGraph::new();
        // s1 exists, but as a Person rather than a Congress node.
        graph
            .upsert_nodes(NodeLabel::Person, &[NodeRecord::new("s1")])
            .await
            .unwrap();
        graph
            .upsert_nodes(NodeLabel::Committee, &[NodeRecord::new("c1")])
            .await
            .unwrap();
        graph
            .upsert_edges(EdgeType::BelongsTo, &[belongs_to("c1", "s1")])
            .await
            .unwrap();
        assert_eq!(graph.count_edges(EdgeType::BelongsTo).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_failing_batch_is_atomic() {
        let graph = MemoryGraph::new();
        graph.fail_batches_with("bad").await;

        let batch = vec![NodeRecord::new("ok"), NodeRecord::new("bad")];
        let err = graph.upsert_nodes(NodeLabel::Person, &batch).await.unwrap_err();
        assert!(matches!(err, GraphError::Rejected(_)));
        assert_eq!(graph.count_nodes(NodeLabel::Person).await.unwrap(), 0);
        assert_eq!(graph.batches_applied().await, 0);
    }

    #[tokio::test]
    async fn test_delete_detaches_edges() {
        let graph = MemoryGraph::new();
        graph
            .upsert_nodes(NodeLabel::Congress, &[NodeRecord::new("s1")])
            .await
            .unwrap();
        graph
            .upsert_nodes(NodeLabel::Committee, &[NodeRecord::new("c1")])
            .await
            .unwrap();
        graph
            .upsert_edges(EdgeType::BelongsTo, &[belongs_to("c1", "s1")])
            .await
            .unwrap();

        let deleted = graph
            .delete_nodes_by_labels(&[NodeLabel::Congress])
            .await
            .unwrap();
        assert_eq!(deleted, 1);
        assert_eq!(graph.count_nodes(NodeLabel::Committee).await.unwrap(), 1);
        assert_eq!(graph.count_edges(EdgeType::BelongsTo).await.unwrap(), 0);
    }
}
