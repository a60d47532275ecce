//! Applies node and edge batches to a graph store.
//!
//! Every batch is one atomic store call. A failed batch is reported and
//! abandoned; there is no retry. Losing the store itself is not contained
//! and stops the run.

use serde::Serialize;
use tracing::{debug, error};

use congress_core::{NodeLabel, NodeRecord};

use crate::error::{GraphError, GraphResult};
use crate::store::{EdgeDescriptor, EdgeType, GraphStore};

/// Result of applying one batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum Outcome {
    Applied,
    Skipped(String),
    Failed(String),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Batch writer over a graph store.
pub struct GraphSync<'a, S: GraphStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: GraphStore + ?Sized> GraphSync<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Find-or-create every node by `id`, replacing its properties.
    ///
    /// Errors only on a fatal store error; batch failures are an `Outcome`.
    pub async fn apply_node_batch(
        &self,
        label: NodeLabel,
        records: &[NodeRecord],
    ) -> GraphResult<Outcome> {
        if records.is_empty() {
            return Ok(Outcome::Skipped("empty batch".to_string()));
        }

        match self.store.upsert_nodes(label, records).await {
            Ok(()) => {
                debug!(label = %label, size = records.len(), "Applied node batch");
                Ok(Outcome::Applied)
            }
            Err(e) => {
                error!(label = %label, size = records.len(), error = %e, "Node batch failed");
                contain(e)
            }
        }
    }

    /// Find-or-create every edge between existing endpoints.
    pub async fn apply_edge_batch(
        &self,
        edge_type: EdgeType,
        descriptors: &[EdgeDescriptor],
    ) -> GraphResult<Outcome> {
        if descriptors.is_empty() {
            return Ok(Outcome::Skipped("empty batch".to_string()));
        }

        if let Some(stray) = descriptors.iter().find(|d| d.edge_type() != edge_type) {
            let reason = format!(
                "{} descriptor in a {} batch",
                stray.edge_type(),
                edge_type
            );
            error!(edge_type = %edge_type, %reason, "Edge batch rejected");
            return Ok(Outcome::Failed(reason));
        }

        match self.store.upsert_edges(edge_type, descriptors).await {
            Ok(()) => {
                debug!(edge_type = %edge_type, size = descriptors.len(), "Applied edge batch");
                Ok(Outcome::Applied)
            }
            Err(e) => {
                error!(edge_type = %edge_type, size = descriptors.len(), error = %e, "Edge batch failed");
                contain(e)
            }
        }
    }
}

fn contain(err: GraphError) -> GraphResult<Outcome> {
    if err.is_fatal() {
        Err(err)
    } else {
        Ok(Outcome::Failed(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryGraph;

    #[tokio::test]
    async fn test_empty_batch_is_skipped() {
        let graph = MemoryGraph::new();
        let engine = GraphSync::new(&graph);
        let outcome = engine.apply_node_batch(NodeLabel::Person, &[]).await.unwrap();
        assert!(matches!(outcome, Outcome::Skipped(_)));
        assert_eq!(graph.batches_applied().await, 0);
    }

    #[tokio::test]
    async fn test_store_error_becomes_failed_outcome() {
        let graph = MemoryGraph::new();
        graph.fail_batches_with("p2").await;
        let engine = GraphSync::new(&graph);

        let outcome = engine
            .apply_node_batch(NodeLabel::Person, &[NodeRecord::new("p1"), NodeRecord::new("p2")])
            .await
            .unwrap();
        assert!(outcome.is_failed());
        assert_eq!(graph.count_nodes(NodeLabel::Person).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_mixed_edge_types_rejected() {
        let graph = MemoryGraph::new();
        let engine = GraphSync::new(&graph);
        let edges = vec![EdgeDescriptor::BelongsTo {
            committee_id: "c1".into(),
            session_id: "s1".into(),
        }];

        let outcome = engine.apply_edge_batch(EdgeType::ServedIn, &edges).await.unwrap();
        assert!(outcome.is_failed());
        assert_eq!(graph.batches_applied().await, 0);
    }

    #[tokio::test]
    async fn test_reapplying_edge_overwrites_properties() {
        let graph = MemoryGraph::new();
        let engine = GraphSync::new(&graph);
        engine
            .apply_node_batch(NodeLabel::Congress, &[NodeRecord::new("s19")])
            .await
            .unwrap();
        engine
            .apply_node_batch(NodeLabel::Person, &[NodeRecord::new("p1")])
            .await
            .unwrap();

        let served = |position: &str| EdgeDescriptor::ServedIn {
            person_id: "p1".into(),
            session_id: "s19".into(),
            position: position.into(),
            kind: "congress".into(),
        };
        engine
            .apply_edge_batch(EdgeType::ServedIn, &[served("representative")])
            .await
            .unwrap();
        let outcome = engine
            .apply_edge_batch(EdgeType::ServedIn, &[served("senator")])
            .await
            .unwrap();

        assert!(outcome.is_applied());
        assert_eq!(graph.count_edges(EdgeType::ServedIn).await.unwrap(), 1);
        let props = graph.edge(EdgeType::ServedIn, "p1", "s19").await.unwrap();
        assert_eq!(props["position"].as_str(), Some("senator"));
    }

    #[tokio::test]
    async fn test_lost_store_is_not_contained() {
        let graph = MemoryGraph::new();
        graph.go_offline().await;
        let engine = GraphSync::new(&graph);

        let err = engine
            .apply_node_batch(NodeLabel::Congress, &[NodeRecord::new("s19")])
            .await
            .unwrap_err();
        assert!(matches!(err, GraphError::Connection { .. }));
    }
}
