//! End-of-run graph statistics.

use std::collections::BTreeMap;

use serde::Serialize;

use congress_core::NodeLabel;

use crate::error::GraphResult;
use crate::store::{EdgeType, GraphStore};

/// Node and relationship counts for the managed labels and types.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphStatistics {
    pub nodes: BTreeMap<NodeLabel, usize>,
    pub edges: BTreeMap<EdgeType, usize>,
    pub senator_terms: usize,
    pub representative_terms: usize,
}

impl GraphStatistics {
    pub fn node_count(&self, label: NodeLabel) -> usize {
        self.nodes.get(&label).copied().unwrap_or(0)
    }

    pub fn edge_count(&self, edge_type: EdgeType) -> usize {
        self.edges.get(&edge_type).copied().unwrap_or(0)
    }
}

/// Count nodes per label, edges per type, and terms served per position.
pub async fn collect_statistics<S: GraphStore + ?Sized>(store: &S) -> GraphResult<GraphStatistics> {
    let mut stats = GraphStatistics::default();

    for label in NodeLabel::ALL {
        stats.nodes.insert(label, store.count_nodes(label).await?);
    }
    for edge_type in EdgeType::ALL {
        stats.edges.insert(edge_type, store.count_edges(edge_type).await?);
    }

    stats.senator_terms = store
        .count_edges_with(EdgeType::ServedIn, "position", "senator")
        .await?;
    stats.representative_terms = store
        .count_edges_with(EdgeType::ServedIn, "position", "representative")
        .await?;

    Ok(stats)
}
