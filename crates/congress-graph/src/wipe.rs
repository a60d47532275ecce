//! Explicit removal of every node the sync manages.
//!
//! Confirmation is the caller's responsibility.

use tracing::info;

use congress_core::NodeLabel;

use crate::error::GraphResult;
use crate::GraphStore;

/// Number of nodes a wipe would delete.
pub async fn managed_node_count<S: GraphStore + ?Sized>(store: &S) -> GraphResult<usize> {
    store.count_nodes_with_labels(&NodeLabel::ALL).await
}

/// Delete all `Congress`, `Committee` and `Person` nodes and their edges.
pub async fn wipe_managed_nodes<S: GraphStore + ?Sized>(store: &S) -> GraphResult<usize> {
    let deleted = store.delete_nodes_by_labels(&NodeLabel::ALL).await?;
    let labels: Vec<&str> = NodeLabel::ALL.iter().map(|l| l.as_str()).collect();
    info!(deleted, labels = %labels.join(", "), "Cleared managed nodes");
    Ok(deleted)
}
