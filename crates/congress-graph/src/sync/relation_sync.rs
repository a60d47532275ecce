//! Committee and person synchronization to Neo4j.
//!
//! Both kinds reference sessions by number, so one pass shape serves both:
//! - (:Committee)-[:BELONGS_TO]->(:Congress)
//! - (:Person)-[:SERVED_IN {position, type}]->(:Congress)

use std::time::Instant;

use tracing::{debug, error, info};

use congress_core::{BatchExt, Entity, LoadError, Loader, NodeRecord};

use super::engine::{GraphSync, Outcome};
use super::report::{BatchTarget, PassReport, RejectedRecord};
use super::resolver::{ResolveEdges, SessionIdMap};
use crate::error::SyncError;
use crate::store::EdgeDescriptor;
use crate::GraphStore;

/// Sync all records of `T` in batches, each node batch followed by the
/// edges its records declare.
///
/// If a node batch fails its edge batch is skipped; the pass continues with
/// the next batch either way. A document error that is not scoped to one
/// record, or a lost store, stops the pass.
pub(crate) async fn sync_related<T, S, L>(
    store: &S,
    loader: &L,
    sessions: &SessionIdMap,
    batch_size: usize,
) -> Result<PassReport, SyncError>
where
    T: Entity + ResolveEdges,
    S: GraphStore + ?Sized,
    L: Loader,
{
    let label = T::LABEL;
    let edge_type = T::EDGE_TYPE;
    let started = Instant::now();
    let mut pass = PassReport::new(label);

    let documents = loader.load::<T>()?;
    let total = documents.size_hint().1;
    info!(label = %label, total = ?total, "Found documents");

    let mut rejected: Vec<RejectedRecord> = Vec::new();
    let mut fatal: Option<LoadError> = None;
    let records = documents
        .map_while(|result| match result {
            Ok(record) => Some(Some(record)),
            Err(e) if e.is_record_scoped() => {
                error!(label = %label, source = %e.source_name(), error = %e, "Failed to load record");
                rejected.push(RejectedRecord::from(&e));
                Some(None)
            }
            Err(e) => {
                fatal = Some(e);
                None
            }
        })
        .flatten();

    let engine = GraphSync::new(store);
    let mut processed = 0usize;

    for (index, batch) in records.batched(batch_size).enumerate() {
        processed += batch.len();

        let mut nodes: Vec<NodeRecord> = Vec::with_capacity(batch.len());
        let mut edges: Vec<EdgeDescriptor> = Vec::new();
        for record in &batch {
            nodes.push(record.to_node());

            let resolution = record.resolve_edges(sessions);
            for reference in &resolution.unresolved {
                debug!(
                    record_id = %reference.record_id,
                    session_number = reference.session_number,
                    "Session not in map; relationship not created"
                );
            }
            edges.extend(resolution.edges);
            pass.unresolved.extend(resolution.unresolved);
        }

        let node_outcome = engine.apply_node_batch(label, &nodes).await?;
        let nodes_applied = node_outcome.is_applied();
        pass.record_batch(index, BatchTarget::Nodes(label), nodes.len(), node_outcome);

        if !edges.is_empty() {
            let edge_outcome = if nodes_applied {
                engine.apply_edge_batch(edge_type, &edges).await?
            } else {
                Outcome::Skipped("node batch failed".to_string())
            };
            pass.record_batch(index, BatchTarget::Edges(edge_type), edges.len(), edge_outcome);
        }

        log_progress(&label.to_string(), processed, total, started);
    }

    if let Some(e) = fatal {
        error!(label = %label, error = %e, "Document stream failed; pass stopped");
        return Err(e.into());
    }

    pass.records_loaded = processed;
    pass.rejected = rejected;
    pass.elapsed_ms = started.elapsed().as_millis() as u64;

    info!(
        label = %label,
        records = pass.records_loaded,
        rejected = pass.rejected.len(),
        nodes = pass.nodes_written(),
        edges = pass.edges_submitted(),
        unresolved = pass.unresolved.len(),
        elapsed_ms = pass.elapsed_ms,
        "Pass complete"
    );
    Ok(pass)
}

fn log_progress(label: &str, processed: usize, total: Option<usize>, started: Instant) {
    let elapsed = started.elapsed().as_secs_f64();
    let rate = if elapsed > 0.0 { processed as f64 / elapsed } else { 0.0 };

    match total {
        Some(total) if rate > 0.0 => {
            let eta = total.saturating_sub(processed) as f64 / rate;
            info!(
                label,
                processed,
                total,
                rate = %format!("{:.1}/s", rate),
                eta = %format!("{:.0}s", eta),
                "Progress"
            );
        }
        _ => info!(label, processed, "Progress"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GraphError, MemoryGraph};
    use congress_core::{decode, Committee, LoadStream, NodeLabel, Session};
    use std::path::PathBuf;

    /// Yields `documents` in order, then a listing failure if `truncated`.
    struct FlakyLoader {
        documents: Vec<&'static str>,
        truncated: bool,
    }

    impl Loader for FlakyLoader {
        fn load<T: Entity>(&self) -> Result<LoadStream<'_, T>, LoadError> {
            let mut results: Vec<Result<T, LoadError>> = self
                .documents
                .iter()
                .enumerate()
                .map(|(i, text)| decode::<T>(&format!("doc{}.toml", i), text))
                .collect();
            if self.truncated {
                results.push(Err(LoadError::ListDirectory {
                    path: PathBuf::from("committee"),
                    source: std::io::Error::other("device gone"),
                }));
            }
            Ok(Box::new(results.into_iter()))
        }
    }

    fn session_map() -> SessionIdMap {
        let sessions = vec![decode::<Session>("s19", "id = \"s19\"\nsession_number = 19").unwrap()];
        SessionIdMap::build(&sessions).0
    }

    #[tokio::test]
    async fn test_bad_document_is_rejected_and_pass_continues() {
        let graph = MemoryGraph::new();
        let loader = FlakyLoader {
            documents: vec![
                "id = \"c1\"\nname = \"Ways\"",
                "name = \"no id\"",
                "id = \"c2\"\nname = \"Rules\"",
            ],
            truncated: false,
        };

        let pass = sync_related::<Committee, _, _>(&graph, &loader, &session_map(), 1)
            .await
            .unwrap();

        assert_eq!(pass.records_loaded, 2);
        assert_eq!(pass.rejected.len(), 1);
        assert_eq!(pass.rejected[0].source, "doc1.toml");
        assert_eq!(graph.count_nodes(NodeLabel::Committee).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_stream_failure_stops_the_pass() {
        let graph = MemoryGraph::new();
        let loader = FlakyLoader {
            documents: vec!["id = \"c1\"\nname = \"Ways\"\ncongresses = [19]"],
            truncated: true,
        };

        let err = sync_related::<Committee, _, _>(&graph, &loader, &session_map(), 50)
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::Load(LoadError::ListDirectory { .. })));
    }

    #[tokio::test]
    async fn test_lost_store_stops_the_pass() {
        let graph = MemoryGraph::new();
        graph.go_offline().await;
        let loader = FlakyLoader {
            documents: vec!["id = \"c1\"\nname = \"Ways\"\ncongresses = [19]"],
            truncated: false,
        };

        let err = sync_related::<Committee, _, _>(&graph, &loader, &session_map(), 50)
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::Graph(GraphError::Connection { .. })));
        assert_eq!(graph.batches_applied().await, 0);
    }
}
