//! Session synchronization to Neo4j.
//!
//! Sessions are written as (:Congress) nodes in a single batch and produce
//! the session-number map the later passes resolve against.

use std::time::Instant;

use tracing::{error, info, warn};

use congress_core::{Entity, Loader, NodeLabel, NodeRecord, Session};

use super::engine::GraphSync;
use super::report::{BatchTarget, PassReport, RejectedRecord};
use super::resolver::SessionIdMap;
use crate::error::SyncError;
use crate::GraphStore;

/// Sync every readable session and build the session-number map.
///
/// The map covers every decoded session, whether or not its batch applied.
pub(crate) async fn sync_sessions<S, L>(
    store: &S,
    loader: &L,
) -> Result<(SessionIdMap, PassReport), SyncError>
where
    S: GraphStore + ?Sized,
    L: Loader,
{
    let started = Instant::now();
    let mut pass = PassReport::new(NodeLabel::Congress);

    let mut sessions: Vec<Session> = Vec::new();
    for result in loader.load::<Session>()? {
        match result {
            Ok(session) => sessions.push(session),
            Err(e) if !e.is_record_scoped() => return Err(e.into()),
            Err(e) => {
                error!(source = %e.source_name(), error = %e, "Failed to load session");
                pass.rejected.push(RejectedRecord::from(&e));
            }
        }
    }
    pass.records_loaded = sessions.len();
    info!(count = sessions.len(), rejected = pass.rejected.len(), "Loaded sessions");

    let (session_ids, duplicates) = SessionIdMap::build(&sessions);
    for duplicate in duplicates {
        warn!(
            id = %duplicate.id,
            session_number = duplicate.session_number,
            "Duplicate session number; the first session keeps the mapping"
        );
    }

    let nodes: Vec<NodeRecord> = sessions.iter().map(Entity::to_node).collect();
    if !nodes.is_empty() {
        let outcome = GraphSync::new(store)
            .apply_node_batch(NodeLabel::Congress, &nodes)
            .await?;
        if outcome.is_applied() {
            info!(count = nodes.len(), "Successfully synced sessions in batch");
        }
        pass.record_batch(0, BatchTarget::Nodes(NodeLabel::Congress), nodes.len(), outcome);
    }

    pass.elapsed_ms = started.elapsed().as_millis() as u64;
    Ok((session_ids, pass))
}
