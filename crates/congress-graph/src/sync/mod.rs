//! Record to Neo4j synchronization pipeline.
//!
//! Passes run strictly in dependency order: indexes, sessions, committees,
//! people, statistics. Sessions go first because committees and people
//! reference them by session number.

pub mod engine;
pub mod relation_sync;
pub mod report;
pub mod resolver;
pub mod session_sync;

use serde::Serialize;
use tracing::{info, warn, Instrument};

use congress_core::{Committee, Loader, Person, DEFAULT_BATCH_SIZE};

use crate::error::SyncError;
use crate::{schema, stats, GraphStore};

pub use engine::{GraphSync, Outcome};
pub use report::{BatchOutcome, BatchTarget, PassReport, RejectedRecord, SyncReport};
pub use resolver::{Resolution, ResolveEdges, SessionIdMap, UnresolvedReference};

/// Orchestrator progress. Strictly linear; no state is re-entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum SyncState {
    Init,
    IndexesReady,
    SessionsSynced,
    CommitteesSynced,
    PeopleSynced,
    Done,
}

impl SyncState {
    /// The only state reachable from this one.
    pub fn next(self) -> Option<SyncState> {
        match self {
            Self::Init => Some(Self::IndexesReady),
            Self::IndexesReady => Some(Self::SessionsSynced),
            Self::SessionsSynced => Some(Self::CommitteesSynced),
            Self::CommitteesSynced => Some(Self::PeopleSynced),
            Self::PeopleSynced => Some(Self::Done),
            Self::Done => None,
        }
    }
}

/// Tunables for a sync run.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Records per committee/person batch. Sessions always go in one batch.
    pub batch_size: usize,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// Runs one sync from a loader into a graph store.
pub struct Synchronizer<'a, S: GraphStore + ?Sized, L: Loader> {
    store: &'a S,
    loader: &'a L,
    options: SyncOptions,
    report: SyncReport,
}

impl<'a, S: GraphStore + ?Sized, L: Loader> Synchronizer<'a, S, L> {
    pub fn new(store: &'a S, loader: &'a L, options: SyncOptions) -> Self {
        Self {
            store,
            loader,
            options,
            report: SyncReport::start(),
        }
    }

    fn advance(&mut self, next: SyncState) {
        debug_assert_eq!(self.report.state.next(), Some(next), "sync states are linear");
        info!(from = ?self.report.state, to = ?next, "Sync state advanced");
        self.report.state = next;
    }

    /// Run every pass and return the report.
    ///
    /// Only an unreachable store or an unlistable data directory fails the
    /// run; record and batch failures are contained in the report. The store
    /// is pinged first so an unreachable one fails before anything is written.
    pub async fn run(mut self) -> Result<SyncReport, SyncError> {
        let span = tracing::info_span!("sync", run_id = %self.report.run_id);
        async move {
            self.store.ping().await?;

            info!("Creating database indexes...");
            self.report.indexes = schema::ensure_indexes(self.store).await;
            self.advance(SyncState::IndexesReady);

            info!("Syncing sessions...");
            let (session_ids, session_pass) =
                session_sync::sync_sessions(self.store, self.loader).await?;
            info!(mapped = session_ids.len(), "Session map built");
            self.report.passes.push(session_pass);
            self.advance(SyncState::SessionsSynced);

            info!("Syncing committees...");
            let committee_pass = relation_sync::sync_related::<Committee, _, _>(
                self.store,
                self.loader,
                &session_ids,
                self.options.batch_size,
            )
            .await?;
            self.report.passes.push(committee_pass);
            self.advance(SyncState::CommitteesSynced);

            info!("Syncing people...");
            let person_pass = relation_sync::sync_related::<Person, _, _>(
                self.store,
                self.loader,
                &session_ids,
                self.options.batch_size,
            )
            .await?;
            self.report.passes.push(person_pass);
            self.advance(SyncState::PeopleSynced);

            self.report.statistics = match stats::collect_statistics(self.store).await {
                Ok(statistics) => Some(statistics),
                Err(e) => {
                    warn!(error = %e, "Failed to collect graph statistics");
                    None
                }
            };
            self.advance(SyncState::Done);
            self.report.finished_at = Some(chrono::Utc::now());

            info!(
                rejected = self.report.rejected_records(),
                failed_batches = self.report.failed_batches(),
                unresolved = self.report.unresolved_references(),
                "Full sync complete"
            );
            Ok(self.report)
        }
        .instrument(span)
        .await
    }
}

/// Run a full sync with the given options.
pub async fn run_full_sync<S, L>(
    store: &S,
    loader: &L,
    options: SyncOptions,
) -> Result<SyncReport, SyncError>
where
    S: GraphStore + ?Sized,
    L: Loader,
{
    Synchronizer::new(store, loader, options).run().await
}
