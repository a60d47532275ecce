//! Typed end-of-run report.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use congress_core::{LoadError, NodeLabel};

use super::engine::Outcome;
use super::resolver::UnresolvedReference;
use super::SyncState;
use crate::schema::IndexReport;
use crate::stats::GraphStatistics;
use crate::store::EdgeType;

/// What a batch wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchTarget {
    Nodes(NodeLabel),
    Edges(EdgeType),
}

/// One batch and how it went.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
    pub batch: usize,
    pub target: BatchTarget,
    pub size: usize,
    pub outcome: Outcome,
}

/// A document that could not be read or decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedRecord {
    pub source: String,
    pub reason: String,
}

impl From<&LoadError> for RejectedRecord {
    fn from(err: &LoadError) -> Self {
        let reason = match err {
            LoadError::Decode { reason, .. } => reason.clone(),
            other => other.to_string(),
        };
        Self {
            source: err.source_name(),
            reason,
        }
    }
}

/// Results of one entity pass.
#[derive(Debug, Clone, Serialize)]
pub struct PassReport {
    pub label: NodeLabel,
    pub records_loaded: usize,
    pub rejected: Vec<RejectedRecord>,
    pub batches: Vec<BatchOutcome>,
    pub unresolved: Vec<UnresolvedReference>,
    pub elapsed_ms: u64,
}

impl PassReport {
    pub fn new(label: NodeLabel) -> Self {
        Self {
            label,
            records_loaded: 0,
            rejected: Vec::new(),
            batches: Vec::new(),
            unresolved: Vec::new(),
            elapsed_ms: 0,
        }
    }

    pub(crate) fn record_batch(&mut self, batch: usize, target: BatchTarget, size: usize, outcome: Outcome) {
        self.batches.push(BatchOutcome {
            batch,
            target,
            size,
            outcome,
        });
    }

    /// Nodes submitted in batches that were applied.
    pub fn nodes_written(&self) -> usize {
        self.applied_size(|t| matches!(t, BatchTarget::Nodes(_)))
    }

    /// Edge descriptors submitted in batches that were applied.
    ///
    /// Descriptors whose endpoints were missing are included; the graph
    /// statistics carry the true edge count.
    pub fn edges_submitted(&self) -> usize {
        self.applied_size(|t| matches!(t, BatchTarget::Edges(_)))
    }

    pub fn failed_batches(&self) -> impl Iterator<Item = &BatchOutcome> {
        self.batches.iter().filter(|b| b.outcome.is_failed())
    }

    fn applied_size(&self, target: impl Fn(&BatchTarget) -> bool) -> usize {
        self.batches
            .iter()
            .filter(|b| b.outcome.is_applied() && target(&b.target))
            .map(|b| b.size)
            .sum()
    }
}

/// Everything a run did, for display and inspection.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub state: SyncState,
    pub indexes: IndexReport,
    pub passes: Vec<PassReport>,
    pub statistics: Option<GraphStatistics>,
}

impl SyncReport {
    pub(crate) fn start() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            state: SyncState::Init,
            indexes: IndexReport::default(),
            passes: Vec::new(),
            statistics: None,
        }
    }

    pub fn pass(&self, label: NodeLabel) -> Option<&PassReport> {
        self.passes.iter().find(|p| p.label == label)
    }

    pub fn rejected_records(&self) -> usize {
        self.passes.iter().map(|p| p.rejected.len()).sum()
    }

    pub fn failed_batches(&self) -> usize {
        self.passes.iter().map(|p| p.failed_batches().count()).sum()
    }

    pub fn unresolved_references(&self) -> usize {
        self.passes.iter().map(|p| p.unresolved.len()).sum()
    }

    /// No rejected records, failed batches or index warnings.
    pub fn is_clean(&self) -> bool {
        self.rejected_records() == 0 && self.failed_batches() == 0 && self.indexes.warnings.is_empty()
    }
}
