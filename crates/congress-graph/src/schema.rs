//! Lookup index management.

use serde::Serialize;
use tracing::{info, warn};

use congress_core::NodeLabel;

use crate::GraphStore;

/// Indexes the find-or-create writes rely on.
pub const INDEXES: &[(NodeLabel, &str)] = &[
    (NodeLabel::Congress, "id"),
    (NodeLabel::Congress, "session_number"),
    (NodeLabel::Committee, "id"),
    (NodeLabel::Committee, "name"),
    (NodeLabel::Person, "id"),
    (NodeLabel::Person, "full_name"),
    (NodeLabel::Person, "last_name"),
];

/// Outcome of ensuring indexes.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IndexReport {
    pub ensured: usize,
    pub warnings: Vec<String>,
}

/// Ensure every lookup index exists.
///
/// Safe to run multiple times. A failed index is a warning: the sync
/// proceeds without it.
pub async fn ensure_indexes<S: GraphStore + ?Sized>(store: &S) -> IndexReport {
    let mut report = IndexReport::default();

    for (label, property) in INDEXES {
        match store.ensure_index(*label, property).await {
            Ok(()) => report.ensured += 1,
            Err(e) => {
                warn!(label = %label, property, error = %e, "Index creation warning");
                report
                    .warnings
                    .push(format!("{}.{}: {}", label, property, e));
            }
        }
    }

    info!(
        ensured = report.ensured,
        warnings = report.warnings.len(),
        "Database indexes created/verified"
    );
    report
}
