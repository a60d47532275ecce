//! Derives edge descriptors from records' natural-key session references.

use std::collections::HashMap;

use serde::Serialize;

use congress_core::{Committee, Person, Session};

use crate::store::{EdgeDescriptor, EdgeType};

/// Session number to session id, built once by the session pass.
///
/// Read-only afterwards. A session that was not loaded is simply absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionIdMap {
    ids: HashMap<i64, String>,
}

impl SessionIdMap {
    /// Build the map from loaded sessions.
    ///
    /// Returns the map and the sessions whose number was already taken; the
    /// first record with a given number wins.
    pub fn build<'a>(sessions: impl IntoIterator<Item = &'a Session>) -> (Self, Vec<&'a Session>) {
        let mut ids = HashMap::new();
        let mut duplicates = Vec::new();
        for session in sessions {
            if ids.contains_key(&session.session_number) {
                duplicates.push(session);
            } else {
                ids.insert(session.session_number, session.id.clone());
            }
        }
        (Self { ids }, duplicates)
    }

    pub fn get(&self, session_number: i64) -> Option<&str> {
        self.ids.get(&session_number).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// A session reference that could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedReference {
    pub record_id: String,
    pub session_number: i64,
}

/// Edges derived from one record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    pub edges: Vec<EdgeDescriptor>,
    pub unresolved: Vec<UnresolvedReference>,
}

impl Resolution {
    fn resolve(
        record_id: &str,
        session_numbers: impl IntoIterator<Item = i64>,
        sessions: &SessionIdMap,
        mut edge: impl FnMut(usize, &str) -> EdgeDescriptor,
    ) -> Self {
        let mut resolution = Resolution::default();
        for (index, number) in session_numbers.into_iter().enumerate() {
            match sessions.get(number) {
                Some(session_id) => resolution.edges.push(edge(index, session_id)),
                None => resolution.unresolved.push(UnresolvedReference {
                    record_id: record_id.to_string(),
                    session_number: number,
                }),
            }
        }
        resolution
    }
}

/// Records that declare relationships to sessions.
pub trait ResolveEdges {
    /// Type of every edge this record produces.
    const EDGE_TYPE: EdgeType;

    fn resolve_edges(&self, sessions: &SessionIdMap) -> Resolution;
}

impl ResolveEdges for Committee {
    const EDGE_TYPE: EdgeType = EdgeType::BelongsTo;

    fn resolve_edges(&self, sessions: &SessionIdMap) -> Resolution {
        Resolution::resolve(
            &self.id,
            self.session_numbers.iter().copied(),
            sessions,
            |_, session_id| EdgeDescriptor::BelongsTo {
                committee_id: self.id.clone(),
                session_id: session_id.to_string(),
            },
        )
    }
}

impl ResolveEdges for Person {
    const EDGE_TYPE: EdgeType = EdgeType::ServedIn;

    fn resolve_edges(&self, sessions: &SessionIdMap) -> Resolution {
        Resolution::resolve(
            &self.id,
            self.memberships.iter().map(|m| m.session_number),
            sessions,
            |index, session_id| {
                let membership = &self.memberships[index];
                EdgeDescriptor::ServedIn {
                    person_id: self.id.clone(),
                    session_id: session_id.to_string(),
                    position: membership.position.clone(),
                    kind: membership.kind.clone(),
                }
            },
        )
    }
}
