//! # Congress Graph
//!
//! Neo4j synchronization for congress records.
//!
//! Provides the graph store protocol and its Neo4j and in-memory
//! implementations, lookup index management, relationship resolution, and
//! the dependency-ordered sync pipeline.

pub mod client;
pub mod error;
pub mod memory;
pub mod schema;
pub mod stats;
pub mod store;
pub mod sync;
pub mod wipe;

pub use client::{GraphClient, GraphConfig};
pub use error::{GraphError, GraphResult, SyncError};
pub use memory::MemoryGraph;
pub use stats::{collect_statistics, GraphStatistics};
pub use store::{EdgeDescriptor, EdgeType, GraphStore};
pub use sync::{run_full_sync, SyncOptions, SyncReport, SyncState, Synchronizer};
pub use wipe::{managed_node_count, wipe_managed_nodes};
