//! Congress Core Library
//!
//! Record model, document loading and batching for the congress graph sync.

pub mod batch;
pub mod error;
pub mod loader;
pub mod record;

pub use batch::{BatchExt, Batcher, DEFAULT_BATCH_SIZE};
pub use error::{LoadError, LoadResult};
pub use loader::{decode, DirectoryLoader, InlineLoader, LoadStream, Loader};
pub use record::{
    Committee, Entity, Membership, NodeLabel, NodeRecord, Person, PropertyMap, PropertyValue,
    Session, SCHEMA_VERSION,
};
