//! Registry storage.
//!
//! # Components
//!
//! - [`InMemoryRegistry`] - Entries, code index and click log behind one lock
//! - [`Snapshot`] - JSON form of the registry for saving and restoring

pub mod memory_registry;
pub mod snapshot;

pub use memory_registry::InMemoryRegistry;
pub use snapshot::{SNAPSHOT_VERSION, Snapshot};
