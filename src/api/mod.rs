//! Remote store boundary: the contract the core talks through, plus the
//! bundled implementations.

pub mod client;
pub mod memory;
pub mod store;

pub use client::{HttpStore, StoreErrorCode};
pub use memory::{CallCounts, MemoryStore};
pub use store::{ListFilter, RemoteEntry, RemoteStore, SortOrder, UpdatePatch};
