//! The remote store contract.
//!
//! The core addresses the store exclusively through [`RemoteStore`]: objects
//! are identified by opaque ids and related by parent links, never by paths.

use async_trait::async_trait;

use crate::error::Result;
use crate::fs::NodeKind;

/// One remote object as reported by the store.
#[derive(Debug, Clone)]
pub struct RemoteEntry {
    /// Opaque identifier, stable for the object's lifetime.
    pub id: String,
    /// Leaf name. The store permits siblings sharing a name.
    pub name: String,
    /// File or folder.
    pub kind: NodeKind,
    /// Byte length; 0 for folders.
    pub size: u64,
    /// Creation timestamp (Unix epoch seconds).
    pub created_at: Option<i64>,
    /// Last-modified timestamp (Unix epoch seconds).
    pub modified_at: Option<i64>,
}

/// Server-side result ordering for [`RemoteStore::list`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Most recently modified first. The default.
    #[default]
    ModifiedDesc,
    /// Least recently modified first.
    ModifiedAsc,
    /// Lexicographic by name.
    NameAsc,
}

/// Conjunctive listing filter, applied server-side.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    /// Exact name match (used by path resolution).
    pub name_exact: Option<String>,
    /// Name substring match.
    pub name_contains: Option<String>,
    /// Exact kind match.
    pub kind: Option<NodeKind>,
    /// Minimum size in bytes, inclusive.
    pub min_size: Option<u64>,
    /// Maximum size in bytes, inclusive.
    pub max_size: Option<u64>,
    /// Only entries modified at or after this stamp.
    pub modified_after: Option<i64>,
    /// Only entries modified at or before this stamp.
    pub modified_before: Option<i64>,
    /// Result ordering.
    pub order: SortOrder,
    /// Maximum number of entries returned.
    pub limit: Option<usize>,
}

impl ListFilter {
    /// Filter matching exactly one name, as issued on resolution misses.
    pub fn by_name(name: &str) -> Self {
        Self {
            name_exact: Some(name.to_string()),
            ..Self::default()
        }
    }
}

/// Partial update applied to one object.
///
/// Renames and re-parenting travel in a single patch so the store applies
/// them atomically.
#[derive(Debug, Clone, Default)]
pub struct UpdatePatch {
    /// New leaf name.
    pub name: Option<String>,
    /// Replacement content (files only).
    pub content: Option<Vec<u8>>,
    /// Parent link to add.
    pub add_parent: Option<String>,
    /// Parent link to remove.
    pub remove_parent: Option<String>,
}

impl UpdatePatch {
    /// Patch replacing only the content.
    pub fn content(content: Vec<u8>) -> Self {
        Self {
            content: Some(content),
            ..Self::default()
        }
    }
}

/// Remote hierarchical object store.
///
/// Per-call atomicity is the only consistency guarantee the store offers;
/// implementations must not retry internally.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetch one object by id.
    async fn get(&self, id: &str) -> Result<RemoteEntry>;

    /// List the children of a folder, optionally filtered.
    async fn list(&self, parent_id: &str, filter: Option<&ListFilter>) -> Result<Vec<RemoteEntry>>;

    /// Create a file or folder under a parent.
    async fn create(
        &self,
        parent_id: &str,
        name: &str,
        kind: NodeKind,
        content: Option<Vec<u8>>,
    ) -> Result<RemoteEntry>;

    /// Apply a partial update to an object.
    async fn update(&self, id: &str, patch: &UpdatePatch) -> Result<RemoteEntry>;

    /// Delete an object.
    async fn delete(&self, id: &str) -> Result<()>;

    /// Server-side copy under a new parent, yielding a fresh id.
    async fn copy(&self, id: &str, dest_parent_id: &str, new_name: &str) -> Result<RemoteEntry>;

    /// Fetch a file's raw content as text.
    async fn download(&self, id: &str) -> Result<String>;
}
