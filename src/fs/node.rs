//! Mirror node types.

use serde::{Deserialize, Serialize};

use crate::api::RemoteEntry;

/// Node kind matching the store's type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum NodeKind {
    /// Regular file
    File = 0,
    /// Folder/directory
    Folder = 1,
}

impl NodeKind {
    /// Create from the store's integer type tag.
    pub fn from_i64(t: i64) -> Option<Self> {
        match t {
            0 => Some(NodeKind::File),
            1 => Some(NodeKind::Folder),
            _ => None,
        }
    }
}

/// Locally known children of a folder node.
///
/// "Never fetched" and "known, possibly empty" are distinct states: an
/// `Unknown` subtree contributes nothing to size or timestamp aggregates,
/// while a `Listed` set is a point-in-time snapshot of a completed listing.
/// `Partial` holds only the entries cached by individual resolution misses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) enum ChildSet {
    /// Contents never fetched.
    #[default]
    Unknown,
    /// Entries cached one-by-one during path resolution; not a full listing.
    Partial(Vec<String>),
    /// Reflects a completed listing call.
    Listed(Vec<String>),
}

impl ChildSet {
    /// Cached child ids, regardless of completeness. `None` when unknown.
    pub(crate) fn ids(&self) -> Option<&[String]> {
        match self {
            ChildSet::Unknown => None,
            ChildSet::Partial(ids) | ChildSet::Listed(ids) => Some(ids),
        }
    }

    /// Append an id, initializing the set if absent. Never changes a
    /// `Partial` set into `Listed`.
    pub(crate) fn push(&mut self, id: String) {
        match self {
            ChildSet::Unknown => *self = ChildSet::Partial(vec![id]),
            ChildSet::Partial(ids) | ChildSet::Listed(ids) => ids.push(id),
        }
    }

    /// Remove the first matching id; `false` if unknown or absent.
    pub(crate) fn remove(&mut self, id: &str) -> bool {
        match self {
            ChildSet::Unknown => false,
            ChildSet::Partial(ids) | ChildSet::Listed(ids) => {
                match ids.iter().position(|c| c == id) {
                    Some(pos) => {
                        ids.remove(pos);
                        true
                    }
                    None => false,
                }
            }
        }
    }
}

/// A node in the mirror tree, shadowing one remote object.
///
/// Relations are expressed as ids into the owning
/// [`MirrorTree`](crate::fs::tree::MirrorTree) arena; the parent link is a
/// plain id, never an owning reference.
#[derive(Debug, Clone)]
pub struct Node {
    /// Opaque remote identifier, stable across rename and move.
    pub id: String,
    /// Current leaf name.
    pub name: String,
    /// Node kind.
    pub kind: NodeKind,
    /// File size in bytes (0 for folders; folder sizes are computed on
    /// demand over cached descendants).
    pub size: u64,
    /// Creation timestamp (Unix epoch seconds).
    pub created_at: Option<i64>,
    /// Last-modified timestamp (Unix epoch seconds).
    pub modified_at: Option<i64>,
    /// Parent node id; `None` only for the root.
    pub(crate) parent: Option<String>,
    /// Cached children (folders only; files stay `Unknown`).
    pub(crate) children: ChildSet,
}

impl Node {
    /// Check if this node is a file.
    pub fn is_file(&self) -> bool {
        self.kind == NodeKind::File
    }

    /// Check if this node is a folder.
    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Folder
    }
}

impl From<RemoteEntry> for Node {
    fn from(entry: RemoteEntry) -> Self {
        Node {
            id: entry.id,
            name: entry.name,
            kind: entry.kind,
            size: entry.size,
            created_at: entry.created_at,
            modified_at: entry.modified_at,
            parent: None,
            children: ChildSet::Unknown,
        }
    }
}

/// Metadata snapshot returned by `stat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stat {
    pub is_directory: bool,
    pub is_file: bool,
    /// For folders, the recursive sum over cached descendants.
    pub size: u64,
    /// For folders, the max over cached descendants.
    pub mtime: Option<i64>,
    pub ctime: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(id: &str) -> Node {
        Node {
            id: id.to_string(),
            name: format!("{}.txt", id),
            kind: NodeKind::File,
            size: 10,
            created_at: Some(1),
            modified_at: Some(2),
            parent: None,
            children: ChildSet::Unknown,
        }
    }

    #[test]
    fn test_kind_conversion() {
        assert_eq!(NodeKind::from_i64(0), Some(NodeKind::File));
        assert_eq!(NodeKind::from_i64(1), Some(NodeKind::Folder));
        assert_eq!(NodeKind::from_i64(2), None);
        assert_eq!(NodeKind::from_i64(-1), None);
    }

    #[test]
    fn test_classification() {
        let node = file("a");
        assert!(node.is_file());
        assert!(!node.is_dir());
    }

    #[test]
    fn test_child_set_tri_state() {
        let mut set = ChildSet::Unknown;
        assert!(set.ids().is_none());
        assert!(!set.remove("x"));

        set.push("a".to_string());
        assert_eq!(set, ChildSet::Partial(vec!["a".to_string()]));

        set.push("b".to_string());
        assert!(set.remove("a"));
        assert!(!set.remove("a"));
        assert_eq!(set.ids(), Some(&["b".to_string()][..]));
    }

    #[test]
    fn test_listed_stays_listed_on_push() {
        let mut set = ChildSet::Listed(vec!["a".to_string()]);
        set.push("b".to_string());
        assert!(matches!(set, ChildSet::Listed(ref ids) if ids.len() == 2));
    }

    #[test]
    fn test_from_remote_entry() {
        let node: Node = crate::api::RemoteEntry {
            id: "h1".to_string(),
            name: "x".to_string(),
            kind: NodeKind::Folder,
            size: 0,
            created_at: None,
            modified_at: Some(5),
        }
        .into();
        assert!(node.is_dir());
        assert_eq!(node.children, ChildSet::Unknown);
        assert!(node.parent.is_none());
    }
}
