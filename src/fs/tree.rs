//! The mirror tree: an id-keyed arena of cached nodes.
//!
//! Ownership lives in one `HashMap`; parent and child relations are ids, so
//! the no-cycles invariant (parent links always point toward the root) keeps
//! every walk finite.

use std::collections::HashMap;

use crate::api::RemoteEntry;

use super::node::{ChildSet, Node};

/// In-memory hierarchy shadowing the remote store, built incrementally.
#[derive(Debug, Default)]
pub(crate) struct MirrorTree {
    nodes: HashMap<String, Node>,
    root: Option<String>,
}

impl MirrorTree {
    /// Drop all cached state and seed a fresh root with unknown children.
    pub fn seed_root(&mut self, mut root: Node) {
        root.parent = None;
        root.children = ChildSet::Unknown;
        self.nodes.clear();
        self.root = Some(root.id.clone());
        self.nodes.insert(root.id.clone(), root);
    }

    pub fn root_id(&self) -> Option<&str> {
        self.root.as_deref()
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    /// Attach a node as a child of `parent_id`.
    ///
    /// No-op if the parent is missing or not a folder. Does not deduplicate
    /// by name or id; inserting an already-attached node is a caller error.
    pub fn add_child(&mut self, parent_id: &str, mut node: Node) {
        match self.nodes.get(parent_id) {
            Some(parent) if parent.is_dir() => {}
            _ => return,
        }
        node.parent = Some(parent_id.to_string());
        let id = node.id.clone();
        self.nodes.insert(id.clone(), node);
        if let Some(parent) = self.nodes.get_mut(parent_id) {
            parent.children.push(id);
        }
    }

    /// Remove `child_id` from its parent's child set without discarding the
    /// node. Returns whether a removal occurred; no-op when the parent's
    /// children are unpopulated.
    pub fn remove_child(&mut self, parent_id: &str, child_id: &str) -> bool {
        match self.nodes.get_mut(parent_id) {
            Some(parent) => parent.children.remove(child_id),
            None => false,
        }
    }

    /// Re-link an already-cached node under a new parent. Used after a
    /// remote move; the caller must have detached it from the old parent.
    pub fn reattach(&mut self, parent_id: &str, child_id: &str) {
        match self.nodes.get(parent_id) {
            Some(parent) if parent.is_dir() => {}
            _ => return,
        }
        if let Some(node) = self.nodes.get_mut(child_id) {
            node.parent = Some(parent_id.to_string());
        } else {
            return;
        }
        if let Some(parent) = self.nodes.get_mut(parent_id) {
            parent.children.push(child_id.to_string());
        }
    }

    /// Discard a node and its cached subtree from the arena. The caller is
    /// responsible for detaching it from its parent first.
    pub fn discard(&mut self, id: &str) {
        let Some(node) = self.nodes.remove(id) else {
            return;
        };
        if let Some(ids) = node.children.ids() {
            for child in ids.to_vec() {
                self.discard(&child);
            }
        }
    }

    /// Whether `id` is `node_id` itself or appears on its parent chain.
    ///
    /// Move targets are checked with this before re-parenting, so the
    /// no-cycles invariant on parent links survives every mutation.
    pub fn is_ancestor_or_self(&self, id: &str, node_id: &str) -> bool {
        let mut current = Some(node_id);
        while let Some(cur) = current {
            if cur == id {
                return true;
            }
            current = self.nodes.get(cur).and_then(|n| n.parent.as_deref());
        }
        false
    }

    /// First cached child of `parent_id` with an exactly matching name.
    ///
    /// When siblings share a name the choice is implementation-defined, as
    /// it is on the remote store itself.
    pub fn child_by_name(&self, parent_id: &str, name: &str) -> Option<&Node> {
        let ids = self.nodes.get(parent_id)?.children.ids()?;
        ids.iter()
            .filter_map(|id| self.nodes.get(id))
            .find(|n| n.name == name)
    }

    /// Replace a folder's child set with a completed listing.
    ///
    /// Surviving nodes keep their cached subtrees; children that vanished
    /// from the listing are discarded.
    pub fn set_children(&mut self, parent_id: &str, entries: Vec<RemoteEntry>) {
        match self.nodes.get(parent_id) {
            Some(parent) if parent.is_dir() => {}
            _ => return,
        }

        let old_ids: Vec<String> = self
            .nodes
            .get(parent_id)
            .and_then(|p| p.children.ids())
            .map(|ids| ids.to_vec())
            .unwrap_or_default();

        let mut new_ids = Vec::with_capacity(entries.len());
        for entry in entries {
            new_ids.push(entry.id.clone());
            match self.nodes.get_mut(&entry.id) {
                Some(existing) => {
                    existing.name = entry.name;
                    existing.size = entry.size;
                    existing.created_at = entry.created_at;
                    existing.modified_at = entry.modified_at;
                    existing.parent = Some(parent_id.to_string());
                }
                None => {
                    let mut node = Node::from(entry);
                    node.parent = Some(parent_id.to_string());
                    self.nodes.insert(node.id.clone(), node);
                }
            }
        }

        for old in old_ids {
            if !new_ids.contains(&old) {
                self.discard(&old);
            }
        }

        if let Some(parent) = self.nodes.get_mut(parent_id) {
            parent.children = ChildSet::Listed(new_ids);
        }
    }

    /// Byte size of a node: stored size for files, recursive sum over cached
    /// children for folders. Unpopulated subtrees count as empty - this is a
    /// documented approximation, not a guaranteed total.
    pub fn size_of(&self, id: &str) -> u64 {
        let Some(node) = self.nodes.get(id) else {
            return 0;
        };
        if node.is_file() {
            return node.size;
        }
        node.children
            .ids()
            .map(|ids| ids.iter().map(|c| self.size_of(c)).sum())
            .unwrap_or(0)
    }

    /// Last-modified stamp: stored for files, max over cached children for
    /// folders (ignoring missing stamps).
    pub fn last_modified_of(&self, id: &str) -> Option<i64> {
        let node = self.nodes.get(id)?;
        if node.is_file() {
            return node.modified_at;
        }
        node.children
            .ids()?
            .iter()
            .filter_map(|c| self.last_modified_of(c))
            .max()
    }

    /// Reconstruct a node's full slash-separated path by walking parent
    /// links to the root.
    pub fn path_of(&self, id: &str) -> Option<String> {
        let mut segments = Vec::new();
        let mut current = self.nodes.get(id)?;
        while let Some(parent_id) = &current.parent {
            segments.push(current.name.as_str());
            current = self.nodes.get(parent_id)?;
        }
        segments.reverse();
        Some(format!("/{}", segments.join("/")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::NodeKind;

    fn entry(id: &str, name: &str, kind: NodeKind, size: u64, mtime: Option<i64>) -> RemoteEntry {
        RemoteEntry {
            id: id.to_string(),
            name: name.to_string(),
            kind,
            size,
            created_at: mtime,
            modified_at: mtime,
        }
    }

    fn tree_with_root() -> MirrorTree {
        let mut tree = MirrorTree::default();
        tree.seed_root(Node::from(entry("root", "", NodeKind::Folder, 0, None)));
        tree
    }

    #[test]
    fn test_add_and_remove_child() {
        let mut tree = tree_with_root();
        tree.add_child("root", Node::from(entry("f1", "a.txt", NodeKind::File, 5, None)));

        assert_eq!(tree.get("f1").unwrap().parent.as_deref(), Some("root"));
        assert!(tree.remove_child("root", "f1"));
        assert!(!tree.remove_child("root", "f1"));
        // The node object survives a detach until discarded.
        assert!(tree.get("f1").is_some());
    }

    #[test]
    fn test_add_child_to_file_is_noop() {
        let mut tree = tree_with_root();
        tree.add_child("root", Node::from(entry("f1", "a.txt", NodeKind::File, 5, None)));
        tree.add_child("f1", Node::from(entry("f2", "b.txt", NodeKind::File, 5, None)));
        assert!(tree.get("f2").is_none());
    }

    #[test]
    fn test_remove_child_unpopulated_is_noop() {
        let mut tree = tree_with_root();
        tree.add_child("root", Node::from(entry("d1", "docs", NodeKind::Folder, 0, None)));
        assert!(!tree.remove_child("d1", "whatever"));
    }

    #[test]
    fn test_child_by_name_first_match_wins() {
        let mut tree = tree_with_root();
        tree.add_child("root", Node::from(entry("f1", "same", NodeKind::File, 1, None)));
        tree.add_child("root", Node::from(entry("f2", "same", NodeKind::File, 2, None)));
        assert_eq!(tree.child_by_name("root", "same").unwrap().id, "f1");
    }

    #[test]
    fn test_size_aggregation() {
        let mut tree = tree_with_root();
        tree.add_child("root", Node::from(entry("a", "a", NodeKind::Folder, 0, None)));
        assert_eq!(tree.size_of("a"), 0); // unpopulated folders count as empty

        tree.set_children(
            "a",
            vec![
                entry("x", "x", NodeKind::File, 10, Some(1)),
                entry("y", "y", NodeKind::File, 20, Some(2)),
            ],
        );
        assert_eq!(tree.size_of("a"), 30);
        assert_eq!(tree.size_of("root"), 30);
    }

    #[test]
    fn test_last_modified_aggregation() {
        let mut tree = tree_with_root();
        tree.add_child("root", Node::from(entry("a", "a", NodeKind::Folder, 0, None)));
        assert_eq!(tree.last_modified_of("a"), None);

        tree.set_children(
            "a",
            vec![
                entry("x", "x", NodeKind::File, 1, Some(7)),
                entry("y", "y", NodeKind::File, 1, None),
                entry("z", "z", NodeKind::File, 1, Some(3)),
            ],
        );
        assert_eq!(tree.last_modified_of("a"), Some(7));
    }

    #[test]
    fn test_set_children_discards_vanished() {
        let mut tree = tree_with_root();
        tree.set_children(
            "root",
            vec![
                entry("a", "a.txt", NodeKind::File, 1, None),
                entry("b", "b.txt", NodeKind::File, 1, None),
            ],
        );
        tree.set_children("root", vec![entry("b", "b.txt", NodeKind::File, 1, None)]);

        assert!(tree.get("a").is_none());
        assert!(tree.get("b").is_some());
    }

    #[test]
    fn test_set_children_keeps_cached_subtrees() {
        let mut tree = tree_with_root();
        tree.add_child("root", Node::from(entry("d", "docs", NodeKind::Folder, 0, None)));
        tree.set_children("d", vec![entry("x", "x", NodeKind::File, 10, None)]);

        tree.set_children("root", vec![entry("d", "docs", NodeKind::Folder, 0, None)]);
        assert_eq!(tree.size_of("d"), 10);
    }

    #[test]
    fn test_path_reconstruction() {
        let mut tree = tree_with_root();
        tree.add_child("root", Node::from(entry("d", "docs", NodeKind::Folder, 0, None)));
        tree.add_child("d", Node::from(entry("f", "a.txt", NodeKind::File, 1, None)));

        assert_eq!(tree.path_of("root").unwrap(), "/");
        assert_eq!(tree.path_of("d").unwrap(), "/docs");
        assert_eq!(tree.path_of("f").unwrap(), "/docs/a.txt");
    }

    #[test]
    fn test_ancestor_walk() {
        let mut tree = tree_with_root();
        tree.add_child("root", Node::from(entry("a", "a", NodeKind::Folder, 0, None)));
        tree.add_child("a", Node::from(entry("b", "b", NodeKind::Folder, 0, None)));

        assert!(tree.is_ancestor_or_self("a", "a"));
        assert!(tree.is_ancestor_or_self("a", "b"));
        assert!(tree.is_ancestor_or_self("root", "b"));
        assert!(!tree.is_ancestor_or_self("b", "a"));
        assert!(!tree.is_ancestor_or_self("missing", "b"));
    }

    #[test]
    fn test_discard_removes_subtree() {
        let mut tree = tree_with_root();
        tree.add_child("root", Node::from(entry("d", "docs", NodeKind::Folder, 0, None)));
        tree.add_child("d", Node::from(entry("f", "a.txt", NodeKind::File, 1, None)));

        tree.remove_child("root", "d");
        tree.discard("d");
        assert!(tree.get("d").is_none());
        assert!(tree.get("f").is_none());
    }
}
