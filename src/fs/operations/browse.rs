//! Directory listing, metadata and search.

use crate::api::{ListFilter, RemoteStore, SortOrder};
use crate::drive::Drive;
use crate::error::{DriveError, Result};
use crate::fs::node::{Node, NodeKind, Stat};

use super::annotate;

/// Conjunctive search criteria, applied server-side within one folder.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
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
    /// Maximum number of results.
    pub limit: Option<usize>,
}

impl SearchQuery {
    /// Match names containing the given substring.
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name_contains: Some(name.into()),
            ..Self::default()
        }
    }

    fn to_filter(&self) -> ListFilter {
        ListFilter {
            name_exact: None,
            name_contains: self.name_contains.clone(),
            kind: self.kind,
            min_size: self.min_size,
            max_size: self.max_size,
            modified_after: self.modified_after,
            modified_before: self.modified_before,
            order: SortOrder::ModifiedDesc,
            limit: self.limit,
        }
    }
}

impl<S: RemoteStore> Drive<S> {
    /// List a directory.
    ///
    /// Always issues a listing call and replaces the folder's cached child
    /// set with the result, marking it fully listed.
    pub async fn readdir(&mut self, path: &str) -> Result<Vec<Node>> {
        self.ensure_connected().await?;
        self.readdir_inner(path)
            .await
            .map_err(|e| annotate("readdir", path, e))
    }

    async fn readdir_inner(&mut self, path: &str) -> Result<Vec<Node>> {
        let id = self.resolve_id(path).await?;
        match self.tree.get(&id) {
            Some(node) if node.is_dir() => {}
            Some(_) => {
                return Err(DriveError::NotADirectory {
                    path: self.tree.path_of(&id).unwrap_or_else(|| path.to_string()),
                });
            }
            None => return Err(DriveError::InvalidResponse),
        }

        let entries = self.store.list(&id, None).await?;
        self.tree.set_children(&id, entries);

        let ids: Vec<String> = self
            .tree
            .get(&id)
            .and_then(|n| n.children.ids())
            .map(|ids| ids.to_vec())
            .unwrap_or_default();
        Ok(ids
            .iter()
            .filter_map(|child| self.tree.get(child))
            .cloned()
            .collect())
    }

    /// Get metadata for a path, derived entirely from the cached node.
    ///
    /// Folder size and mtime aggregate over cached descendants only;
    /// subtrees that were never listed count as empty.
    pub async fn stat(&mut self, path: &str) -> Result<Stat> {
        self.ensure_connected().await?;
        let id = self
            .resolve_id(path)
            .await
            .map_err(|e| annotate("stat", path, e))?;
        let node = self.tree.get(&id).ok_or(DriveError::InvalidResponse)?;
        Ok(Stat {
            is_directory: node.is_dir(),
            is_file: node.is_file(),
            size: self.tree.size_of(&id),
            mtime: self.tree.last_modified_of(&id),
            ctime: node.created_at,
        })
    }

    /// Search within a folder, server-side, ordered by modification time
    /// descending by default.
    ///
    /// Results are fresh nodes and are NOT merged into the mirror tree.
    pub async fn search(&mut self, query: &SearchQuery, path: &str) -> Result<Vec<Node>> {
        self.ensure_connected().await?;
        self.search_inner(query, path)
            .await
            .map_err(|e| annotate("search", path, e))
    }

    async fn search_inner(&mut self, query: &SearchQuery, path: &str) -> Result<Vec<Node>> {
        let scope = self.resolve_id(path).await?;
        match self.tree.get(&scope) {
            Some(node) if node.is_dir() => {}
            Some(_) => {
                return Err(DriveError::NotADirectory {
                    path: self.tree.path_of(&scope).unwrap_or_else(|| path.to_string()),
                });
            }
            None => return Err(DriveError::InvalidResponse),
        }

        let entries = self.store.list(&scope, Some(&query.to_filter())).await?;
        Ok(entries.into_iter().map(Node::from).collect())
    }
}
