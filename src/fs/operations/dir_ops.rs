//! Directory and node mutation operations.

use crate::api::{RemoteStore, UpdatePatch};
use crate::drive::Drive;
use crate::error::{DriveError, Result};
use crate::fs::Node;
use crate::fs::node::NodeKind;

use super::annotate;
use super::utils::split_parent;

impl<S: RemoteStore> Drive<S> {
    /// Create a new directory.
    pub async fn mkdir(&mut self, path: &str) -> Result<Node> {
        self.ensure_connected().await?;
        self.mkdir_inner(path)
            .await
            .map_err(|e| annotate("mkdir", path, e))
    }

    async fn mkdir_inner(&mut self, path: &str) -> Result<Node> {
        let (parent_path, name) = split_parent(path)?;
        let parent = self.resolve_parent_dir(&parent_path).await?;

        let entry = self.store.create(&parent, name, NodeKind::Folder, None).await?;
        let node = Node::from(entry);
        let id = node.id.clone();
        self.tree.add_child(&parent, node);
        self.tree.get(&id).cloned().ok_or(DriveError::InvalidResponse)
    }

    /// Remove a file or directory.
    pub async fn unlink(&mut self, path: &str) -> Result<()> {
        self.ensure_connected().await?;
        self.unlink_inner(path)
            .await
            .map_err(|e| annotate("unlink", path, e))
    }

    async fn unlink_inner(&mut self, path: &str) -> Result<()> {
        let id = self.resolve_id(path).await?;
        let parent = match self.tree.get(&id).and_then(|n| n.parent.clone()) {
            Some(parent) => parent,
            None => {
                return Err(DriveError::InvalidPath(
                    "cannot unlink the root".to_string(),
                ));
            }
        };

        self.store.delete(&id).await?;

        self.tree.remove_child(&parent, &id);
        self.tree.discard(&id);
        Ok(())
    }

    /// Rename and/or move a file or directory.
    ///
    /// The name change and the re-parenting travel in a single update so
    /// the store applies them atomically. The node's id is unchanged.
    pub async fn rename(&mut self, old_path: &str, new_path: &str) -> Result<Node> {
        self.ensure_connected().await?;
        self.rename_inner(old_path, new_path)
            .await
            .map_err(|e| annotate("rename", old_path, e))
    }

    async fn rename_inner(&mut self, old_path: &str, new_path: &str) -> Result<Node> {
        let id = self.resolve_id(old_path).await?;
        let old_parent = match self.tree.get(&id).and_then(|n| n.parent.clone()) {
            Some(parent) => parent,
            None => {
                return Err(DriveError::InvalidPath(
                    "cannot rename the root".to_string(),
                ));
            }
        };

        let (new_parent_path, new_name) = split_parent(new_path)?;
        let new_parent = self.resolve_parent_dir(&new_parent_path).await?;

        // Re-parenting under the node itself or a descendant would put a
        // cycle on the parent links.
        if self.tree.is_ancestor_or_self(&id, &new_parent) {
            return Err(DriveError::InvalidPath(
                "cannot move a node into its own subtree".to_string(),
            ));
        }

        let mut patch = UpdatePatch {
            name: Some(new_name.to_string()),
            ..UpdatePatch::default()
        };
        if new_parent != old_parent {
            patch.add_parent = Some(new_parent.clone());
            patch.remove_parent = Some(old_parent.clone());
        }
        let entry = self.store.update(&id, &patch).await?;

        self.tree.remove_child(&old_parent, &id);
        if let Some(node) = self.tree.get_mut(&id) {
            node.name = entry.name;
            node.modified_at = entry.modified_at;
        }
        self.tree.reattach(&new_parent, &id);
        self.tree.get(&id).cloned().ok_or(DriveError::InvalidResponse)
    }

    /// Server-side copy to a new path, yielding a fresh id.
    pub async fn copy(&mut self, source_path: &str, dest_path: &str) -> Result<Node> {
        self.ensure_connected().await?;
        self.copy_inner(source_path, dest_path)
            .await
            .map_err(|e| annotate("copy", source_path, e))
    }

    async fn copy_inner(&mut self, source_path: &str, dest_path: &str) -> Result<Node> {
        let source = self.resolve_id(source_path).await?;
        let (dest_parent_path, new_name) = split_parent(dest_path)?;
        let dest_parent = self.resolve_parent_dir(&dest_parent_path).await?;

        let entry = self.store.copy(&source, &dest_parent, new_name).await?;
        let node = Node::from(entry);
        let id = node.id.clone();
        self.tree.add_child(&dest_parent, node);
        self.tree.get(&id).cloned().ok_or(DriveError::InvalidResponse)
    }

    /// Resolve a path and require it to be a folder.
    pub(crate) async fn resolve_parent_dir(&mut self, path: &str) -> Result<String> {
        let id = self.resolve_id(path).await?;
        match self.tree.get(&id) {
            Some(node) if node.is_dir() => Ok(id),
            Some(_) => Err(DriveError::NotADirectory {
                path: self.tree.path_of(&id).unwrap_or_else(|| path.to_string()),
            }),
            None => Err(DriveError::InvalidResponse),
        }
    }
}
