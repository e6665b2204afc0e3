//! File content operations.

use crate::api::{ListFilter, RemoteStore, UpdatePatch};
use crate::drive::Drive;
use crate::error::{DriveError, Result};
use crate::fs::Node;
use crate::fs::node::NodeKind;

use super::annotate;
use super::utils::split_parent;

impl<S: RemoteStore> Drive<S> {
    /// Write a file, creating it or updating a same-named sibling in place.
    ///
    /// Existence is probed against the cache first, then via a name-filtered
    /// query on the parent. When a sibling exists its content is replaced
    /// under the same id; otherwise a new entry is created.
    pub async fn write_file(&mut self, path: &str, content: impl AsRef<[u8]>) -> Result<Node> {
        self.ensure_connected().await?;
        self.write_file_inner(path, content.as_ref())
            .await
            .map_err(|e| annotate("write_file", path, e))
    }

    async fn write_file_inner(&mut self, path: &str, content: &[u8]) -> Result<Node> {
        let (parent_path, name) = split_parent(path)?;
        let parent = self.resolve_parent_dir(&parent_path).await?;

        let mut existing = self
            .tree
            .child_by_name(&parent, name)
            .map(|node| node.id.clone());
        if existing.is_none() {
            let filter = ListFilter::by_name(name);
            let entries = self.store.list(&parent, Some(&filter)).await?;
            if let Some(entry) = entries.into_iter().next() {
                let node = Node::from(entry);
                let id = node.id.clone();
                self.tree.add_child(&parent, node);
                existing = Some(id);
            }
        }

        let id = match existing {
            Some(id) => {
                if self.tree.get(&id).is_some_and(|n| n.is_dir()) {
                    return Err(DriveError::IsADirectory {
                        path: self.tree.path_of(&id).unwrap_or_else(|| path.to_string()),
                    });
                }
                let patch = UpdatePatch::content(content.to_vec());
                let entry = self.store.update(&id, &patch).await?;
                if let Some(node) = self.tree.get_mut(&id) {
                    node.size = entry.size;
                    node.modified_at = entry.modified_at;
                }
                id
            }
            None => {
                let entry = self
                    .store
                    .create(&parent, name, NodeKind::File, Some(content.to_vec()))
                    .await?;
                let node = Node::from(entry);
                let id = node.id.clone();
                self.tree.add_child(&parent, node);
                id
            }
        };

        self.tree.get(&id).cloned().ok_or(DriveError::InvalidResponse)
    }

    /// Read a file's content as text.
    pub async fn read_file(&mut self, path: &str) -> Result<String> {
        self.ensure_connected().await?;
        self.read_file_inner(path)
            .await
            .map_err(|e| annotate("read_file", path, e))
    }

    async fn read_file_inner(&mut self, path: &str) -> Result<String> {
        let id = self.resolve_id(path).await?;
        match self.tree.get(&id) {
            Some(node) if node.is_file() => {}
            Some(_) => {
                return Err(DriveError::IsADirectory {
                    path: self.tree.path_of(&id).unwrap_or_else(|| path.to_string()),
                });
            }
            None => return Err(DriveError::InvalidResponse),
        }
        self.store.download(&id).await
    }
}

#[cfg(test)]
mod tests {
    use super::super::testutil::memory_drive;
    use super::*;

    #[tokio::test]
    async fn test_write_then_read() {
        let mut drive = memory_drive();
        drive.connect().await.unwrap();

        let node = drive.write_file("/notes.txt", "hello").await.unwrap();
        assert!(node.is_file());
        assert_eq!(node.size, 5);
        assert_eq!(drive.read_file("/notes.txt").await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_write_updates_in_place() {
        let mut drive = memory_drive();
        drive.store.seed_file("root", "notes.txt", b"old");
        drive.connect().await.unwrap();

        let before = drive.resolve_id("/notes.txt").await.unwrap();
        let written = drive.write_file("/notes.txt", "new content").await.unwrap();

        // Same id: update in place, not a duplicate sibling.
        assert_eq!(written.id, before);
        assert_eq!(drive.store.calls().create, 0);
        assert_eq!(drive.read_file("/notes.txt").await.unwrap(), "new content");
        assert_eq!(drive.readdir("/").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_write_probes_remote_for_uncached_sibling() {
        let mut drive = memory_drive();
        drive.store.seed_file("root", "notes.txt", b"old");
        drive.connect().await.unwrap();

        // Nothing cached under the root yet; the probe must hit the store.
        drive.write_file("/notes.txt", "updated").await.unwrap();
        assert_eq!(drive.store.calls().create, 0);
        assert_eq!(drive.store.calls().update, 1);
    }

    #[tokio::test]
    async fn test_write_onto_folder_fails() {
        let mut drive = memory_drive();
        drive.store.seed_folder("root", "docs");
        drive.connect().await.unwrap();

        let err = drive.write_file("/docs", "payload").await.unwrap_err();
        assert!(matches!(err, DriveError::IsADirectory { .. }));
        // The folder was left untouched.
        assert_eq!(drive.store.calls().update, 0);
        assert!(drive.stat("/docs").await.unwrap().is_directory);
    }

    #[tokio::test]
    async fn test_read_folder_fails() {
        let mut drive = memory_drive();
        drive.store.seed_folder("root", "docs");
        drive.connect().await.unwrap();

        let err = drive.read_file("/docs").await.unwrap_err();
        assert!(matches!(err, DriveError::IsADirectory { .. }));
    }

    #[tokio::test]
    async fn test_write_to_root_path_is_invalid() {
        let mut drive = memory_drive();
        drive.connect().await.unwrap();
        assert!(matches!(
            drive.write_file("/", "x").await.unwrap_err(),
            DriveError::InvalidPath(_)
        ));
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let mut drive = memory_drive();
        drive.connect().await.unwrap();
        assert!(matches!(
            drive.read_file("/absent.txt").await.unwrap_err(),
            DriveError::PathNotFound { .. }
        ));
    }
}
