//! Path resolution through the mirror cache.

use tracing::debug;

use crate::api::{ListFilter, RemoteStore};
use crate::drive::Drive;
use crate::error::{DriveError, Result};
use crate::fs::Node;

use super::utils::split_segments;

impl<S: RemoteStore> Drive<S> {
    /// Resolve a slash-separated path to the id of its mirror node.
    ///
    /// Walks cached children segment by segment; a miss issues one
    /// exact-name filtered listing against the current folder and caches
    /// only the single resolved entry, so the folder is never marked as
    /// fully listed by resolution alone. Repeated lookups along the same
    /// segments issue no remote calls.
    pub(crate) async fn resolve_id(&mut self, path: &str) -> Result<String> {
        let mut current = match self.tree.root_id() {
            Some(root) => root.to_string(),
            None => return Err(DriveError::NotInitialized),
        };

        for segment in split_segments(path) {
            let containing = self.tree.path_of(&current).unwrap_or_else(|| "/".to_string());
            let (is_dir, cached) = match self.tree.get(&current) {
                Some(node) => (
                    node.is_dir(),
                    self.tree
                        .child_by_name(&current, segment)
                        .map(|child| child.id.clone()),
                ),
                None => return Err(DriveError::InvalidResponse),
            };

            if !is_dir {
                return Err(DriveError::NotADirectory { path: containing });
            }

            if let Some(id) = cached {
                current = id;
                continue;
            }

            debug!(parent = %containing, segment, "resolver cache miss");
            let filter = ListFilter::by_name(segment);
            let mut entries = self.store.list(&current, Some(&filter)).await?;
            if entries.is_empty() {
                return Err(DriveError::PathNotFound {
                    parent: containing,
                    name: segment.to_string(),
                });
            }

            // First match wins; duplicate sibling names resolve
            // implementation-defined, as on the store itself.
            let node = Node::from(entries.remove(0));
            let id = node.id.clone();
            self.tree.add_child(&current, node);
            current = id;
        }

        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testutil::memory_drive;
    use crate::error::DriveError;

    #[tokio::test]
    async fn test_root_resolves_without_remote_calls() {
        let mut drive = memory_drive();
        drive.connect().await.unwrap();
        let calls = drive.store.calls();

        let root = drive.resolve_id("/").await.unwrap();
        assert_eq!(root, "root");
        assert_eq!(drive.resolve_id("").await.unwrap(), "root");
        assert_eq!(drive.resolve_id("///").await.unwrap(), "root");
        assert_eq!(drive.store.calls(), calls);
    }

    #[tokio::test]
    async fn test_repeated_resolution_hits_cache() {
        let mut drive = memory_drive();
        let docs = drive.store.seed_folder("root", "docs");
        let file = drive.store.seed_file(&docs, "a.txt", b"hello");
        drive.connect().await.unwrap();

        let resolved = drive.resolve_id("/docs/a.txt").await.unwrap();
        assert_eq!(resolved, file);
        let after_first = drive.store.calls();
        assert_eq!(after_first.list, 2); // one filtered query per segment

        let resolved_again = drive.resolve_id("/docs/a.txt").await.unwrap();
        assert_eq!(resolved_again, file);
        assert_eq!(drive.store.calls(), after_first); // zero additional calls
    }

    #[tokio::test]
    async fn test_missing_segment_names_containing_path() {
        let mut drive = memory_drive();
        drive.connect().await.unwrap();

        let err = drive.resolve_id("/nonexistent/child").await.unwrap_err();
        match err {
            DriveError::PathNotFound { parent, name } => {
                assert_eq!(parent, "/");
                assert_eq!(name, "nonexistent");
            }
            other => panic!("expected PathNotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_traversal_through_file_fails() {
        let mut drive = memory_drive();
        drive.store.seed_file("root", "file.txt", b"data");
        drive.connect().await.unwrap();

        let err = drive.resolve_id("/file.txt/child").await.unwrap_err();
        match err {
            DriveError::NotADirectory { path } => assert_eq!(path, "/file.txt"),
            other => panic!("expected NotADirectory, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_resolution_does_not_mark_folder_listed() {
        let mut drive = memory_drive();
        let docs = drive.store.seed_folder("root", "docs");
        drive.store.seed_file(&docs, "a.txt", b"a");
        drive.store.seed_file(&docs, "b.txt", b"b");
        drive.connect().await.unwrap();

        drive.resolve_id("/docs/a.txt").await.unwrap();
        // Only the resolved entry is cached; a full readdir still lists.
        let entries = drive.readdir("/docs").await.unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[tokio::test]
    async fn test_resolution_before_connect_fails() {
        let mut drive = memory_drive();
        let err = drive.resolve_id("/anything").await.unwrap_err();
        assert!(matches!(err, DriveError::NotInitialized));
    }
}
