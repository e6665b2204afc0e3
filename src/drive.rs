//! The drive client: session state and the mirror tree owner.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::api::{HttpStore, RemoteStore, StoreErrorCode};
use crate::config::DriveConfig;
use crate::error::{DriveError, Result};
use crate::fs::Node;
use crate::fs::tree::MirrorTree;

/// Default session time-box before a lazy reconnect.
const SESSION_TTL: Duration = Duration::from_secs(30 * 60);

/// Path-addressed client over an id-addressed remote store.
///
/// One instance is a single logical thread of control: operations are async
/// and take `&mut self`, and the mirror tree carries no locks. Overlapping
/// operations on clones of the same remote state are not reconciled - the
/// store's per-call atomicity is the only consistency guarantee.
pub struct Drive<S = HttpStore> {
    pub(crate) config: DriveConfig,
    pub(crate) store: S,
    pub(crate) tree: MirrorTree,
    connected_at: Option<Instant>,
    session_ttl: Duration,
}

impl Drive<HttpStore> {
    /// Create a client backed by the HTTP store.
    pub fn new(config: DriveConfig) -> Self {
        let store = HttpStore::new(&config.credentials);
        Self::with_store(config, store)
    }
}

impl<S: RemoteStore> Drive<S> {
    /// Create a client over an arbitrary store implementation.
    pub fn with_store(config: DriveConfig, store: S) -> Self {
        Self {
            config,
            store,
            tree: MirrorTree::default(),
            connected_at: None,
            session_ttl: SESSION_TTL,
        }
    }

    /// Establish the session by fetching the configured root folder and
    /// seeding the mirror tree with it (children unknown).
    ///
    /// Idempotent: calling again refreshes the root and resets the session
    /// clock, discarding all cached nodes.
    pub async fn connect(&mut self) -> Result<()> {
        let root_id = self.config.root_id.clone();
        let entry = self.store.get(&root_id).await.map_err(|e| match e {
            DriveError::InvalidCredentials => DriveError::InvalidCredentials,
            DriveError::Api { code, .. }
                if matches!(
                    StoreErrorCode::from(i64::from(code)),
                    StoreErrorCode::Expired | StoreErrorCode::AccessDenied
                ) =>
            {
                DriveError::InvalidCredentials
            }
            e => DriveError::Remote {
                op: "connect",
                path: "/".to_string(),
                message: e.to_string(),
            },
        })?;

        if !matches!(entry.kind, crate::fs::NodeKind::Folder) {
            return Err(DriveError::NotADirectory {
                path: "/".to_string(),
            });
        }

        self.tree.seed_root(Node::from(entry));
        self.connected_at = Some(Instant::now());
        info!(root = %root_id, "connected to remote store");
        Ok(())
    }

    /// Reconnect transparently when the session time-box has elapsed.
    ///
    /// Fails with `NotInitialized` if `connect()` was never called.
    pub(crate) async fn ensure_connected(&mut self) -> Result<()> {
        match self.connected_at {
            None => Err(DriveError::NotInitialized),
            Some(at) if at.elapsed() > self.session_ttl => {
                debug!("session expired, reconnecting");
                self.connect().await
            }
            Some(_) => Ok(()),
        }
    }

    /// Override the session time-box (default 30 minutes).
    pub fn set_session_ttl(&mut self, ttl: Duration) {
        self.session_ttl = ttl;
    }

    /// Identifier of the mounted root folder.
    pub fn root_id(&self) -> Option<&str> {
        self.tree.root_id()
    }

    /// Full cached path of a node id, if the node is in the mirror.
    pub fn path_of(&self, id: &str) -> Option<String> {
        self.tree.path_of(id)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::api::StoreErrorCode;
    use crate::error::DriveError;
    use crate::fs::operations::testutil::memory_drive;

    #[tokio::test]
    async fn test_connect_seeds_root() {
        let mut drive = memory_drive();
        assert!(drive.root_id().is_none());

        drive.connect().await.unwrap();
        assert_eq!(drive.root_id(), Some("root"));
        assert_eq!(drive.path_of("root").unwrap(), "/");
        assert_eq!(drive.store.calls().get, 1);
    }

    #[tokio::test]
    async fn test_connect_missing_root() {
        let mut drive = memory_drive();
        drive.config.root_id = "bogus".to_string();

        let err = drive.connect().await.unwrap_err();
        assert!(matches!(err, DriveError::Remote { op: "connect", .. }));
    }

    #[tokio::test]
    async fn test_connect_expired_session_code_is_invalid_credentials() {
        let mut drive = memory_drive();
        drive.store.deny_with(StoreErrorCode::Expired);
        assert!(matches!(
            drive.connect().await.unwrap_err(),
            DriveError::InvalidCredentials
        ));
    }

    #[tokio::test]
    async fn test_connect_access_denied_code_is_invalid_credentials() {
        let mut drive = memory_drive();
        drive.store.deny_with(StoreErrorCode::AccessDenied);
        assert!(matches!(
            drive.connect().await.unwrap_err(),
            DriveError::InvalidCredentials
        ));

        // Other codes stay wrapped as remote failures.
        drive.store.deny_with(StoreErrorCode::Internal);
        assert!(matches!(
            drive.connect().await.unwrap_err(),
            DriveError::Remote { op: "connect", .. }
        ));
    }

    #[tokio::test]
    async fn test_operation_before_connect_fails() {
        let mut drive = memory_drive();
        assert!(matches!(
            drive.readdir("/").await.unwrap_err(),
            DriveError::NotInitialized
        ));
    }

    #[tokio::test]
    async fn test_expired_session_reconnects_lazily() {
        let mut drive = memory_drive();
        drive.connect().await.unwrap();
        drive.set_session_ttl(Duration::ZERO);

        drive.readdir("/").await.unwrap();
        // The time-boxed session forced a second root fetch.
        assert_eq!(drive.store.calls().get, 2);
    }

    #[tokio::test]
    async fn test_reconnect_discards_cache() {
        let mut drive = memory_drive();
        let docs = drive.store.seed_folder("root", "docs");
        drive.store.seed_file(&docs, "a.txt", &[0u8; 10]);
        drive.connect().await.unwrap();
        drive.readdir("/docs").await.unwrap();
        assert_eq!(drive.stat("/docs").await.unwrap().size, 10);

        drive.connect().await.unwrap();
        // Cached listings are gone; the folder is unknown again.
        assert_eq!(drive.stat("/docs").await.unwrap().size, 0);
    }
}
