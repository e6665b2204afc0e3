//! # drivefs
//!
//! Path-addressed filesystem client for remote stores that address objects
//! by opaque identifiers and parent links.
//!
//! ## Features
//!
//! - **Path resolution**: POSIX-style paths are translated into remote
//!   object ids through an incrementally built mirror tree, one filtered
//!   remote query per unresolved segment - no full-tree prefetch.
//! - **Filesystem operations**:
//!   - List directories (`readdir`) and get metadata (`stat`).
//!   - Create directories (`mkdir`).
//!   - Read and write file content (`read_file`, `write_file`).
//!   - Rename/move (`rename`), delete (`unlink`), and server-side `copy`.
//!   - Server-side `search` with conjunctive criteria.
//! - **Mirror cache**: resolved nodes are cached so repeated lookups along
//!   the same path issue zero remote calls; listings mark folders as fully
//!   known, while resolution misses cache only the single entry they found.
//! - **Sessions**: `connect()` is idempotent and time-boxed; an expired
//!   session reconnects lazily on the next operation.
//!
//! A `Drive` instance is a single logical thread of control: operations are
//! async and the mirror tree is not protected against concurrent mutation.
//! Callers issuing overlapping operations against overlapping paths on one
//! instance get the remote store's per-call atomicity and nothing more.
//!
//! ## Example
//!
//! ```no_run
//! use drivefs::{Credentials, Drive, DriveConfig};
//!
//! # async fn example() -> drivefs::Result<()> {
//! let config = DriveConfig::new(
//!     "root-folder-id",
//!     Credentials {
//!         endpoint: "https://store.example.com/cmd".to_string(),
//!         token: "secret".to_string(),
//!     },
//! );
//! let mut drive = Drive::new(config);
//! drive.connect().await?;
//!
//! for node in drive.readdir("/").await? {
//!     println!("{} ({} bytes)", node.name, node.size);
//! }
//!
//! drive.mkdir("/reports").await?;
//! drive.write_file("/reports/today.txt", "all good").await?;
//! let text = drive.read_file("/reports/today.txt").await?;
//! assert_eq!(text, "all good");
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod base64;
pub mod config;
pub mod drive;
pub mod error;
pub mod fs;

// Re-export commonly used types
pub use api::{
    CallCounts, HttpStore, ListFilter, MemoryStore, RemoteEntry, RemoteStore, SortOrder,
    StoreErrorCode, UpdatePatch,
};
pub use config::{Credentials, DriveConfig};
pub use drive::Drive;
pub use error::{DriveError, Result};
pub use fs::{Node, NodeKind, SearchQuery, Stat};
