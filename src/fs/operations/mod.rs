//! Filesystem operations split into focused modules.
//!
//! Every public operation resolves through the mirror cache, performs one
//! remote call, then reconciles the mirror with the now-known remote state.

mod browse;
mod dir_ops;
mod file_ops;
mod resolve;
mod utils;

pub use browse::SearchQuery;

use crate::error::DriveError;

/// Wrap a lower-layer failure into an operation-scoped error carrying the
/// original cause message. Taxonomy errors pass through unchanged.
pub(crate) fn annotate(op: &'static str, path: &str, err: DriveError) -> DriveError {
    match err {
        e @ (DriveError::PathNotFound { .. }
        | DriveError::NotADirectory { .. }
        | DriveError::IsADirectory { .. }
        | DriveError::InvalidPath(_)
        | DriveError::InvalidCredentials
        | DriveError::NotInitialized
        | DriveError::Remote { .. }) => e,
        e => DriveError::Remote {
            op,
            path: path.to_string(),
            message: e.to_string(),
        },
    }
}
