//! Path splitting helpers.

use crate::error::{DriveError, Result};

/// Split a path into its non-empty segments. `/`, the empty string and
/// trailing slashes all denote the root (no segments).
pub(crate) fn split_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Decompose a path into (parent path, leaf name). Fails for the root,
/// which has no leaf.
pub(crate) fn split_parent(path: &str) -> Result<(String, &str)> {
    let segments = split_segments(path);
    match segments.split_last() {
        Some((leaf, ancestors)) => Ok((format!("/{}", ancestors.join("/")), *leaf)),
        None => Err(DriveError::InvalidPath(format!(
            "'{}' has no leaf name",
            path
        ))),
    }
}
