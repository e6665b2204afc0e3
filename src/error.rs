//! Error types for the drivefs library.

use thiserror::Error;

/// Main error type for drivefs operations.
#[derive(Error, Debug)]
pub enum DriveError {
    /// No remote entry matches a path segment.
    #[error("path not found: no entry named '{name}' under {parent}")]
    PathNotFound { parent: String, name: String },

    /// Traversal or listing attempted through a file.
    #[error("not a directory: {path}")]
    NotADirectory { path: String },

    /// Content read attempted on a folder.
    #[error("is a directory: {path}")]
    IsADirectory { path: String },

    /// Path is syntactically unusable for the operation (e.g. writing to `/`).
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// Connect-time authentication failure.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Operation attempted before the root node was established.
    #[error("not connected: call connect() first")]
    NotInitialized,

    /// An operation failed against the remote store. Carries the original
    /// cause message, annotated with the operation name and path.
    #[error("{op} {path}: {message}")]
    Remote {
        op: &'static str,
        path: String,
        message: String,
    },

    /// Remote store returned an error code.
    #[error("store error: {code} - {message}")]
    Api { code: i32, message: String },

    /// HTTP request failed with status code.
    #[error("HTTP error: {0}")]
    Http(u16),

    /// Network request error.
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Base64 decoding error.
    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Invalid or unexpected response from the store.
    #[error("invalid response from store")]
    InvalidResponse,
}

/// Result type alias for drivefs operations.
pub type Result<T> = std::result::Result<T, DriveError>;
