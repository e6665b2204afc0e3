//! Mirror tree and filesystem operations.

pub(crate) mod node;
pub(crate) mod operations;
pub(crate) mod tree;

pub use node::{Node, NodeKind, Stat};
pub use operations::SearchQuery;
