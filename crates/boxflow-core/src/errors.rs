//! Error types for the boxflow engine.

use thiserror::Error;

/// Errors raised while building or ticking a layout tree.
///
/// None of these are fatal to the rest of the tree: a node that fails to
/// initialize stays inert and its siblings keep laying out.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("No layout root found above node {node}")]
    NoScheduler { node: u64 },

    #[error("Hit max search depth ({max_depth}) looking for a layout root above node {node}")]
    MaxDepthExceeded { node: u64, max_depth: usize },

    #[error("Unknown node {node}")]
    NodeNotFound { node: u64 },

    #[error("Node {node} is already in the scene")]
    DuplicateNode { node: u64 },

    #[error("Node {node} is not a layout root")]
    NotAScheduler { node: u64 },

    #[error("Node {node} is not a box")]
    NotABox { node: u64 },

    #[error("Failed to remove node {node} from its layout root (not found)")]
    NotRegistered { node: u64 },

    #[error("Node {node} is already registered with its layout root")]
    AlreadyRegistered { node: u64 },

    #[error("Node {node} already carries a {existing} role")]
    RoleConflict { node: u64, existing: &'static str },

    #[error("Property {property} of node {node} is driven by layout")]
    DrivenProperty { node: u64, property: &'static str },
}
