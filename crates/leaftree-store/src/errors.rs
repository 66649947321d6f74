//! Error helpers for leaftree-store
//!
//! The store reports failures as `leaftree_core::TreeError` so callers see
//! the same typed errors whether a precondition failed in memory or on disk.

use std::path::Path;

use leaftree_core::log_drift;
use leaftree_core::{NodeKind, TreeError};

/// Result type alias using TreeError
pub type Result<T> = leaftree_core::Result<T>;

/// Create an IO error for `operation` on `path`
pub fn io_error(operation: &str, path: &Path, err: std::io::Error) -> TreeError {
    TreeError::Io {
        op: operation.to_string(),
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

/// Create a drift error and report it
pub fn drift(node_id: &str, kind: NodeKind, path: &Path, reason: &str) -> TreeError {
    log_drift!(node_id, path.display(), reason);
    TreeError::Drift {
        node_id: node_id.to_string(),
        kind,
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

/// Create a collision error for an occupied destination
pub fn already_exists(path: &Path) -> TreeError {
    TreeError::AlreadyExists {
        path: path.display().to_string(),
    }
}

/// Create an invalid-operation error
pub fn invalid_op(operation: &str, reason: impl Into<String>) -> TreeError {
    TreeError::invalid_op(operation, reason)
}

/// Create the error for a node whose kind is neither page nor section
pub fn unknown_kind(operation: &str, node_id: &str, kind: NodeKind) -> TreeError {
    TreeError::invalid_op(
        operation,
        format!("node '{}' has unknown kind '{}'", node_id, kind),
    )
}
