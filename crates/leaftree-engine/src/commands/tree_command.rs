//! Mutating commands

use leaftree_core::{NodeKind, Result};
use serde::Serialize;

use crate::service::{EnsurePathResult, RebuildReport, TreeService};

/// Mutations supported by the tree service
///
/// `parent_id: None` always means the root.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeCommand {
    CreateNode {
        parent_id: Option<String>,
        title: String,
        slug: String,
        kind: NodeKind,
    },
    /// Replace title and slug; `content` replaces the body when present
    UpdateNode {
        node_id: String,
        title: String,
        slug: String,
        content: Option<String>,
    },
    MoveNode {
        node_id: String,
        parent_id: Option<String>,
    },
    DeleteNode {
        node_id: String,
        recursive: bool,
    },
    SortChildren {
        parent_id: Option<String>,
        ordered_ids: Vec<String>,
    },
    ConvertNode {
        node_id: String,
        kind: NodeKind,
    },
    EnsurePath {
        path: String,
        title: String,
        kind: NodeKind,
    },
    /// Rebuild the tree from the content directory
    Rebuild,
}

/// Result of applying a `TreeCommand`
///
/// Every variant carries the hash of the tree as the mutation saved it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum TreeCommandResult {
    Created { node_id: String, tree_hash: String },
    Updated { node_id: String, tree_hash: String },
    Moved { node_id: String, tree_hash: String },
    Deleted { node_id: String, tree_hash: String },
    Sorted { parent_id: String, tree_hash: String },
    Converted { node_id: String, tree_hash: String },
    Ensured {
        #[serde(flatten)]
        outcome: EnsurePathResult,
        tree_hash: String,
    },
    Rebuilt {
        #[serde(flatten)]
        report: RebuildReport,
        tree_hash: String,
    },
}

impl TreeCommandResult {
    pub fn tree_hash(&self) -> &str {
        match self {
            TreeCommandResult::Created { tree_hash, .. }
            | TreeCommandResult::Updated { tree_hash, .. }
            | TreeCommandResult::Moved { tree_hash, .. }
            | TreeCommandResult::Deleted { tree_hash, .. }
            | TreeCommandResult::Sorted { tree_hash, .. }
            | TreeCommandResult::Converted { tree_hash, .. }
            | TreeCommandResult::Ensured { tree_hash, .. }
            | TreeCommandResult::Rebuilt { tree_hash, .. } => tree_hash,
        }
    }
}

/// Apply a command as `user_id`
///
/// The returned hash is taken under the same write lock as the mutation,
/// so it never reflects another writer's change.
pub fn apply_command(
    service: &TreeService,
    user_id: &str,
    cmd: TreeCommand,
) -> Result<TreeCommandResult> {
    match cmd {
        TreeCommand::CreateNode {
            parent_id,
            title,
            slug,
            kind,
        } => {
            let (node_id, tree_hash) =
                service.create_node_with_hash(user_id, parent_id.as_deref(), &title, &slug, kind)?;
            Ok(TreeCommandResult::Created { node_id, tree_hash })
        }
        TreeCommand::UpdateNode {
            node_id,
            title,
            slug,
            content,
        } => {
            let tree_hash =
                service.update_node_with_hash(user_id, &node_id, &title, &slug, content.as_deref())?;
            Ok(TreeCommandResult::Updated { node_id, tree_hash })
        }
        TreeCommand::MoveNode { node_id, parent_id } => {
            let tree_hash = service.move_node_with_hash(user_id, &node_id, parent_id.as_deref())?;
            Ok(TreeCommandResult::Moved { node_id, tree_hash })
        }
        TreeCommand::DeleteNode { node_id, recursive } => {
            let tree_hash = service.delete_node_with_hash(user_id, &node_id, recursive)?;
            Ok(TreeCommandResult::Deleted { node_id, tree_hash })
        }
        TreeCommand::SortChildren {
            parent_id,
            ordered_ids,
        } => {
            let tree_hash = service.sort_children_with_hash(parent_id.as_deref(), &ordered_ids)?;
            Ok(TreeCommandResult::Sorted {
                parent_id: leaftree_core::Tree::resolve_parent_id(parent_id.as_deref()).to_string(),
                tree_hash,
            })
        }
        TreeCommand::ConvertNode { node_id, kind } => {
            let tree_hash = service.convert_node_with_hash(user_id, &node_id, kind)?;
            Ok(TreeCommandResult::Converted { node_id, tree_hash })
        }
        TreeCommand::EnsurePath { path, title, kind } => {
            let (outcome, tree_hash) = service.ensure_path_with_hash(user_id, &path, &title, kind)?;
            Ok(TreeCommandResult::Ensured { outcome, tree_hash })
        }
        TreeCommand::Rebuild => {
            let (report, tree_hash) = service.reconstruct_from_fs_with_hash()?;
            Ok(TreeCommandResult::Rebuilt { report, tree_hash })
        }
    }
}
