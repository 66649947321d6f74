//! In-memory structural mutations of a `Tree`
//!
//! These functions only touch the arena. Mirroring changes onto disk is the
//! node store's job and happens before any of these is called, so a failed
//! filesystem step leaves the tree untouched.

use uuid::Uuid;

use crate::errors::{Result, TreeError};
use crate::model::{Node, NodeKind, Tree, ROOT_ID};
use crate::rules::validation::{validate_move, validate_slug_available, validate_sort_order};

/// Fresh, time-ordered node id
pub fn new_node_id() -> String {
    Uuid::now_v7().to_string()
}

/// Append `node` as the last child of `parent_id`
///
/// The node's `position` and `parent_id` are overwritten.
///
/// # Errors
/// * `ParentNotFound` if the parent does not exist
/// * `InvalidOperation` if the parent is not a section
/// * `DuplicateSlug` if a sibling already uses the slug
pub fn attach_child(tree: &mut Tree, parent_id: &str, mut node: Node) -> Result<()> {
    let parent = tree.get_parent(parent_id)?;
    if !parent.is_section() {
        return Err(TreeError::invalid_op(
            "attach_child",
            format!("parent '{}' is a {} and cannot hold children", parent_id, parent.kind),
        ));
    }
    if tree.contains(&node.id) {
        return Err(TreeError::InvariantViolation {
            reason: format!("node id '{}' already present", node.id),
        });
    }
    validate_slug_available(tree, parent_id, &node.slug, None)?;

    node.position = parent.children.len();
    node.parent_id = Some(parent_id.to_string());
    let id = node.id.clone();
    tree.insert(node);
    tree.get_mut(parent_id)?.children.push(id);
    Ok(())
}

/// Unlink `node_id` from its parent and renumber the remaining siblings
///
/// The node stays in the arena. Returns the former parent id.
pub fn detach_child(tree: &mut Tree, node_id: &str) -> Result<String> {
    if node_id == ROOT_ID {
        return Err(TreeError::invalid_op("detach_child", "the root has no parent"));
    }
    let parent_id = tree
        .get(node_id)?
        .parent_id
        .clone()
        .ok_or_else(|| TreeError::InvariantViolation {
            reason: format!("node '{}' has no parent", node_id),
        })?;

    tree.get_mut(&parent_id)?.children.retain(|id| id != node_id);
    reindex_positions(tree, &parent_id)?;
    tree.get_mut(node_id)?.parent_id = None;
    Ok(parent_id)
}

/// Move `node_id` to the end of `new_parent_id`'s children
///
/// Both the old and the new sibling lists are renumbered.
pub fn reparent(tree: &mut Tree, node_id: &str, new_parent_id: &str) -> Result<()> {
    validate_move(tree, node_id, new_parent_id)?;

    detach_child(tree, node_id)?;
    let position = tree.get(new_parent_id)?.children.len();
    {
        let node = tree.get_mut(node_id)?;
        node.parent_id = Some(new_parent_id.to_string());
        node.position = position;
    }
    tree.get_mut(new_parent_id)?
        .children
        .push(node_id.to_string());
    Ok(())
}

/// Set each child's position to its index in the parent's child list
pub fn reindex_positions(tree: &mut Tree, parent_id: &str) -> Result<()> {
    let children = tree.get(parent_id)?.children.clone();
    for (index, child_id) in children.iter().enumerate() {
        tree.get_mut(child_id)?.position = index;
    }
    Ok(())
}

/// Reorder `parent_id`'s children to match `ordered_ids`
pub fn apply_sort_order(tree: &mut Tree, parent_id: &str, ordered_ids: &[String]) -> Result<()> {
    validate_sort_order(tree, parent_id, ordered_ids)?;
    tree.get_mut(parent_id)?.children = ordered_ids.to_vec();
    reindex_positions(tree, parent_id)
}

/// Remove `node_id` and all of its descendants from the tree
///
/// Returns the removed nodes in pre-order.
pub fn remove_subtree(tree: &mut Tree, node_id: &str) -> Result<Vec<Node>> {
    let ids = tree.subtree_ids(node_id)?;
    detach_child(tree, node_id)?;
    Ok(ids.iter().filter_map(|id| tree.remove(id)).collect())
}

/// Change a node's title and slug
pub fn rename_node(tree: &mut Tree, node_id: &str, title: &str, slug: &str) -> Result<()> {
    if node_id == ROOT_ID {
        return Err(TreeError::invalid_op("rename_node", "the root cannot be renamed"));
    }
    let parent_id = tree.get(node_id)?.parent_id.clone();
    if let Some(parent_id) = parent_id.as_deref() {
        validate_slug_available(tree, parent_id, slug, Some(node_id))?;
    }
    let node = tree.get_mut(node_id)?;
    node.title = title.to_string();
    node.slug = slug.to_string();
    Ok(())
}

/// Change a node's kind
///
/// A node with children can only ever be a section.
pub fn set_kind(tree: &mut Tree, node_id: &str, kind: NodeKind) -> Result<()> {
    if node_id == ROOT_ID {
        return Err(TreeError::invalid_op("set_kind", "the root is always a section"));
    }
    let node = tree.get_mut(node_id)?;
    if kind != NodeKind::Section && node.has_children() {
        return Err(TreeError::ConversionNotAllowed {
            from: node.kind,
            to: kind,
            reason: format!("node has {} children", node.children.len()),
        });
    }
    node.kind = kind;
    Ok(())
}
