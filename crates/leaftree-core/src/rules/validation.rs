use std::collections::HashSet;

use crate::errors::{Result, TreeError};
use crate::model::{Tree, ROOT_ID};
use crate::traversal::is_descendant;

use super::invariants;

/// Check every structural invariant, failing on the first violation
///
/// For exhaustive reporting call the functions in `invariants` directly.
pub fn validate_tree(tree: &Tree) -> Result<()> {
    let root = tree.root()?;
    if !root.is_section() || root.parent_id.is_some() {
        return Err(TreeError::InvariantViolation {
            reason: "root must be a parentless section".to_string(),
        });
    }

    if let Some((child_id, parent_id)) = invariants::find_parent_link_mismatches(tree).first() {
        return Err(TreeError::InvariantViolation {
            reason: format!(
                "child '{}' listed under '{}' has a different parent",
                child_id, parent_id
            ),
        });
    }

    if let Some(id) = invariants::find_unreachable_nodes(tree).first() {
        return Err(TreeError::InvariantViolation {
            reason: format!("node '{}' is not reachable from the root", id),
        });
    }

    if let Some((parent_id, slug)) = invariants::find_duplicate_sibling_slugs(tree).first() {
        return Err(TreeError::DuplicateSlug {
            parent_id: parent_id.clone(),
            slug: slug.clone(),
        });
    }

    if let Some(parent_id) = invariants::find_non_contiguous_positions(tree).first() {
        return Err(TreeError::InvariantViolation {
            reason: format!("children of '{}' have non-contiguous positions", parent_id),
        });
    }

    if let Some(id) = invariants::find_children_under_non_sections(tree).first() {
        return Err(TreeError::InvariantViolation {
            reason: format!("non-section node '{}' has children", id),
        });
    }

    Ok(())
}

/// Fail with `DuplicateSlug` if another child of `parent_id` already uses `slug`
///
/// `exclude_id` is the node being renamed or moved, which may keep its own slug.
pub fn validate_slug_available(
    tree: &Tree,
    parent_id: &str,
    slug: &str,
    exclude_id: Option<&str>,
) -> Result<()> {
    match tree.child_by_slug(parent_id, slug) {
        Some(existing) if Some(existing.id.as_str()) != exclude_id => {
            Err(TreeError::DuplicateSlug {
                parent_id: parent_id.to_string(),
                slug: slug.to_string(),
            })
        }
        _ => Ok(()),
    }
}

/// Check that `ordered_ids` is exactly a permutation of `parent_id`'s children
pub fn validate_sort_order(tree: &Tree, parent_id: &str, ordered_ids: &[String]) -> Result<()> {
    let parent = tree.get_parent(parent_id)?;

    if ordered_ids.len() != parent.children.len() {
        return Err(TreeError::InvalidSortOrder {
            reason: format!(
                "expected {} ids, got {}",
                parent.children.len(),
                ordered_ids.len()
            ),
        });
    }

    let current: HashSet<&str> = parent.children.iter().map(String::as_str).collect();
    let mut seen: HashSet<&str> = HashSet::new();
    for id in ordered_ids {
        if !current.contains(id.as_str()) {
            return Err(TreeError::InvalidSortOrder {
                reason: format!("'{}' is not a child of '{}'", id, parent_id),
            });
        }
        if !seen.insert(id.as_str()) {
            return Err(TreeError::InvalidSortOrder {
                reason: format!("'{}' appears more than once", id),
            });
        }
    }
    Ok(())
}

/// Preconditions for moving `node_id` under `new_parent_id`
///
/// Checked in order: node and parent exist, root is immovable, slug free
/// at the destination, not into itself, not into its own subtree, and the
/// destination is a section.
pub fn validate_move(tree: &Tree, node_id: &str, new_parent_id: &str) -> Result<()> {
    validate_move_structure(tree, node_id, new_parent_id)?;

    if !tree.get_parent(new_parent_id)?.is_section() {
        return Err(TreeError::invalid_op(
            "move_node",
            format!("target parent '{}' is not a section", new_parent_id),
        ));
    }

    Ok(())
}

/// `validate_move` without the destination kind check
///
/// Used by callers that promote a page destination to a section before
/// moving into it.
pub fn validate_move_structure(tree: &Tree, node_id: &str, new_parent_id: &str) -> Result<()> {
    let node = tree.get(node_id)?;
    tree.get_parent(new_parent_id)?;

    if node_id == ROOT_ID {
        return Err(TreeError::invalid_op("move_node", "the root cannot be moved"));
    }

    validate_slug_available(tree, new_parent_id, &node.slug, None)?;

    if node_id == new_parent_id {
        return Err(TreeError::SelfMove {
            node_id: node_id.to_string(),
        });
    }

    if is_descendant(tree, node_id, new_parent_id) {
        return Err(TreeError::CircularReference {
            node_id: node_id.to_string(),
            target_parent_id: new_parent_id.to_string(),
        });
    }

    Ok(())
}
