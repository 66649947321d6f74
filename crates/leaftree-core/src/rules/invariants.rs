//! Individual structural checks over a `Tree`
//!
//! Each check returns every violation it finds so callers can report them
//! all; `validation::validate_tree` stops at the first one.

use std::collections::{HashMap, HashSet};

use crate::model::{Tree, ROOT_ID};

/// `(parent_id, slug)` pairs that occur more than once among siblings
pub fn find_duplicate_sibling_slugs(tree: &Tree) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for parent in tree.nodes() {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for child in parent.children.iter().filter_map(|id| tree.find(id)) {
            *seen.entry(child.slug.as_str()).or_default() += 1;
        }
        for (slug, count) in seen {
            if count > 1 {
                out.push((parent.id.clone(), slug.to_string()));
            }
        }
    }
    out.sort();
    out
}

/// Parents whose children's positions are not exactly `0..n` in order
pub fn find_non_contiguous_positions(tree: &Tree) -> Vec<String> {
    let mut out: Vec<String> = tree
        .nodes()
        .filter(|parent| {
            parent
                .children
                .iter()
                .enumerate()
                .any(|(i, id)| tree.find(id).map(|c| c.position) != Some(i))
        })
        .map(|parent| parent.id.clone())
        .collect();
    out.sort();
    out
}

/// Non-section nodes that nevertheless hold children
pub fn find_children_under_non_sections(tree: &Tree) -> Vec<String> {
    let mut out: Vec<String> = tree
        .nodes()
        .filter(|n| !n.is_section() && n.has_children())
        .map(|n| n.id.clone())
        .collect();
    out.sort();
    out
}

/// `(child_id, listed_under)` where the child's back-reference disagrees
/// with the parent listing it, or the child does not exist at all
pub fn find_parent_link_mismatches(tree: &Tree) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for parent in tree.nodes() {
        for child_id in &parent.children {
            let consistent = tree
                .find(child_id)
                .is_some_and(|c| c.parent_id.as_deref() == Some(parent.id.as_str()));
            if !consistent {
                out.push((child_id.clone(), parent.id.clone()));
            }
        }
    }
    out.sort();
    out
}

/// Nodes not reachable from the root through child lists
pub fn find_unreachable_nodes(tree: &Tree) -> Vec<String> {
    let mut reachable: HashSet<&str> = HashSet::new();
    let mut stack = vec![ROOT_ID];
    while let Some(id) = stack.pop() {
        if !reachable.insert(id) {
            continue;
        }
        if let Some(node) = tree.find(id) {
            stack.extend(node.children.iter().map(String::as_str));
        }
    }

    let mut out: Vec<String> = tree
        .nodes()
        .filter(|n| !reachable.contains(n.id.as_str()))
        .map(|n| n.id.clone())
        .collect();
    out.sort();
    out
}
