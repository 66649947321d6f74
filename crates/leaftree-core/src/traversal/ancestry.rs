use std::collections::HashSet;

use crate::errors::{Result, TreeError};
use crate::model::Tree;

/// Ids from the root down to `node_id`, both ends included
///
/// Follows parent back-references upward and reverses. A dangling parent
/// reference or a loop in the chain is reported as an invariant violation.
pub fn compute_ancestry(tree: &Tree, node_id: &str) -> Result<Vec<String>> {
    tree.get(node_id)?;

    let mut chain = Vec::new();
    let mut seen = HashSet::new();
    let mut current = Some(node_id.to_string());

    while let Some(id) = current {
        if !seen.insert(id.clone()) {
            return Err(TreeError::InvariantViolation {
                reason: format!("parent chain of '{}' loops at '{}'", node_id, id),
            });
        }
        let node = tree
            .get(&id)
            .map_err(|_| TreeError::InvariantViolation {
                reason: format!("parent chain of '{}' is broken at '{}'", node_id, id),
            })?;
        current = node.parent_id.clone();
        chain.push(id);
    }

    chain.reverse();
    Ok(chain)
}

/// Slug path of a node relative to the root, e.g. `docs/setup/install`
///
/// The root itself has the empty path.
pub fn node_path(tree: &Tree, node_id: &str) -> Result<String> {
    let chain = compute_ancestry(tree, node_id)?;
    let slugs = chain
        .iter()
        .skip(1)
        .map(|id| tree.get(id).map(|n| n.slug.as_str()))
        .collect::<Result<Vec<_>>>()?;
    Ok(slugs.join("/"))
}

/// True if `candidate_id` lies in the subtree strictly below `ancestor_id`
///
/// Depth-first search over child lists, so it stays correct even if a
/// parent back-reference is stale.
pub fn is_descendant(tree: &Tree, ancestor_id: &str, candidate_id: &str) -> bool {
    let Some(ancestor) = tree.find(ancestor_id) else {
        return false;
    };
    let mut stack: Vec<&str> = ancestor.children.iter().map(String::as_str).collect();
    let mut seen = HashSet::new();

    while let Some(id) = stack.pop() {
        if id == candidate_id {
            return true;
        }
        if !seen.insert(id) {
            continue;
        }
        if let Some(node) = tree.find(id) {
            stack.extend(node.children.iter().map(String::as_str));
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NodeDocument, ROOT_ID};

    fn sample() -> Tree {
        let doc: NodeDocument = serde_json::from_str(
            r#"{"id":"root","title":"root","slug":"root","kind":"section","children":[
                {"id":"a","title":"A","slug":"docs","kind":"section","children":[
                    {"id":"b","title":"B","slug":"setup","kind":"section","children":[
                        {"id":"c","title":"C","slug":"install","kind":"page"}
                    ]}
                ]},
                {"id":"d","title":"D","slug":"about","kind":"page","position":1}
            ]}"#,
        )
        .unwrap();
        Tree::from_document(doc).unwrap()
    }

    #[test]
    fn test_ancestry_root_to_leaf() {
        let tree = sample();
        assert_eq!(
            compute_ancestry(&tree, "c").unwrap(),
            vec![ROOT_ID, "a", "b", "c"]
        );
        assert_eq!(compute_ancestry(&tree, ROOT_ID).unwrap(), vec![ROOT_ID]);
    }

    #[test]
    fn test_ancestry_missing_node() {
        let tree = sample();
        assert!(matches!(
            compute_ancestry(&tree, "zzz"),
            Err(TreeError::NodeNotFound { .. })
        ));
    }

    #[test]
    fn test_node_path() {
        let tree = sample();
        assert_eq!(node_path(&tree, "c").unwrap(), "docs/setup/install");
        assert_eq!(node_path(&tree, ROOT_ID).unwrap(), "");
    }

    #[test]
    fn test_is_descendant() {
        let tree = sample();
        assert!(is_descendant(&tree, "a", "c"));
        assert!(is_descendant(&tree, ROOT_ID, "d"));
        assert!(!is_descendant(&tree, "c", "a"));
        assert!(!is_descendant(&tree, "a", "a"));
        assert!(!is_descendant(&tree, "a", "d"));
    }
}
