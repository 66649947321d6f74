//! v1 → v2 (part one): node kinds from the filesystem

use leaftree_core::{NodeKind, Tree, ROOT_ID};
use tracing::warn;

use crate::errors::Result;
use crate::node_store::NodeStore;

/// Give every node with a missing kind the kind its artifact has on disk
///
/// Nodes with nothing on disk become sections when they have children and
/// pages otherwise. A node with children always ends up a section. The root
/// is forced to be a section. Returns the number of nodes changed.
pub fn backfill_kinds(store: &NodeStore, tree: &mut Tree) -> Result<usize> {
    tree.get_mut(ROOT_ID)?.kind = NodeKind::Section;
    let mut changed = 0;

    for id in tree.subtree_ids(ROOT_ID)?.into_iter().skip(1) {
        let node = tree.get(&id)?;
        if node.kind.is_known() {
            continue;
        }
        let has_children = node.has_children();

        let kind = match store.resolve_node(tree, &id) {
            Ok(resolved) if has_children && resolved.kind == NodeKind::Page => {
                warn!(node_id = %id, "page on disk has children in the tree; backfilled as section");
                NodeKind::Section
            }
            Ok(resolved) => resolved.kind,
            Err(err) => {
                let kind = if has_children {
                    NodeKind::Section
                } else {
                    NodeKind::Page
                };
                warn!(
                    node_id = %id,
                    error = %err,
                    kind = %kind,
                    "could not resolve node on disk; kind backfilled by heuristic"
                );
                kind
            }
        };

        tree.get_mut(&id)?.kind = kind;
        changed += 1;
    }

    Ok(changed)
}
