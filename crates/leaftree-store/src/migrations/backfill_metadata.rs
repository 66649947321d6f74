//! v0 → v1: node timestamps from file modification times

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use leaftree_core::{Tree, ROOT_ID};
use tracing::error;

use crate::errors::Result;
use crate::node_store::NodeStore;

/// Set `created_at`/`updated_at` on every node that lacks them
///
/// The time comes from the page file, the section's `index.md`, or the
/// section directory when it has no index. Nodes that cannot be found on
/// disk are logged and left untouched. Returns the number of nodes changed.
pub fn backfill_metadata(store: &NodeStore, tree: &mut Tree) -> Result<usize> {
    let mut changed = 0;

    for id in tree.subtree_ids(ROOT_ID)? {
        if tree.get(&id)?.metadata.has_timestamps() {
            continue;
        }

        let resolved = match store.resolve_node(tree, &id) {
            Ok(resolved) => resolved,
            Err(err) => {
                error!(node_id = %id, error = %err, "could not resolve node for metadata backfill");
                continue;
            }
        };

        let stamp = match resolved.artifact_path() {
            Some(path) => modified_at(path),
            None => Utc::now(),
        };

        let metadata = &mut tree.get_mut(&id)?.metadata;
        metadata.created_at = Some(stamp);
        metadata.updated_at = Some(stamp);
        changed += 1;
    }

    Ok(changed)
}

fn modified_at(path: &Path) -> DateTime<Utc> {
    match fs::metadata(path).and_then(|m| m.modified()) {
        Ok(time) => DateTime::<Utc>::from(time),
        Err(err) => {
            error!(path = %path.display(), error = %err, "could not stat node for metadata");
            Utc::now()
        }
    }
}
