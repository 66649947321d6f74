//! v1 → v2 (part two): id/title frontmatter in existing content files

use leaftree_core::{Tree, ROOT_ID};
use tracing::{info, warn};

use crate::errors::Result;
use crate::markdown_file::MarkdownFile;
use crate::node_store::{probe, NodeStore, Shape};

/// Add the node id and title to content files that lack them
///
/// Existing values are kept. Sections without `index.md` get no file; a
/// missing page file is logged and skipped. Returns the number of files
/// rewritten.
pub fn backfill_frontmatter(store: &NodeStore, tree: &Tree) -> Result<usize> {
    let mut written = 0;

    for id in tree.subtree_ids(ROOT_ID)?.into_iter().skip(1) {
        let node = tree.get(&id)?;
        let path = store.content_path(tree, &id)?;
        if probe(&path)? != Shape::File {
            if node.is_page() {
                warn!(node_id = %id, path = %path.display(), "page file does not exist, skipping frontmatter backfill");
            }
            continue;
        }

        let mut file = MarkdownFile::load(&path)?;
        let needs_id = file.frontmatter().node_id().is_none();
        let needs_title = file.frontmatter().node_title().is_none();
        if !needs_id && !needs_title {
            continue;
        }
        if needs_id {
            file.set_id(&node.id);
        }
        if needs_title {
            file.set_title(&node.title);
        }
        file.save()?;

        info!(node_id = %id, path = %path.display(), "frontmatter backfilled");
        written += 1;
    }

    Ok(written)
}
