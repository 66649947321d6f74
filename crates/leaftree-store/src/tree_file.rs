//! The persisted tree document (`tree.json`)

use std::fs;
use std::io;
use std::path::Path;

use leaftree_core::{NodeDocument, Tree};
use tracing::debug;

use crate::atomic::atomic_write;
use crate::errors::{io_error, Result};

/// Load the tree stored at `path`
///
/// Returns `None` when no document has been written yet.
pub fn load_tree(path: &Path) -> Result<Option<Tree>> {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no tree document yet");
            return Ok(None);
        }
        Err(e) => return Err(io_error("load_tree", path, e)),
    };

    let doc: NodeDocument = serde_json::from_slice(&data)?;
    Tree::from_document(doc).map(Some)
}

/// Write the whole tree as one compact JSON document, atomically
pub fn save_tree(path: &Path, tree: &Tree) -> Result<()> {
    let doc = tree.to_document()?;
    let data = serde_json::to_vec(&doc)?;
    atomic_write(path, &data)?;
    debug!(path = %path.display(), nodes = tree.len(), "saved tree document");
    Ok(())
}
