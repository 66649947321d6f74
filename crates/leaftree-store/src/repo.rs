//! Storage directory layout: tree document, schema marker and content root

use std::fs;
use std::path::{Path, PathBuf};

use leaftree_core::Tree;

use crate::errors::{io_error, Result};
use crate::migrations::{run_migrations, MigrationReport};
use crate::node_store::NodeStore;
use crate::reconstruct::{reconstruct_tree, Reconstruction};
use crate::schema::{load_schema, save_schema};
use crate::tree_file::{load_tree, save_tree};

pub const DEFAULT_TREE_FILENAME: &str = "tree.json";
pub const DEFAULT_SCHEMA_FILENAME: &str = "schema.json";

/// Everything persisted under one storage directory
#[derive(Debug, Clone)]
pub struct TreeRepository {
    storage_dir: PathBuf,
    tree_path: PathBuf,
    schema_path: PathBuf,
    nodes: NodeStore,
}

impl TreeRepository {
    pub fn new(storage_dir: impl AsRef<Path>, tree_filename: &str, schema_filename: &str) -> Self {
        let storage_dir = storage_dir.as_ref().to_path_buf();
        Self {
            tree_path: storage_dir.join(tree_filename),
            schema_path: storage_dir.join(schema_filename),
            nodes: NodeStore::new(&storage_dir),
            storage_dir,
        }
    }

    /// Repository using the default file names
    pub fn open(storage_dir: impl AsRef<Path>) -> Self {
        Self::new(storage_dir, DEFAULT_TREE_FILENAME, DEFAULT_SCHEMA_FILENAME)
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    pub fn tree_path(&self) -> &Path {
        &self.tree_path
    }

    pub fn node_store(&self) -> &NodeStore {
        &self.nodes
    }

    pub fn ensure_storage_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.storage_dir)
            .map_err(|e| io_error("create_storage_dir", &self.storage_dir, e))
    }

    /// True once a tree document has been written
    pub fn has_tree_document(&self) -> bool {
        self.tree_path.is_file()
    }

    /// The stored tree, or a fresh root when nothing has been saved yet
    pub fn load_tree(&self) -> Result<Tree> {
        Ok(load_tree(&self.tree_path)?.unwrap_or_default())
    }

    pub fn save_tree(&self, tree: &Tree) -> Result<()> {
        save_tree(&self.tree_path, tree)
    }

    pub fn schema_version(&self) -> Result<u32> {
        Ok(load_schema(&self.schema_path)?.version)
    }

    pub fn set_schema_version(&self, version: u32) -> Result<()> {
        save_schema(&self.schema_path, version)
    }

    /// Bring `tree` and the files behind it up to the current layout
    pub fn migrate(&self, tree: &mut Tree) -> Result<MigrationReport> {
        run_migrations(self, tree)
    }

    /// Build a new tree purely from the content root
    pub fn reconstruct(&self) -> Result<Reconstruction> {
        reconstruct_tree(&self.nodes)
    }
}
