//! Service configuration

use std::path::{Path, PathBuf};

use leaftree_store::repo::{DEFAULT_SCHEMA_FILENAME, DEFAULT_TREE_FILENAME};

pub const DEFAULT_STORAGE_DIR: &str = "./data";

/// Where a `TreeService` keeps its files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeServiceConfig {
    /// Root of everything the service writes; content lives in `<storage_dir>/root`
    pub storage_dir: PathBuf,
    pub tree_filename: String,
    pub schema_filename: String,
}

impl Default for TreeServiceConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            tree_filename: DEFAULT_TREE_FILENAME.to_string(),
            schema_filename: DEFAULT_SCHEMA_FILENAME.to_string(),
        }
    }
}

impl TreeServiceConfig {
    pub fn with_storage_dir(storage_dir: impl AsRef<Path>) -> Self {
        Self {
            storage_dir: storage_dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }
}
