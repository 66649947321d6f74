#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use leaftree_core::ops::attach_child;
use leaftree_core::{Node, NodeKind, Tree};
use leaftree_store::NodeStore;
use tempfile::TempDir;

/// A node store over a scratch directory plus the tree it mirrors
pub struct Fixture {
    pub dir: TempDir,
    pub store: NodeStore,
    pub tree: Tree,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp storage directory");
        let store = NodeStore::new(dir.path());
        Self {
            dir,
            store,
            tree: Tree::new(),
        }
    }

    /// Create a page on disk and attach it to the tree
    pub fn page(&mut self, parent_id: &str, id: &str, slug: &str, title: &str) {
        let node = Node::new(id, title, slug, NodeKind::Page);
        self.store
            .create_page(&self.tree, parent_id, &node)
            .expect("create_page");
        attach_child(&mut self.tree, parent_id, node).expect("attach page");
    }

    /// Create a section on disk and attach it to the tree
    pub fn section(&mut self, parent_id: &str, id: &str, slug: &str, title: &str) {
        let node = Node::new(id, title, slug, NodeKind::Section);
        self.store
            .create_section(&self.tree, parent_id, &node)
            .expect("create_section");
        attach_child(&mut self.tree, parent_id, node).expect("attach section");
    }

    /// Path relative to the content root
    pub fn path(&self, relative: &str) -> PathBuf {
        self.store.root_dir().join(relative)
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path(relative)).expect("read file")
    }
}

/// Relative paths of everything under `root`, sorted
pub fn list_files(root: &std::path::Path) -> Vec<String> {
    let mut out = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let Ok(entries) = fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            let rel = path
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/");
            if path.is_dir() {
                out.push(format!("{}/", rel));
                stack.push(path);
            } else {
                out.push(rel);
            }
        }
    }
    out.sort();
    out
}
