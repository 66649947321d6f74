#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use leaftree_core::NodeKind;
use leaftree_engine::{TreeService, TreeServiceConfig};
use tempfile::TempDir;

pub const USER: &str = "tester";

/// A service over a scratch storage directory
pub struct TestEnv {
    pub dir: TempDir,
    pub service: TreeService,
}

impl TestEnv {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp storage directory");
        let service = open_service(dir.path());
        Self { dir, service }
    }

    /// Drop the service and open a fresh one over the same directory
    pub fn reopen(self) -> Self {
        let TestEnv { dir, service } = self;
        drop(service);
        let service = open_service(dir.path());
        Self { dir, service }
    }

    /// Path relative to the content root
    pub fn content(&self, relative: &str) -> PathBuf {
        self.dir.path().join("root").join(relative)
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.content(relative)).expect("read content file")
    }

    pub fn page(&self, parent_id: Option<&str>, slug: &str) -> String {
        self.service
            .create_node(USER, parent_id, &title_for(slug), slug, NodeKind::Page)
            .expect("create page")
    }

    pub fn section(&self, parent_id: Option<&str>, slug: &str) -> String {
        self.service
            .create_node(USER, parent_id, &title_for(slug), slug, NodeKind::Section)
            .expect("create section")
    }

    /// Child slugs of `id` in position order
    pub fn child_slugs(&self, id: &str) -> Vec<String> {
        self.service
            .get_node(id)
            .expect("get node")
            .children
            .iter()
            .map(|c| c.slug.clone())
            .collect()
    }
}

pub fn open_service(dir: &Path) -> TreeService {
    TreeService::open(TreeServiceConfig::with_storage_dir(dir)).expect("open service")
}

fn title_for(slug: &str) -> String {
    let mut chars = slug.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
