//! Offline rebuild of the tree from the content directory
//!
//! The inverse of the node store: here the filesystem is trusted and the
//! tree is derived from it. Entries are visited in a fixed order (names
//! compared case-insensitively, ties broken case-sensitively) so two runs
//! over the same directory produce the same positions.

use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use leaftree_core::markdown::first_heading;
use leaftree_core::ops::{attach_child, new_node_id};
use leaftree_core::slug::{normalize_slug, validate_slug};
use leaftree_core::{Node, NodeKind, NodeMetadata, Tree, ROOT_ID};
use tracing::{error, info};

use crate::errors::{drift, io_error, Result};
use crate::markdown_file::MarkdownFile;
use crate::node_store::{page_file, probe, NodeStore, Shape, INDEX_FILE};

/// Result of `reconstruct_tree`
#[derive(Debug, Clone)]
pub struct Reconstruction {
    pub tree: Tree,
    /// Entries left out of the tree
    pub skipped: Vec<PathBuf>,
    /// Files that received a freshly generated id
    pub ids_written: usize,
}

struct Builder {
    tree: Tree,
    skipped: Vec<PathBuf>,
    ids_written: usize,
    seen_ids: HashSet<String>,
}

/// Rebuild a tree from everything under the store's content root
///
/// Directories become sections and `*.md` files other than `index.md`
/// become pages; dotfiles are ignored. Names are normalized to slugs and
/// renamed on disk when normalization changed them. Entries whose slug is
/// invalid or collides with a sibling are logged and skipped. Ids and
/// titles come from the frontmatter when present; a file without an id
/// (or with an id already used elsewhere) gets a fresh one written back.
pub fn reconstruct_tree(store: &NodeStore) -> Result<Reconstruction> {
    let mut builder = Builder {
        tree: Tree::new(),
        skipped: Vec::new(),
        ids_written: 0,
        seen_ids: HashSet::from([ROOT_ID.to_string()]),
    };

    let root_dir = store.root_dir();
    match probe(root_dir)? {
        Shape::Missing => {}
        Shape::File => {
            return Err(drift(
                ROOT_ID,
                NodeKind::Section,
                root_dir,
                "expected folder but found file",
            ))
        }
        Shape::Dir => builder.walk(root_dir, ROOT_ID)?,
    }

    info!(
        nodes = builder.tree.len(),
        skipped = builder.skipped.len(),
        ids_written = builder.ids_written,
        "reconstructed tree from filesystem"
    );

    Ok(Reconstruction {
        tree: builder.tree,
        skipped: builder.skipped,
        ids_written: builder.ids_written,
    })
}

impl Builder {
    fn walk(&mut self, dir: &Path, parent_id: &str) -> Result<()> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir).map_err(|e| io_error("read_dir", dir, e))? {
            let entry = entry.map_err(|e| io_error("read_dir", dir, e))?;
            entries.push((entry.file_name().to_string_lossy().into_owned(), entry.path()));
        }
        entries.sort_by(|(a, _), (b, _)| {
            a.to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(b))
        });

        for (name, path) in entries {
            if name.starts_with('.') {
                continue;
            }
            let is_dir = match fs::metadata(&path) {
                Ok(meta) => meta.is_dir(),
                Err(err) => {
                    error!(path = %path.display(), error = %err, "could not stat entry");
                    self.skipped.push(path);
                    continue;
                }
            };

            if is_dir {
                self.add_section(dir, parent_id, &name, path)?;
            } else if let Some(stem) = name.strip_suffix(".md") {
                if name != INDEX_FILE {
                    self.add_page(dir, parent_id, stem, path);
                }
            }
        }
        Ok(())
    }

    fn add_section(&mut self, dir: &Path, parent_id: &str, name: &str, path: PathBuf) -> Result<()> {
        let Some(slug) = self.accept_slug(parent_id, name, &path) else {
            return Ok(());
        };
        let Some(path) = self.adopt_name(path, dir.join(&slug)) else {
            return Ok(());
        };

        let mut id = None;
        let mut title = name.to_string();
        let index = path.join(INDEX_FILE);
        if probe(&index)? == Shape::File {
            match MarkdownFile::load(&index) {
                Ok(file) => {
                    title = file
                        .frontmatter()
                        .node_title()
                        .map(str::to_string)
                        .or_else(|| first_heading(file.body()))
                        .unwrap_or(title);
                    id = Some(self.claim_id(file));
                }
                // Still added as a section, with a generated id
                Err(err) => error!(path = %index.display(), error = %err, "could not load index.md"),
            }
        }
        let id = id.unwrap_or_else(|| self.fresh_id());

        let node = Node::new(id.as_str(), title, slug, NodeKind::Section)
            .with_metadata(metadata_from_mtime(&path));
        attach_child(&mut self.tree, parent_id, node)?;

        self.walk(&path, &id)
    }

    fn add_page(&mut self, dir: &Path, parent_id: &str, stem: &str, path: PathBuf) {
        let Some(slug) = self.accept_slug(parent_id, stem, &path) else {
            return;
        };
        let file = match MarkdownFile::load(&path) {
            Ok(file) => file,
            Err(err) => {
                error!(path = %path.display(), error = %err, "could not load markdown file");
                self.skipped.push(path);
                return;
            }
        };
        let Some(path) = self.adopt_name(path, page_file(&dir.join(&slug))) else {
            return;
        };

        let title = file.title();
        let file = match MarkdownFile::load(&path) {
            Ok(file) => file,
            Err(err) => {
                error!(path = %path.display(), error = %err, "could not reload renamed file");
                file
            }
        };
        let id = self.claim_id(file);

        let node = Node::new(id, title, slug, NodeKind::Page).with_metadata(metadata_from_mtime(&path));
        if let Err(err) = attach_child(&mut self.tree, parent_id, node) {
            error!(path = %path.display(), error = %err, "could not attach page");
            self.skipped.push(path);
        }
    }

    /// Normalized slug for `name`, or `None` (logged, skipped) if it is
    /// invalid or already used by a sibling
    fn accept_slug(&mut self, parent_id: &str, name: &str, path: &Path) -> Option<String> {
        let slug = normalize_slug(name);
        if let Err(err) = validate_slug(&slug) {
            error!(path = %path.display(), normalized = %slug, error = %err, "skipping entry with invalid slug");
            self.skipped.push(path.to_path_buf());
            return None;
        }
        if self.tree.child_by_slug(parent_id, &slug).is_some() {
            error!(path = %path.display(), slug = %slug, "skipping entry with duplicate slug");
            self.skipped.push(path.to_path_buf());
            return None;
        }
        Some(slug)
    }

    /// Rename `path` to `target` unless they already match
    fn adopt_name(&mut self, path: PathBuf, target: PathBuf) -> Option<PathBuf> {
        if path == target {
            return Some(path);
        }
        let case_only = match is_case_only_rename(&path, &target) {
            Ok(case_only) => case_only,
            Err(err) => {
                error!(path = %path.display(), error = %err, "could not list siblings of entry");
                self.skipped.push(path);
                return None;
            }
        };

        let renamed = if case_only {
            // On a case-insensitive filesystem `target` is this very entry
            rename_via_temp(&path, &target)
        } else if !matches!(probe(&target), Ok(Shape::Missing)) {
            error!(path = %path.display(), target = %target.display(), "normalized name is taken; skipping entry");
            self.skipped.push(path);
            return None;
        } else {
            fs::rename(&path, &target)
        };

        match renamed {
            Ok(()) => {
                info!(from = %path.display(), to = %target.display(), case_only, "renamed entry to its slug");
                Some(target)
            }
            Err(err) => {
                error!(path = %path.display(), error = %err, "could not rename entry to its slug");
                self.skipped.push(path);
                None
            }
        }
    }

    /// The file's own id, or a fresh one written back into it
    fn claim_id(&mut self, mut file: MarkdownFile) -> String {
        if let Some(id) = file.frontmatter().node_id() {
            if self.seen_ids.insert(id.to_string()) {
                return id.to_string();
            }
            error!(path = %file.path().display(), id, "duplicate id in frontmatter; assigning a new one");
        }

        let id = self.fresh_id();
        file.set_id(&id);
        match file.save() {
            Ok(()) => self.ids_written += 1,
            Err(err) => {
                error!(path = %file.path().display(), error = %err, "could not write id back to file")
            }
        }
        id
    }

    fn fresh_id(&mut self) -> String {
        let id = new_node_id();
        self.seen_ids.insert(id.clone());
        id
    }
}

/// `path` and `target` are siblings whose names differ only in letter
/// case, and no directory entry carries `target`'s exact name yet
fn is_case_only_rename(path: &Path, target: &Path) -> io::Result<bool> {
    let (Some(from), Some(to), Some(dir)) = (path.file_name(), target.file_name(), target.parent())
    else {
        return Ok(false);
    };
    if path.parent() != Some(dir)
        || from == to
        || from.to_string_lossy().to_lowercase() != to.to_string_lossy().to_lowercase()
    {
        return Ok(false);
    }
    for entry in fs::read_dir(dir)? {
        if entry?.file_name().as_os_str() == to {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Two-step rename through a hidden sibling; restores `path` if the
/// second step fails
fn rename_via_temp(path: &Path, target: &Path) -> io::Result<()> {
    let mut temp_name = OsString::from(".");
    temp_name.push(path.file_name().unwrap_or_default());
    temp_name.push(format!(".{}.rename", std::process::id()));
    let temp = path.with_file_name(temp_name);

    fs::rename(path, &temp)?;
    if let Err(err) = fs::rename(&temp, target) {
        if let Err(restore_err) = fs::rename(&temp, path) {
            error!(temp = %temp.display(), error = %restore_err, "could not restore entry after failed rename");
        }
        return Err(err);
    }
    Ok(())
}

fn metadata_from_mtime(path: &Path) -> NodeMetadata {
    let stamp = fs::metadata(path)
        .and_then(|m| m.modified())
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now());
    NodeMetadata {
        created_at: Some(stamp),
        updated_at: Some(stamp),
        ..NodeMetadata::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_root_gives_empty_tree() {
        let dir = TempDir::new().unwrap();
        let store = NodeStore::new(dir.path());

        let rebuilt = reconstruct_tree(&store).unwrap();
        assert_eq!(rebuilt.tree.len(), 1);
        assert!(rebuilt.skipped.is_empty());
    }

    #[test]
    fn test_sort_is_case_insensitive() {
        let dir = TempDir::new().unwrap();
        let store = NodeStore::new(dir.path());
        fs::create_dir_all(store.root_dir()).unwrap();
        for name in ["beta.md", "Alpha.md", "gamma.md"] {
            fs::write(store.root_dir().join(name), "# T\n").unwrap();
        }

        let rebuilt = reconstruct_tree(&store).unwrap();
        let slugs: Vec<String> = rebuilt
            .tree
            .sorted_children(ROOT_ID)
            .unwrap()
            .iter()
            .map(|n| n.slug.clone())
            .collect();
        assert_eq!(slugs, vec!["alpha", "beta", "gamma"]);
        assert!(store.root_dir().join("alpha.md").is_file());
        assert_eq!(rebuilt.ids_written, 3);
    }

    fn entry_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_case_only_rename_keeps_section_subtree() {
        let dir = TempDir::new().unwrap();
        let store = NodeStore::new(dir.path());
        let docs = store.root_dir().join("Docs");
        fs::create_dir_all(&docs).unwrap();
        fs::write(docs.join("Setup.md"), "# Setup\n").unwrap();

        let rebuilt = reconstruct_tree(&store).unwrap();

        assert!(rebuilt.skipped.is_empty());
        let section = rebuilt.tree.child_by_slug(ROOT_ID, "docs").unwrap();
        assert_eq!(section.kind, NodeKind::Section);
        assert_eq!(section.title, "Docs");
        let page = rebuilt.tree.child_by_slug(&section.id, "setup").unwrap();
        assert_eq!(page.kind, NodeKind::Page);
        assert_eq!(page.title, "Setup");

        // No temp entries left behind
        assert_eq!(entry_names(store.root_dir()), vec!["docs"]);
        assert_eq!(entry_names(&store.root_dir().join("docs")), vec!["setup.md"]);
    }

    #[test]
    fn test_case_only_rename_detection() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir(root.join("Docs")).unwrap();

        assert!(is_case_only_rename(&root.join("Docs"), &root.join("docs")).unwrap());
        assert!(!is_case_only_rename(&root.join("My Docs"), &root.join("my-docs")).unwrap());
        assert!(!is_case_only_rename(&root.join("Docs"), &root.join("Docs")).unwrap());

        // Only meaningful where both spellings can coexist
        fs::create_dir(root.join("docs")).ok();
        if entry_names(root).len() == 2 {
            assert!(!is_case_only_rename(&root.join("Docs"), &root.join("docs")).unwrap());
        }
    }

    #[test]
    fn test_rename_via_temp_moves_entry() {
        let dir = TempDir::new().unwrap();
        let from = dir.path().join("Notes.md");
        fs::write(&from, "# Notes\n").unwrap();

        rename_via_temp(&from, &dir.path().join("notes.md")).unwrap();

        assert_eq!(entry_names(dir.path()), vec!["notes.md"]);
        assert_eq!(fs::read_to_string(dir.path().join("notes.md")).unwrap(), "# Notes\n");
    }
}
