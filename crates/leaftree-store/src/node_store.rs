//! Filesystem effects for single nodes
//!
//! Every operation first checks that the artifact on disk has the shape the
//! tree declares (`<slug>.md` for pages, `<slug>/` for sections) and only
//! then touches it. A mismatch is reported as `TreeError::Drift` and left
//! alone; repairing drift is the job of the offline rebuild in
//! `reconstruct`.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use leaftree_core::markdown::{build_markdown, parse_frontmatter, Frontmatter};
use leaftree_core::traversal::compute_ancestry;
use leaftree_core::{Node, NodeKind, Tree, TreeError, ROOT_ID};
use tracing::debug;

use crate::atomic::atomic_write;
use crate::errors::{already_exists, drift, invalid_op, io_error, unknown_kind, Result};
use crate::markdown_file::{set_identity, MarkdownFile};

/// Directory under the storage dir that mirrors the tree
pub const CONTENT_ROOT: &str = "root";

/// Optional content document of a section
pub const INDEX_FILE: &str = "index.md";

/// What occupies a path on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Shape {
    Missing,
    File,
    Dir,
}

pub(crate) fn probe(path: &Path) -> Result<Shape> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(Shape::Dir),
        Ok(_) => Ok(Shape::File),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Shape::Missing),
        Err(e) => Err(io_error("stat", path, e)),
    }
}

/// `<base>.md`
pub(crate) fn page_file(base: &Path) -> PathBuf {
    let mut name: OsString = base.as_os_str().to_owned();
    name.push(".md");
    PathBuf::from(name)
}

/// Artifact found on disk for a node, independent of its declared kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ResolvedNode {
    pub kind: NodeKind,
    pub dir_path: Option<PathBuf>,
    pub file_path: Option<PathBuf>,
}

impl ResolvedNode {
    /// The content file when there is one, otherwise the section directory
    pub fn artifact_path(&self) -> Option<&Path> {
        self.file_path.as_deref().or(self.dir_path.as_deref())
    }
}

#[derive(Debug, Clone)]
pub struct NodeStore {
    root_dir: PathBuf,
}

impl NodeStore {
    pub fn new(storage_dir: impl AsRef<Path>) -> Self {
        Self {
            root_dir: storage_dir.as_ref().join(CONTENT_ROOT),
        }
    }

    /// Directory backing the root section
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Path of a node without extension: the section directory, or the
    /// page file minus `.md`
    pub fn base_path(&self, tree: &Tree, node_id: &str) -> Result<PathBuf> {
        let chain = compute_ancestry(tree, node_id)?;
        let mut path = self.root_dir.clone();
        for id in chain.iter().skip(1) {
            path.push(&tree.get(id)?.slug);
        }
        Ok(path)
    }

    /// File holding a node's content: `<base>.md` or `<base>/index.md`
    pub fn content_path(&self, tree: &Tree, node_id: &str) -> Result<PathBuf> {
        let node = tree.get(node_id)?;
        let base = self.base_path(tree, node_id)?;
        match node.kind {
            NodeKind::Page => Ok(page_file(&base)),
            NodeKind::Section => Ok(base.join(INDEX_FILE)),
            NodeKind::Unknown => Err(unknown_kind("content_path", node_id, node.kind)),
        }
    }

    pub fn create_page(&self, tree: &Tree, parent_id: &str, node: &Node) -> Result<()> {
        if node.id == ROOT_ID {
            return Err(invalid_op("create_page", "cannot create root"));
        }
        if !node.is_page() {
            return Err(invalid_op("create_page", "new node must be a page"));
        }

        let parent_dir = self.ensure_parent_dir(tree, parent_id, "create_page")?;
        let base = parent_dir.join(&node.slug);
        ensure_free(&base)?;

        let file = page_file(&base);
        let content = build_markdown(
            &Frontmatter::with_id(node.id.as_str()),
            &format!("# {}\n", node.title),
        )?;
        atomic_write(&file, content.as_bytes())?;

        debug!(node_id = %node.id, path = %file.display(), "created page file");
        Ok(())
    }

    /// Create an empty section directory; no index document is written
    pub fn create_section(&self, tree: &Tree, parent_id: &str, node: &Node) -> Result<()> {
        if node.id == ROOT_ID {
            return Err(invalid_op("create_section", "cannot create root"));
        }
        if !node.is_section() {
            return Err(invalid_op("create_section", "new node must be a section"));
        }

        let parent_dir = self.ensure_parent_dir(tree, parent_id, "create_section")?;
        let base = parent_dir.join(&node.slug);
        ensure_free(&base)?;

        fs::create_dir(&base).map_err(|e| io_error("create_section_dir", &base, e))?;

        debug!(node_id = %node.id, path = %base.display(), "created section directory");
        Ok(())
    }

    /// Write `content` as the node's body
    ///
    /// The id/title keys are always rewritten from the tree. Other keys
    /// come from a frontmatter block in `content` if it has one, else from
    /// the file being replaced. Sections get their directory created and
    /// the body goes to `index.md`.
    pub fn upsert_content(&self, tree: &Tree, node_id: &str, content: &str) -> Result<()> {
        let node = tree.get(node_id)?;
        let base = self.base_path(tree, node_id)?;
        let path = match node.kind {
            NodeKind::Page => page_file(&base),
            NodeKind::Section => {
                fs::create_dir_all(&base).map_err(|e| io_error("create_section_dir", &base, e))?;
                base.join(INDEX_FILE)
            }
            NodeKind::Unknown => return Err(unknown_kind("upsert_content", node_id, node.kind)),
        };

        let incoming = parse_frontmatter(content)?;
        let mut frontmatter = if incoming.has_frontmatter {
            incoming.frontmatter
        } else {
            existing_frontmatter(&path)
        };
        set_identity(&mut frontmatter, &node.id, &node.title);

        let rendered = build_markdown(&frontmatter, &incoming.body)?;
        atomic_write(&path, rendered.as_bytes())?;

        debug!(node_id, path = %path.display(), "wrote node content");
        Ok(())
    }

    /// Move a node's artifact under `new_parent_id`, keeping its slug
    ///
    /// Must run before the tree is updated, while `node_id` still hangs
    /// under its old parent.
    pub fn move_node(&self, tree: &Tree, node_id: &str, new_parent_id: &str) -> Result<()> {
        let node = tree.get(node_id)?;
        if node.id == ROOT_ID {
            return Err(invalid_op("move_node", "cannot move root"));
        }

        let parent_dir = self.ensure_parent_dir(tree, new_parent_id, "move_node")?;
        let old_base = self.base_path(tree, node_id)?;
        let dest_base = parent_dir.join(&node.slug);
        ensure_free(&dest_base)?;

        let (from, to) = match node.kind {
            NodeKind::Section => {
                expect_dir(node, &old_base)?;
                (old_base, dest_base)
            }
            NodeKind::Page => {
                let from = page_file(&old_base);
                expect_file(node, &from)?;
                (from, page_file(&dest_base))
            }
            NodeKind::Unknown => return Err(unknown_kind("move_node", node_id, node.kind)),
        };

        fs::rename(&from, &to).map_err(|e| io_error("move_node", &from, e))?;
        debug!(node_id, from = %from.display(), to = %to.display(), "moved node artifact");
        Ok(())
    }

    /// Rename a node's artifact within its parent directory
    ///
    /// No-op when the slug is unchanged.
    pub fn rename_node(&self, tree: &Tree, node_id: &str, new_slug: &str) -> Result<()> {
        if new_slug.trim().is_empty() {
            return Err(invalid_op("rename_node", "new slug must not be empty"));
        }
        let node = tree.get(node_id)?;
        if node.slug == new_slug {
            return Ok(());
        }
        if node.id == ROOT_ID {
            return Err(invalid_op("rename_node", "cannot rename root"));
        }

        let old_base = self.base_path(tree, node_id)?;
        let new_base = old_base.with_file_name(new_slug);
        ensure_free(&new_base)?;

        let (from, to) = match node.kind {
            NodeKind::Section => {
                expect_dir(node, &old_base)?;
                (old_base, new_base)
            }
            NodeKind::Page => {
                let from = page_file(&old_base);
                expect_file(node, &from)?;
                (from, page_file(&new_base))
            }
            NodeKind::Unknown => return Err(unknown_kind("rename_node", node_id, node.kind)),
        };

        fs::rename(&from, &to).map_err(|e| io_error("rename_node", &from, e))?;
        debug!(node_id, from = %from.display(), to = %to.display(), "renamed node artifact");
        Ok(())
    }

    pub fn delete_page(&self, tree: &Tree, node_id: &str) -> Result<()> {
        let node = tree.get(node_id)?;
        if node.id == ROOT_ID {
            return Err(invalid_op("delete_page", "cannot delete root"));
        }
        if node.is_section() {
            return Err(invalid_op("delete_page", "node must be a page"));
        }

        let file = page_file(&self.base_path(tree, node_id)?);
        expect_file(node, &file)?;
        fs::remove_file(&file).map_err(|e| io_error("delete_page", &file, e))?;

        debug!(node_id, path = %file.display(), "deleted page file");
        Ok(())
    }

    /// Remove a section directory and everything below it
    pub fn delete_section(&self, tree: &Tree, node_id: &str) -> Result<()> {
        let node = tree.get(node_id)?;
        if node.id == ROOT_ID {
            return Err(invalid_op("delete_section", "cannot delete root"));
        }
        if !node.is_section() {
            return Err(invalid_op("delete_section", "node must be a section"));
        }

        let dir = self.base_path(tree, node_id)?;
        expect_dir(node, &dir)?;
        fs::remove_dir_all(&dir).map_err(|e| io_error("delete_section", &dir, e))?;

        debug!(node_id, path = %dir.display(), "deleted section directory");
        Ok(())
    }

    /// Content file including its frontmatter
    ///
    /// A section without `index.md` reads as empty; a page without its
    /// file is drift.
    pub fn read_raw(&self, tree: &Tree, node_id: &str) -> Result<String> {
        let node = tree.get(node_id)?;
        let path = self.content_path(tree, node_id)?;
        match probe(&path)? {
            Shape::File => fs::read_to_string(&path).map_err(|e| io_error("read_content", &path, e)),
            Shape::Missing if node.is_section() => Ok(String::new()),
            Shape::Missing => Err(drift(
                node_id,
                node.kind,
                &path,
                "expected page file missing",
            )),
            Shape::Dir => Err(drift(
                node_id,
                node.kind,
                &path,
                "expected file but found folder",
            )),
        }
    }

    /// Content body with the frontmatter block stripped
    pub fn read_content(&self, tree: &Tree, node_id: &str) -> Result<String> {
        let raw = self.read_raw(tree, node_id)?;
        Ok(parse_frontmatter(&raw)?.body)
    }

    /// Rewrite id/title in the node's content file if there is one
    ///
    /// Never creates a file. A section without `index.md` is left alone;
    /// a page without its file is drift.
    pub fn sync_metadata_if_exists(&self, tree: &Tree, node_id: &str) -> Result<()> {
        let node = tree.get(node_id)?;
        let path = self.content_path(tree, node_id)?;
        match probe(&path)? {
            Shape::File => {
                let mut file = MarkdownFile::load(&path)?;
                file.set_identity(&node.id, &node.title);
                file.save()
            }
            Shape::Missing if node.is_section() => Ok(()),
            Shape::Missing => Err(drift(
                node_id,
                node.kind,
                &path,
                "expected page file missing",
            )),
            Shape::Dir => Err(drift(
                node_id,
                node.kind,
                &path,
                "expected file but found folder",
            )),
        }
    }

    /// Switch a node's on-disk shape between page and section
    ///
    /// Page→Section moves `<slug>.md` to `<slug>/index.md`. Section→Page is
    /// allowed only while the directory is empty or holds nothing but
    /// `index.md`; the index becomes `<slug>.md`, or an id/title-only file
    /// is written when there is no index.
    pub fn convert_kind(&self, tree: &Tree, node_id: &str, target: NodeKind) -> Result<()> {
        let node = tree.get(node_id)?;
        if node.id == ROOT_ID {
            return Err(invalid_op("convert_kind", "cannot convert root"));
        }

        let dir = self.base_path(tree, node_id)?;
        let file = page_file(&dir);
        let index = dir.join(INDEX_FILE);

        match target {
            NodeKind::Section => {
                match probe(&file)? {
                    Shape::File => {}
                    Shape::Missing => {
                        return Err(drift(node_id, NodeKind::Page, &file, "expected file missing"))
                    }
                    Shape::Dir => {
                        return Err(drift(
                            node_id,
                            NodeKind::Page,
                            &file,
                            "expected file but found folder",
                        ))
                    }
                }
                if probe(&dir)? != Shape::Missing {
                    return Err(already_exists(&dir));
                }

                fs::create_dir(&dir).map_err(|e| io_error("convert_kind", &dir, e))?;
                fs::rename(&file, &index).map_err(|e| io_error("convert_kind", &file, e))?;
            }
            NodeKind::Page => {
                match probe(&dir)? {
                    Shape::Dir => {}
                    Shape::Missing => {
                        return Err(drift(
                            node_id,
                            NodeKind::Section,
                            &dir,
                            "expected folder missing",
                        ))
                    }
                    Shape::File => {
                        return Err(drift(
                            node_id,
                            NodeKind::Section,
                            &dir,
                            "expected folder but found file",
                        ))
                    }
                }
                if probe(&file)? != Shape::Missing {
                    return Err(already_exists(&file));
                }
                if !holds_only_index(&dir)? {
                    return Err(TreeError::ConversionNotAllowed {
                        from: NodeKind::Section,
                        to: NodeKind::Page,
                        reason: "folder not empty".to_string(),
                    });
                }

                if probe(&index)? == Shape::File {
                    fs::rename(&index, &file).map_err(|e| io_error("convert_kind", &index, e))?;
                } else {
                    let mut frontmatter = Frontmatter::default();
                    set_identity(&mut frontmatter, &node.id, &node.title);
                    let content = build_markdown(&frontmatter, "")?;
                    atomic_write(&file, content.as_bytes())?;
                }
                fs::remove_dir(&dir).map_err(|e| io_error("convert_kind", &dir, e))?;
            }
            NodeKind::Unknown => {
                return Err(invalid_op("convert_kind", "unknown target kind"));
            }
        }

        debug!(node_id, target = %target, "converted node artifact");
        Ok(())
    }

    /// Inspect the disk to find out what a node currently is
    ///
    /// Trusts the filesystem over the tree, so only migrations use it.
    pub(crate) fn resolve_node(&self, tree: &Tree, node_id: &str) -> Result<ResolvedNode> {
        let base = self.base_path(tree, node_id)?;
        let file = page_file(&base);

        if probe(&file)? == Shape::File {
            return Ok(ResolvedNode {
                kind: NodeKind::Page,
                dir_path: None,
                file_path: Some(file),
            });
        }
        if probe(&base)? == Shape::Dir {
            let index = base.join(INDEX_FILE);
            let file_path = (probe(&index)? == Shape::File).then_some(index);
            return Ok(ResolvedNode {
                kind: NodeKind::Section,
                dir_path: Some(base),
                file_path,
            });
        }

        Err(TreeError::PathNotFound {
            path: base.display().to_string(),
        })
    }

    /// Directory of `parent_id`, created if missing; the parent must be a section
    fn ensure_parent_dir(&self, tree: &Tree, parent_id: &str, op: &str) -> Result<PathBuf> {
        let parent = tree.get_parent(parent_id)?;
        if !parent.is_section() {
            return Err(invalid_op(
                op,
                format!("parent '{}' must be a section, got '{}'", parent_id, parent.kind),
            ));
        }
        let dir = self.base_path(tree, parent_id)?;
        fs::create_dir_all(&dir).map_err(|e| io_error("create_parent_dir", &dir, e))?;
        Ok(dir)
    }
}

/// Fail with `AlreadyExists` if `<base>.md` or `<base>/` is taken
fn ensure_free(base: &Path) -> Result<()> {
    if probe(&page_file(base))? != Shape::Missing || probe(base)? != Shape::Missing {
        return Err(already_exists(base));
    }
    Ok(())
}

fn expect_file(node: &Node, path: &Path) -> Result<()> {
    match probe(path)? {
        Shape::File => Ok(()),
        Shape::Missing => Err(drift(&node.id, node.kind, path, "expected file missing")),
        Shape::Dir => Err(drift(
            &node.id,
            node.kind,
            path,
            "expected file but found folder",
        )),
    }
}

fn expect_dir(node: &Node, path: &Path) -> Result<()> {
    match probe(path)? {
        Shape::Dir => Ok(()),
        Shape::Missing => Err(drift(&node.id, node.kind, path, "expected folder missing")),
        Shape::File => Err(drift(
            &node.id,
            node.kind,
            path,
            "expected folder but found file",
        )),
    }
}

fn holds_only_index(dir: &Path) -> Result<bool> {
    let entries = fs::read_dir(dir).map_err(|e| io_error("read_dir", dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| io_error("read_dir", dir, e))?;
        let is_file = entry
            .file_type()
            .map_err(|e| io_error("read_dir", &entry.path(), e))?
            .is_file();
        if entry.file_name() != INDEX_FILE || !is_file {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Frontmatter of the file at `path`, or empty if it is absent or unreadable
fn existing_frontmatter(path: &Path) -> Frontmatter {
    match fs::read_to_string(path) {
        Ok(raw) => match parse_frontmatter(&raw) {
            Ok(parsed) => parsed.frontmatter,
            Err(err) => {
                debug!(path = %path.display(), error = %err, "discarding unparsable frontmatter");
                Frontmatter::default()
            }
        },
        Err(_) => Frontmatter::default(),
    }
}
