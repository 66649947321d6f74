//! The tree service
//!
//! Holds the canonical tree behind a single `RwLock`. Mutations take the
//! write lock for their whole duration, filesystem effects included, so
//! the tree and the disk never change under a concurrent reader. Each
//! mutation runs its in-memory checks first, then the node store effect,
//! then updates the tree and saves it.
//!
//! The `*_with_hash` variants also return the tree hash of what was saved,
//! computed before the write lock is released.

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Utc;
use leaftree_core::ops::{
    apply_sort_order, attach_child, new_node_id, remove_subtree, rename_node, reparent, set_kind,
};
use leaftree_core::rules::{validate_move_structure, validate_slug_available, validate_tree};
use leaftree_core::slug::{unique_slug, validate_slug};
use leaftree_core::traversal::{find_by_path, lookup_path, node_path};
use leaftree_core::{
    log_op_end, log_op_error, log_op_start, tree_hash, HashOptions, Node, NodeDocument, NodeKind,
    NodeMetadata, PathLookup, Result, Tree, TreeError, ROOT_ID,
};
use leaftree_store::{NodeStore, TreeRepository, CURRENT_SCHEMA_VERSION};
use parking_lot::RwLock;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::TreeServiceConfig;

/// A node together with its content body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    #[serde(flatten)]
    pub node: NodeDocument,
    /// Slug path from the root, e.g. `docs/setup`
    pub path: String,
    /// Body with the frontmatter block stripped
    pub content: String,
}

/// Outcome of `ensure_path`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnsurePathResult {
    /// The node at the end of the path
    pub node: NodeDocument,
    /// Nodes created along the way, root-most first, without children
    pub created: Vec<NodeDocument>,
    /// True when the whole path existed already
    pub existed: bool,
}

/// Outcome of `reconstruct_from_fs`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RebuildReport {
    pub nodes: usize,
    pub skipped: Vec<PathBuf>,
    pub ids_written: usize,
}

pub struct TreeService {
    config: TreeServiceConfig,
    repo: TreeRepository,
    tree: RwLock<Tree>,
}

impl TreeService {
    /// Load (or start) the tree under `config.storage_dir`
    ///
    /// Older layouts are migrated in place. Sibling positions are
    /// renumbered if the stored document has gaps or duplicates.
    pub fn open(config: TreeServiceConfig) -> Result<Self> {
        log_op_start!("open", path = %config.storage_dir.display());
        let start = Instant::now();
        let result = Self::load(config);
        finish("open", start, result)
    }

    fn load(config: TreeServiceConfig) -> Result<Self> {
        let repo = TreeRepository::new(
            &config.storage_dir,
            &config.tree_filename,
            &config.schema_filename,
        );
        repo.ensure_storage_dir()?;

        let mut tree = repo.load_tree()?;
        if !repo.has_tree_document() && repo.schema_version()? == 0 {
            // Fresh storage: nothing to migrate
            repo.set_schema_version(CURRENT_SCHEMA_VERSION)?;
        } else {
            let report = repo.migrate(&mut tree)?;
            if !report.is_noop() {
                info!(
                    from = report.from_version,
                    to = report.to_version,
                    steps = report.applied.len(),
                    "migrated storage"
                );
            }
        }

        let fixed = tree.normalize_positions();
        if fixed > 0 {
            warn!(parents = fixed, "normalized sibling positions at load");
            repo.save_tree(&tree)?;
        }
        if let Err(err) = validate_tree(&tree) {
            warn!(error = %err, "loaded tree violates an invariant");
        }

        Ok(Self {
            config,
            repo,
            tree: RwLock::new(tree),
        })
    }

    pub fn config(&self) -> &TreeServiceConfig {
        &self.config
    }

    pub fn storage_dir(&self) -> &Path {
        self.repo.storage_dir()
    }

    fn store(&self) -> &NodeStore {
        self.repo.node_store()
    }

    // ===== Mutations =====

    /// Create a page or section under `parent_id` (root when `None`)
    ///
    /// A page parent is converted to a section first. Returns the new id.
    pub fn create_node(
        &self,
        user_id: &str,
        parent_id: Option<&str>,
        title: &str,
        slug: &str,
        kind: NodeKind,
    ) -> Result<String> {
        self.create_node_with_hash(user_id, parent_id, title, slug, kind)
            .map(|(id, _)| id)
    }

    /// `create_node`, returning `(id, tree_hash)`
    pub fn create_node_with_hash(
        &self,
        user_id: &str,
        parent_id: Option<&str>,
        title: &str,
        slug: &str,
        kind: NodeKind,
    ) -> Result<(String, String)> {
        let parent_id = Tree::resolve_parent_id(parent_id);
        log_op_start!("create_node", parent_id = parent_id, slug = slug, kind = %kind);
        let start = Instant::now();

        let result = (|| -> Result<(String, String)> {
            let mut tree = self.tree.write();
            let id = self.create_locked(&mut tree, user_id, parent_id, title, slug, kind)?;
            let hash = self.persist(&mut tree)?;
            Ok((id, hash))
        })();

        finish("create_node", start, result)
    }

    /// Change title and slug, and optionally replace the content body
    pub fn update_node(
        &self,
        user_id: &str,
        id: &str,
        title: &str,
        slug: &str,
        content: Option<&str>,
    ) -> Result<()> {
        self.update_node_with_hash(user_id, id, title, slug, content)
            .map(|_| ())
    }

    /// `update_node`, returning the tree hash
    pub fn update_node_with_hash(
        &self,
        user_id: &str,
        id: &str,
        title: &str,
        slug: &str,
        content: Option<&str>,
    ) -> Result<String> {
        log_op_start!("update_node", node_id = id, slug = slug);
        let start = Instant::now();

        let result = (|| -> Result<String> {
            let mut tree = self.tree.write();
            if id == ROOT_ID {
                return Err(TreeError::invalid_op("update_node", "the root cannot be updated"));
            }
            let node = tree.get(id)?;
            let slug_changed = node.slug != slug;
            let parent_id = node.parent_id.clone();

            if slug_changed {
                validate_slug(slug)?;
                if let Some(parent_id) = parent_id.as_deref() {
                    validate_slug_available(&tree, parent_id, slug, Some(id))?;
                }
            }

            if let Some(content) = content {
                self.store().upsert_content(&tree, id, content)?;
            }
            if slug_changed {
                self.store().rename_node(&tree, id, slug)?;
            }
            rename_node(&mut tree, id, title, slug)?;
            tree.get_mut(id)?.metadata.touch(user_id, Utc::now());

            self.store().sync_metadata_if_exists(&tree, id)?;
            self.persist(&mut tree)
        })();

        finish("update_node", start, result)
    }

    /// Move a node to the end of `parent_id`'s children (root when `None`)
    ///
    /// A page destination is converted to a section first.
    pub fn move_node(&self, user_id: &str, id: &str, parent_id: Option<&str>) -> Result<()> {
        self.move_node_with_hash(user_id, id, parent_id).map(|_| ())
    }

    /// `move_node`, returning the tree hash
    pub fn move_node_with_hash(
        &self,
        user_id: &str,
        id: &str,
        parent_id: Option<&str>,
    ) -> Result<String> {
        let parent_id = Tree::resolve_parent_id(parent_id);
        log_op_start!("move_node", node_id = id, parent_id = parent_id);
        let start = Instant::now();

        let result = (|| -> Result<String> {
            let mut tree = self.tree.write();
            validate_move_structure(&tree, id, parent_id)?;

            let promoted = self.promote_parent_if_page(&mut tree, parent_id, "move_node")?;
            if let Err(err) = self.store().move_node(&tree, id, parent_id) {
                if promoted {
                    self.save_after_failure(&tree);
                }
                return Err(err);
            }

            reparent(&mut tree, id, parent_id)?;
            tree.get_mut(id)?.metadata.touch(user_id, Utc::now());
            self.persist(&mut tree)
        })();

        finish("move_node", start, result)
    }

    /// Delete a node; nodes with children need `recursive`
    pub fn delete_node(&self, user_id: &str, id: &str, recursive: bool) -> Result<()> {
        self.delete_node_with_hash(user_id, id, recursive).map(|_| ())
    }

    /// `delete_node`, returning the tree hash
    pub fn delete_node_with_hash(&self, user_id: &str, id: &str, recursive: bool) -> Result<String> {
        log_op_start!("delete_node", node_id = id, user_id = user_id, recursive = recursive);
        let start = Instant::now();

        let result = (|| -> Result<String> {
            let mut tree = self.tree.write();
            if id == ROOT_ID {
                return Err(TreeError::invalid_op("delete_node", "the root cannot be deleted"));
            }
            let node = tree.get(id)?;
            if node.has_children() && !recursive {
                return Err(TreeError::HasChildren {
                    node_id: id.to_string(),
                    child_count: node.children.len(),
                });
            }

            match node.kind {
                NodeKind::Section => self.store().delete_section(&tree, id)?,
                NodeKind::Page | NodeKind::Unknown => self.store().delete_page(&tree, id)?,
            }

            let removed = remove_subtree(&mut tree, id)?;
            info!(node_id = id, removed = removed.len(), "deleted node");
            self.persist(&mut tree)
        })();

        finish("delete_node", start, result)
    }

    /// Reorder the children of `parent_id` to exactly `ordered_ids`
    pub fn sort_children(&self, parent_id: Option<&str>, ordered_ids: &[String]) -> Result<()> {
        self.sort_children_with_hash(parent_id, ordered_ids).map(|_| ())
    }

    /// `sort_children`, returning the tree hash
    pub fn sort_children_with_hash(
        &self,
        parent_id: Option<&str>,
        ordered_ids: &[String],
    ) -> Result<String> {
        let parent_id = Tree::resolve_parent_id(parent_id);
        log_op_start!("sort_children", parent_id = parent_id, child_count = ordered_ids.len());
        let start = Instant::now();

        let result = (|| -> Result<String> {
            let mut tree = self.tree.write();
            apply_sort_order(&mut tree, parent_id, ordered_ids)?;
            self.persist(&mut tree)
        })();

        finish("sort_children", start, result)
    }

    /// Switch a node between page and section
    ///
    /// No-op when the kind is unchanged. A section with children cannot
    /// become a page.
    pub fn convert_node(&self, user_id: &str, id: &str, kind: NodeKind) -> Result<()> {
        self.convert_node_with_hash(user_id, id, kind).map(|_| ())
    }

    /// `convert_node`, returning the tree hash
    pub fn convert_node_with_hash(&self, user_id: &str, id: &str, kind: NodeKind) -> Result<String> {
        log_op_start!("convert_node", node_id = id, kind = %kind);
        let start = Instant::now();

        let result = (|| -> Result<String> {
            let mut tree = self.tree.write();
            if id == ROOT_ID {
                return Err(TreeError::invalid_op("convert_node", "the root is always a section"));
            }
            let node = tree.get(id)?;
            if node.kind == kind {
                return tree_hash(&tree, HashOptions::default());
            }
            if !kind.is_known() {
                return Err(TreeError::invalid_op(
                    "convert_node",
                    "target kind must be page or section",
                ));
            }
            if kind == NodeKind::Page && node.has_children() {
                return Err(TreeError::HasChildren {
                    node_id: id.to_string(),
                    child_count: node.children.len(),
                });
            }

            info!(node_id = id, from = %node.kind, to = %kind, "changing node kind");
            self.store().convert_kind(&tree, id, kind)?;
            set_kind(&mut tree, id, kind)?;
            tree.get_mut(id)?.metadata.touch(user_id, Utc::now());

            self.store().sync_metadata_if_exists(&tree, id)?;
            self.persist(&mut tree)
        })();

        finish("convert_node", start, result)
    }

    /// Make sure every segment of `path` exists
    ///
    /// Missing intermediate segments become sections titled by their slug;
    /// a missing last segment gets `title` and `kind`. The tree is saved
    /// once at the end.
    pub fn ensure_path(
        &self,
        user_id: &str,
        path: &str,
        title: &str,
        kind: NodeKind,
    ) -> Result<EnsurePathResult> {
        self.ensure_path_with_hash(user_id, path, title, kind)
            .map(|(outcome, _)| outcome)
    }

    /// `ensure_path`, returning `(outcome, tree_hash)`
    pub fn ensure_path_with_hash(
        &self,
        user_id: &str,
        path: &str,
        title: &str,
        kind: NodeKind,
    ) -> Result<(EnsurePathResult, String)> {
        log_op_start!("ensure_path", path = path, kind = %kind);
        let start = Instant::now();

        let result = (|| -> Result<(EnsurePathResult, String)> {
            let mut tree = self.tree.write();
            let lookup = lookup_path(&tree, path)?;

            if lookup.exists {
                let node = find_by_path(&tree, &lookup.path)?;
                let outcome = EnsurePathResult {
                    node: tree.view(&node.id)?,
                    created: Vec::new(),
                    existed: true,
                };
                return Ok((outcome, tree_hash(&tree, HashOptions::default())?));
            }

            for segment in lookup.segments.iter().filter(|s| !s.exists) {
                validate_slug(&segment.slug)?;
            }

            let mut created = Vec::new();
            let outcome = self.create_missing_segments(
                &mut tree,
                user_id,
                &lookup,
                title,
                kind,
                &mut created,
            );
            let last_id = match outcome {
                Ok(last_id) => last_id,
                Err(err) => {
                    if !created.is_empty() {
                        self.save_after_failure(&tree);
                    }
                    return Err(err);
                }
            };

            let hash = self.persist(&mut tree)?;

            let created = created
                .iter()
                .map(|id| -> Result<NodeDocument> {
                    let mut doc = tree.view(id)?;
                    doc.children.clear();
                    Ok(doc)
                })
                .collect::<Result<Vec<_>>>()?;

            let outcome = EnsurePathResult {
                node: tree.view(&last_id)?,
                created,
                existed: false,
            };
            Ok((outcome, hash))
        })();

        finish("ensure_path", start, result)
    }

    /// Replace the tree with one rebuilt from the content directory
    ///
    /// The only way to recover from drift. The rebuilt tree is saved and
    /// the schema marker set to the current version.
    pub fn reconstruct_from_fs(&self) -> Result<RebuildReport> {
        self.reconstruct_from_fs_with_hash().map(|(report, _)| report)
    }

    /// `reconstruct_from_fs`, returning `(report, tree_hash)`
    pub fn reconstruct_from_fs_with_hash(&self) -> Result<(RebuildReport, String)> {
        log_op_start!("reconstruct_from_fs");
        let start = Instant::now();

        let result = (|| -> Result<(RebuildReport, String)> {
            let mut tree = self.tree.write();
            let rebuilt = self.repo.reconstruct()?;
            *tree = rebuilt.tree;
            let hash = self.persist(&mut tree)?;
            self.repo.set_schema_version(CURRENT_SCHEMA_VERSION)?;

            let report = RebuildReport {
                nodes: tree.len(),
                skipped: rebuilt.skipped,
                ids_written: rebuilt.ids_written,
            };
            Ok((report, hash))
        })();

        finish("reconstruct_from_fs", start, result)
    }

    // ===== Reads =====

    /// Detached view of a node and its subtree, children by position
    pub fn get_node(&self, id: &str) -> Result<NodeDocument> {
        log_op_start!("get_node", node_id = id);
        let start = Instant::now();
        let result = self.tree.read().view(id);
        finish("get_node", start, result)
    }

    /// A node with its content body
    pub fn get_page(&self, id: &str) -> Result<Page> {
        log_op_start!("get_page", node_id = id);
        let start = Instant::now();

        let result = (|| -> Result<Page> {
            let tree = self.tree.read();
            self.page_locked(&tree, id)
        })();

        finish("get_page", start, result)
    }

    /// The page at slug path `path`
    pub fn find_page_by_path(&self, path: &str) -> Result<Page> {
        log_op_start!("find_page_by_path", path = path);
        let start = Instant::now();

        let result = (|| -> Result<Page> {
            let tree = self.tree.read();
            let id = find_by_path(&tree, path)?.id.clone();
            self.page_locked(&tree, &id)
        })();

        finish("find_page_by_path", start, result)
    }

    /// Per-segment existence report for `path`
    pub fn lookup_path(&self, path: &str) -> Result<PathLookup> {
        log_op_start!("lookup_path", path = path);
        let start = Instant::now();
        let result = lookup_path(&self.tree.read(), path);
        finish("lookup_path", start, result)
    }

    /// The whole tree, children ordered by position
    pub fn tree(&self) -> Result<NodeDocument> {
        log_op_start!("get_tree");
        let start = Instant::now();
        let result = self.tree.read().view(ROOT_ID);
        finish("get_tree", start, result)
    }

    /// Structural hash of the whole tree, timestamps included
    pub fn tree_hash(&self) -> Result<String> {
        log_op_start!("tree_hash");
        let start = Instant::now();
        let result = tree_hash(&self.tree.read(), HashOptions::default());
        finish("tree_hash", start, result)
    }

    /// A free, valid slug for `title` under `parent_id`
    pub fn suggest_slug(
        &self,
        parent_id: Option<&str>,
        current_id: Option<&str>,
        title: &str,
    ) -> Result<String> {
        let parent_id = Tree::resolve_parent_id(parent_id);
        let tree = self.tree.read();
        tree.get_parent(parent_id)?;
        Ok(unique_slug(&tree, parent_id, current_id, title))
    }

    // ===== Internals =====

    fn create_locked(
        &self,
        tree: &mut Tree,
        user_id: &str,
        parent_id: &str,
        title: &str,
        slug: &str,
        kind: NodeKind,
    ) -> Result<String> {
        if !kind.is_known() {
            return Err(TreeError::invalid_op(
                "create_node",
                "kind must be page or section",
            ));
        }
        validate_slug(slug)?;
        tree.get_parent(parent_id)?;
        validate_slug_available(tree, parent_id, slug, None)?;

        let promoted = self.promote_parent_if_page(tree, parent_id, "create_node")?;

        let node = Node::new(new_node_id(), title, slug, kind)
            .with_metadata(NodeMetadata::created_by(user_id, Utc::now()));
        let created = match kind {
            NodeKind::Section => self.store().create_section(tree, parent_id, &node),
            _ => self.store().create_page(tree, parent_id, &node),
        };
        if let Err(err) = created {
            if promoted {
                self.save_after_failure(tree);
            }
            return Err(err);
        }

        let id = node.id.clone();
        attach_child(tree, parent_id, node)?;
        Ok(id)
    }

    fn create_missing_segments(
        &self,
        tree: &mut Tree,
        user_id: &str,
        lookup: &PathLookup,
        title: &str,
        kind: NodeKind,
        created: &mut Vec<String>,
    ) -> Result<String> {
        let mut current = ROOT_ID.to_string();
        let last = lookup.segments.len().saturating_sub(1);

        for (i, segment) in lookup.segments.iter().enumerate() {
            if let (true, Some(id)) = (segment.exists, segment.id.as_ref()) {
                current = id.clone();
                continue;
            }
            let (segment_title, segment_kind) = if i == last {
                (title, kind)
            } else {
                (segment.slug.as_str(), NodeKind::Section)
            };
            current = self.create_locked(
                tree,
                user_id,
                &current,
                segment_title,
                &segment.slug,
                segment_kind,
            )?;
            created.push(current.clone());
        }
        Ok(current)
    }

    /// Convert `parent_id` to a section if it is a page
    ///
    /// Returns whether a conversion happened. Parents of unknown kind are
    /// rejected.
    fn promote_parent_if_page(&self, tree: &mut Tree, parent_id: &str, op: &str) -> Result<bool> {
        let kind = tree.get_parent(parent_id)?.kind;
        match kind {
            NodeKind::Section => Ok(false),
            NodeKind::Page => {
                info!(node_id = parent_id, "converting parent page to section");
                self.store().convert_kind(tree, parent_id, NodeKind::Section)?;
                set_kind(tree, parent_id, NodeKind::Section)?;
                Ok(true)
            }
            NodeKind::Unknown => Err(TreeError::invalid_op(
                op,
                format!("parent '{}' has unknown kind", parent_id),
            )),
        }
    }

    fn page_locked(&self, tree: &Tree, id: &str) -> Result<Page> {
        Ok(Page {
            node: tree.view(id)?,
            path: node_path(tree, id)?,
            content: self.store().read_content(tree, id)?,
        })
    }

    /// Renumber positions and save; returns the hash of the saved tree
    ///
    /// The hash is computed before saving so a tree that cannot be hashed
    /// is never written.
    fn persist(&self, tree: &mut Tree) -> Result<String> {
        let fixed = tree.normalize_positions();
        if fixed > 0 {
            warn!(parents = fixed, "renumbered sibling positions before save");
        }
        let hash = tree_hash(tree, HashOptions::default())?;
        self.repo.save_tree(tree)?;
        Ok(hash)
    }

    /// Save after a failure that happened once the disk had already changed
    fn save_after_failure(&self, tree: &Tree) {
        if let Err(err) = self.repo.save_tree(tree) {
            error!(error = %err, "could not persist tree after failed operation");
        }
    }
}

fn finish<T>(op: &'static str, start: Instant, result: Result<T>) -> Result<T> {
    let elapsed = start.elapsed().as_millis() as u64;
    match &result {
        Ok(_) => {
            log_op_end!(op, duration_ms = elapsed);
        }
        Err(e) => {
            let e_clone = e.clone();
            log_op_error!(op, e_clone, duration_ms = elapsed);
        }
    }
    result
}
