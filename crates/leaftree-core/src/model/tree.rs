use std::collections::{HashMap, HashSet};

use crate::errors::{Result, TreeError};
use crate::model::{Node, NodeDocument, NodeKind, ROOT_ID};

/// Arena holding every node of one content tree, keyed by id
///
/// The root section (`ROOT_ID`) always exists. Structural mutations live in
/// `ops::tree_ops`; this type only offers storage and read access.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    nodes: HashMap<String, Node>,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// A tree containing only the root section
    pub fn new() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(ROOT_ID.to_string(), Node::root());
        Self { nodes }
    }

    /// Map an optional caller-supplied parent id to a concrete one
    ///
    /// Absent, empty and `"root"` all mean the root section.
    pub fn resolve_parent_id(parent_id: Option<&str>) -> &str {
        match parent_id {
            None => ROOT_ID,
            Some(id) if id.is_empty() => ROOT_ID,
            Some(id) => id,
        }
    }

    pub fn root(&self) -> Result<&Node> {
        self.get(ROOT_ID)
    }

    pub fn get(&self, id: &str) -> Result<&Node> {
        self.nodes.get(id).ok_or_else(|| TreeError::NodeNotFound {
            node_id: id.to_string(),
        })
    }

    pub fn get_mut(&mut self, id: &str) -> Result<&mut Node> {
        self.nodes.get_mut(id).ok_or_else(|| TreeError::NodeNotFound {
            node_id: id.to_string(),
        })
    }

    /// Like `get`, but reports a missing node as a missing parent
    pub fn get_parent(&self, parent_id: &str) -> Result<&Node> {
        self.nodes
            .get(parent_id)
            .ok_or_else(|| TreeError::ParentNotFound {
                parent_id: parent_id.to_string(),
            })
    }

    pub fn find(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of nodes including the root
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Raw insert; does not touch the parent's child list
    pub fn insert(&mut self, node: Node) {
        self.nodes.insert(node.id.clone(), node);
    }

    /// Raw removal; does not touch the parent's child list
    pub fn remove(&mut self, id: &str) -> Option<Node> {
        self.nodes.remove(id)
    }

    /// Children of `id` in storage order
    pub fn children(&self, id: &str) -> Result<Vec<&Node>> {
        self.get(id)?
            .children
            .iter()
            .map(|child_id| self.get(child_id))
            .collect()
    }

    /// Children of `id` ordered by position, ties kept in storage order
    pub fn sorted_children(&self, id: &str) -> Result<Vec<&Node>> {
        let mut children = self.children(id)?;
        children.sort_by_key(|child| child.position);
        Ok(children)
    }

    /// The child of `parent_id` whose slug is exactly `slug`
    pub fn child_by_slug(&self, parent_id: &str, slug: &str) -> Option<&Node> {
        self.nodes.get(parent_id)?.children.iter().find_map(|id| {
            self.nodes
                .get(id)
                .filter(|child| child.slug == slug)
        })
    }

    /// Rebuild the arena from a nested document
    ///
    /// Parent back-references are derived from nesting. A root with no
    /// recorded kind is treated as a section.
    pub fn from_document(doc: NodeDocument) -> Result<Tree> {
        if doc.id != ROOT_ID {
            return Err(TreeError::InvariantViolation {
                reason: format!("document root has id '{}', expected '{}'", doc.id, ROOT_ID),
            });
        }

        let mut nodes = HashMap::new();
        let mut stack: Vec<(NodeDocument, Option<String>)> = vec![(doc, None)];

        while let Some((doc, parent_id)) = stack.pop() {
            if nodes.contains_key(&doc.id) {
                return Err(TreeError::InvariantViolation {
                    reason: format!("duplicate node id '{}'", doc.id),
                });
            }

            let mut kind = doc.kind;
            if parent_id.is_none() && !kind.is_known() {
                kind = NodeKind::Section;
            }

            let node = Node {
                id: doc.id.clone(),
                title: doc.title,
                slug: doc.slug,
                kind,
                position: doc.position,
                parent_id,
                children: doc.children.iter().map(|c| c.id.clone()).collect(),
                metadata: doc.metadata,
            };
            nodes.insert(doc.id.clone(), node);

            for child in doc.children.into_iter().rev() {
                stack.push((child, Some(doc.id.clone())));
            }
        }

        Ok(Tree { nodes })
    }

    /// Nested copy of the whole tree in storage order
    pub fn to_document(&self) -> Result<NodeDocument> {
        self.document_of(ROOT_ID, false)
    }

    /// Detached view of the subtree at `id`, children ordered by position
    pub fn view(&self, id: &str) -> Result<NodeDocument> {
        self.document_of(id, true)
    }

    fn document_of(&self, id: &str, by_position: bool) -> Result<NodeDocument> {
        let node = self.get(id)?;
        let children = if by_position {
            self.sorted_children(id)?
        } else {
            self.children(id)?
        };
        let children = children
            .into_iter()
            .map(|child| self.document_of(&child.id, by_position))
            .collect::<Result<Vec<_>>>()?;

        Ok(NodeDocument {
            id: node.id.clone(),
            title: node.title.clone(),
            slug: node.slug.clone(),
            children,
            position: node.position,
            kind: node.kind,
            metadata: node.metadata.clone(),
        })
    }

    /// Make every sibling list contiguous
    ///
    /// Children are ordered by their stored position (stable for ties) and
    /// renumbered `0..n`. Returns how many parents needed fixing.
    pub fn normalize_positions(&mut self) -> usize {
        let parent_ids: Vec<String> = self
            .nodes
            .values()
            .filter(|n| !n.children.is_empty())
            .map(|n| n.id.clone())
            .collect();

        let mut fixed = 0;
        for parent_id in parent_ids {
            let Some(parent) = self.nodes.get(&parent_id) else {
                continue;
            };
            let mut ordered: Vec<(usize, String)> = parent
                .children
                .iter()
                .filter_map(|cid| self.nodes.get(cid).map(|c| (c.position, cid.clone())))
                .collect();
            ordered.sort_by_key(|(position, _)| *position);

            let already_contiguous = ordered.len() == parent.children.len()
                && ordered
                    .iter()
                    .zip(parent.children.iter())
                    .enumerate()
                    .all(|(i, ((pos, cid), stored))| *pos == i && cid == stored);
            if already_contiguous {
                continue;
            }

            fixed += 1;
            let new_order: Vec<String> = ordered.into_iter().map(|(_, cid)| cid).collect();
            for (i, cid) in new_order.iter().enumerate() {
                if let Some(child) = self.nodes.get_mut(cid) {
                    child.position = i;
                }
            }
            if let Some(parent) = self.nodes.get_mut(&parent_id) {
                parent.children = new_order;
            }
        }
        fixed
    }

    /// Ids of `id` and everything below it
    pub fn subtree_ids(&self, id: &str) -> Result<Vec<String>> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![id.to_string()];
        while let Some(current) = stack.pop() {
            if !seen.insert(current.clone()) {
                continue;
            }
            let node = self.get(&current)?;
            stack.extend(node.children.iter().rev().cloned());
            out.push(current);
        }
        Ok(out)
    }
}
