//! Read-only queries
//!
//! `apply_query` never writes to the tree document or the content
//! directory.

use leaftree_core::{NodeDocument, PathLookup, Result};
use serde::Serialize;

use crate::service::{Page, TreeService};

#[derive(Debug, Clone, PartialEq)]
pub enum TreeQuery {
    /// The whole tree
    Tree,
    /// A node view by id
    Node { node_id: String },
    /// A node with its body, by id
    Page { node_id: String },
    /// A node with its body, by slug path
    PageByPath { path: String },
    LookupPath { path: String },
    TreeHash,
    SuggestSlug {
        parent_id: Option<String>,
        current_id: Option<String>,
        title: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TreeQueryResult {
    Tree(NodeDocument),
    Node(NodeDocument),
    Page(Box<Page>),
    Lookup(PathLookup),
    TreeHash { tree_hash: String },
    Slug { slug: String },
}

pub fn apply_query(service: &TreeService, query: TreeQuery) -> Result<TreeQueryResult> {
    match query {
        TreeQuery::Tree => Ok(TreeQueryResult::Tree(service.tree()?)),
        TreeQuery::Node { node_id } => Ok(TreeQueryResult::Node(service.get_node(&node_id)?)),
        TreeQuery::Page { node_id } => {
            Ok(TreeQueryResult::Page(Box::new(service.get_page(&node_id)?)))
        }
        TreeQuery::PageByPath { path } => Ok(TreeQueryResult::Page(Box::new(
            service.find_page_by_path(&path)?,
        ))),
        TreeQuery::LookupPath { path } => Ok(TreeQueryResult::Lookup(service.lookup_path(&path)?)),
        TreeQuery::TreeHash => Ok(TreeQueryResult::TreeHash {
            tree_hash: service.tree_hash()?,
        }),
        TreeQuery::SuggestSlug {
            parent_id,
            current_id,
            title,
        } => Ok(TreeQueryResult::Slug {
            slug: service.suggest_slug(parent_id.as_deref(), current_id.as_deref(), &title)?,
        }),
    }
}
