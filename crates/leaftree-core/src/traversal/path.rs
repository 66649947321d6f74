use serde::Serialize;

use crate::errors::{Result, TreeError};
use crate::model::{Node, NodeKind, Tree, ROOT_ID};

/// One segment of a looked-up path
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathSegment {
    pub slug: String,
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<NodeKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Result of walking a slug path as far as it exists
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathLookup {
    pub path: String,
    pub segments: Vec<PathSegment>,
    pub exists: bool,
}

impl PathLookup {
    /// The deepest segment that resolved to a node
    pub fn last_existing(&self) -> Option<&PathSegment> {
        self.segments.iter().rev().find(|s| s.exists)
    }
}

/// Canonical form of a slug path
///
/// Surrounding whitespace and slashes are dropped and runs of slashes
/// collapse to one.
pub fn normalize_route_path(path: &str) -> String {
    path.trim()
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Resolve a slug path such as `docs/setup/install` to its node
pub fn find_by_path<'a>(tree: &'a Tree, path: &str) -> Result<&'a Node> {
    let normalized = normalize_route_path(path);
    let not_found = || TreeError::PathNotFound {
        path: normalized.clone(),
    };
    if normalized.is_empty() {
        return Err(not_found());
    }

    let mut current = tree.root()?;
    for segment in normalized.split('/') {
        current = tree
            .child_by_slug(&current.id, segment)
            .ok_or_else(not_found)?;
    }
    Ok(current)
}

/// Walk a slug path segment by segment, reporting which parts exist
///
/// Once one segment is missing every later segment is reported missing.
/// Empty paths and `.`/`..` segments are rejected.
pub fn lookup_path(tree: &Tree, path: &str) -> Result<PathLookup> {
    let normalized = normalize_route_path(path);
    if normalized.is_empty() {
        return Err(TreeError::InvalidPath {
            path: path.to_string(),
            reason: "path is empty".to_string(),
        });
    }

    let mut segments = Vec::new();
    let mut parent_id = Some(ROOT_ID.to_string());

    for slug in normalized.split('/') {
        if slug == "." || slug == ".." {
            return Err(TreeError::InvalidPath {
                path: path.to_string(),
                reason: format!("relative segment '{}' not allowed", slug),
            });
        }

        let found = parent_id
            .as_deref()
            .and_then(|pid| tree.child_by_slug(pid, slug));

        match found {
            Some(node) => {
                segments.push(PathSegment {
                    slug: slug.to_string(),
                    exists: true,
                    id: Some(node.id.clone()),
                    kind: Some(node.kind),
                    title: Some(node.title.clone()),
                });
                parent_id = Some(node.id.clone());
            }
            None => {
                segments.push(PathSegment {
                    slug: slug.to_string(),
                    exists: false,
                    id: None,
                    kind: None,
                    title: None,
                });
                parent_id = None;
            }
        }
    }

    let exists = segments.iter().all(|s| s.exists);
    Ok(PathLookup {
        path: normalized,
        segments,
        exists,
    })
}
