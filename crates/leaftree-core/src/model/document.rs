use serde::{Deserialize, Deserializer, Serialize};

use crate::model::{NodeKind, NodeMetadata};

/// Nested, serializable form of a (sub)tree
///
/// This is the shape of the persisted tree file and of every read-side view
/// handed to callers. Views are detached copies; mutating one has no effect
/// on the tree it was taken from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDocument {
    pub id: String,
    pub title: String,
    pub slug: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub children: Vec<NodeDocument>,
    #[serde(default)]
    pub position: usize,
    #[serde(default)]
    pub kind: NodeKind,
    #[serde(default)]
    pub metadata: NodeMetadata,
}

// Older tree files store `"children": null` for leaf pages.
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<NodeDocument>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<NodeDocument>>::deserialize(deserializer)?.unwrap_or_default())
}

impl NodeDocument {
    /// Depth-first search for a node id within this document
    pub fn find(&self, id: &str) -> Option<&NodeDocument> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    /// Total number of nodes in this document, including itself
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(NodeDocument::count).sum::<usize>()
    }
}
