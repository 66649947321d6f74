use crate::model::{NodeKind, NodeMetadata};

/// Identifier of the synthetic root section
pub const ROOT_ID: &str = "root";

/// A node of the content tree
///
/// Nodes live in the `Tree` arena and refer to each other by id: `parent_id`
/// is a back-reference, `children` is the owned, ordered list of child ids.
/// `position` is the node's index among its siblings.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub kind: NodeKind,
    pub position: usize,
    pub parent_id: Option<String>,
    pub children: Vec<String>,
    pub metadata: NodeMetadata,
}

impl Node {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        slug: impl Into<String>,
        kind: NodeKind,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            slug: slug.into(),
            kind,
            position: 0,
            parent_id: None,
            children: Vec::new(),
            metadata: NodeMetadata::default(),
        }
    }

    /// The root section
    pub fn root() -> Self {
        Node::new(ROOT_ID, "root", "root", NodeKind::Section)
    }

    pub fn with_metadata(mut self, metadata: NodeMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn is_root(&self) -> bool {
        self.id == ROOT_ID
    }

    pub fn is_page(&self) -> bool {
        self.kind == NodeKind::Page
    }

    pub fn is_section(&self) -> bool {
        self.kind == NodeKind::Section
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}
