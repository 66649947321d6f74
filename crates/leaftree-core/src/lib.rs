//! LeafTree Core - in-memory model of a wiki content tree
//!
//! This crate holds everything about the tree that does not touch the disk:
//! - `Node`/`Tree` arena model and its persisted `NodeDocument` form
//! - Structural mutations (`ops`) and the invariants they preserve (`rules`)
//! - Ancestry and slug-path traversal
//! - Slug normalization and collision resolution
//! - YAML frontmatter parsing and rendering for page files
//! - The structural hash used as an optimistic-concurrency token
//! - The error facility and structured logging shared by the other crates

pub mod errors;
pub mod hash;
pub mod logging_facility;
pub mod markdown;
pub mod model;
pub mod ops;
pub mod rules;
pub mod slug;
pub mod traversal;

// Re-export commonly used types
pub use errors::{ExError, ExErrorKind, Result, TreeError};
pub use hash::{subtree_hash, tree_hash, HashOptions};
pub use model::{Node, NodeDocument, NodeKind, NodeMetadata, Tree, ROOT_ID};
pub use traversal::{PathLookup, PathSegment};
