pub mod document;
pub mod kind;
pub mod metadata;
pub mod node;
pub mod tree;

pub use document::NodeDocument;
pub use kind::NodeKind;
pub use metadata::NodeMetadata;
pub use node::{Node, ROOT_ID};
pub use tree::Tree;
