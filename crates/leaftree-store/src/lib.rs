//! LeafTree Store - filesystem persistence for the content tree
//!
//! Provides:
//! - `NodeStore`: verify-then-act filesystem effects for single nodes
//! - The persisted tree document and schema version marker
//! - Schema migrations for trees written by older layouts
//! - Offline reconstruction of a tree from the content directory

pub mod atomic;
pub mod errors;
pub mod markdown_file;
pub mod migrations;
pub mod node_store;
pub mod reconstruct;
pub mod repo;
pub mod schema;
pub mod tree_file;

// Re-export key types
pub use errors::Result;
pub use migrations::MigrationReport;
pub use node_store::{NodeStore, CONTENT_ROOT, INDEX_FILE};
pub use reconstruct::Reconstruction;
pub use repo::TreeRepository;
pub use schema::CURRENT_SCHEMA_VERSION;
