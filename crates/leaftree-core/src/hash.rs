//! Structural hash of a (sub)tree.
//!
//! Used by collaborators as an optimistic-concurrency token: an operation
//! planned against hash H is refused once the tree no longer hashes to H.
//!
//! ## Encoding
//!
//! Every scalar field is written as `tag (1 byte) | length (u64 BE) | bytes`.
//! Children are hashed recursively, sorted by `(position, id)`, and each
//! child digest is framed by begin/end markers so that one large child can
//! never encode the same as several small ones. The parent back-reference
//! is never part of the input.
//!
//! ## Determinism Guarantees
//!
//! - Same tree → same digest, across calls and processes
//! - Storage order of children does not matter, positions do
//! - Missing timestamps encode as 0

use sha2::{Digest, Sha256};

use crate::errors::Result;
use crate::model::{Node, NodeMetadata, Tree, ROOT_ID};

const TAG_ID: u8 = 0x01;
const TAG_TITLE: u8 = 0x02;
const TAG_SLUG: u8 = 0x03;
const TAG_KIND: u8 = 0x04;
const TAG_POSITION: u8 = 0x05;
const TAG_CREATED_AT: u8 = 0x06;
const TAG_UPDATED_AT: u8 = 0x07;
const CHILDREN_BEGIN: u8 = 0x10;
const CHILD_BEGIN: u8 = 0x11;
const CHILD_END: u8 = 0x12;
const CHILDREN_END: u8 = 0x13;

/// What goes into the hash besides structure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashOptions {
    pub include_timestamps: bool,
}

impl Default for HashOptions {
    fn default() -> Self {
        Self {
            include_timestamps: true,
        }
    }
}

impl HashOptions {
    /// Ignore metadata timestamps
    pub fn structure_only() -> Self {
        Self {
            include_timestamps: false,
        }
    }
}

/// Hex-encoded SHA-256 over the whole tree
pub fn tree_hash(tree: &Tree, options: HashOptions) -> Result<String> {
    subtree_hash(tree, ROOT_ID, options)
}

/// Hex-encoded SHA-256 over `node_id` and its descendants
///
/// # Errors
/// `NodeNotFound` if `node_id` or any listed child is missing.
pub fn subtree_hash(tree: &Tree, node_id: &str, options: HashOptions) -> Result<String> {
    Ok(hex::encode(node_digest(tree, tree.get(node_id)?, options)?))
}

fn node_digest(tree: &Tree, node: &Node, options: HashOptions) -> Result<[u8; 32]> {
    let mut hasher = Sha256::new();

    write_field(&mut hasher, TAG_ID, node.id.as_bytes());
    write_field(&mut hasher, TAG_TITLE, node.title.as_bytes());
    write_field(&mut hasher, TAG_SLUG, node.slug.as_bytes());
    write_field(&mut hasher, TAG_KIND, node.kind.as_str().as_bytes());
    write_field(
        &mut hasher,
        TAG_POSITION,
        &(node.position as u64).to_be_bytes(),
    );

    if options.include_timestamps {
        let (created, updated) = epoch_millis(&node.metadata);
        write_field(&mut hasher, TAG_CREATED_AT, &created.to_be_bytes());
        write_field(&mut hasher, TAG_UPDATED_AT, &updated.to_be_bytes());
    }

    let mut children = tree.children(&node.id)?;
    children.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.id.cmp(&b.id)));

    hasher.update([CHILDREN_BEGIN]);
    hasher.update((children.len() as u64).to_be_bytes());
    for child in children {
        let digest = node_digest(tree, child, options)?;
        hasher.update([CHILD_BEGIN]);
        hasher.update(digest);
        hasher.update([CHILD_END]);
    }
    hasher.update([CHILDREN_END]);

    let mut digest = [0u8; 32];
    digest.copy_from_slice(&hasher.finalize());
    Ok(digest)
}

fn write_field(hasher: &mut Sha256, tag: u8, value: &[u8]) {
    hasher.update([tag]);
    hasher.update((value.len() as u64).to_be_bytes());
    hasher.update(value);
}

fn epoch_millis(metadata: &NodeMetadata) -> (i64, i64) {
    let millis = |ts: &Option<chrono::DateTime<chrono::Utc>>| {
        ts.map(|t| t.timestamp_millis()).unwrap_or(0)
    };
    (millis(&metadata.created_at), millis(&metadata.updated_at))
}
