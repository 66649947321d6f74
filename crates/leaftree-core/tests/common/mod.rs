use leaftree_core::ops::attach_child;
use leaftree_core::{Node, NodeKind, Tree, ROOT_ID};

/// Attach a section under `parent_id`; the id doubles as the slug
#[allow(dead_code)]
pub fn add_section(tree: &mut Tree, parent_id: &str, id: &str) {
    attach_child(tree, parent_id, Node::new(id, id.to_uppercase(), id, NodeKind::Section))
        .unwrap();
}

/// Attach a page under `parent_id`; the id doubles as the slug
#[allow(dead_code)]
pub fn add_page(tree: &mut Tree, parent_id: &str, id: &str) {
    attach_child(tree, parent_id, Node::new(id, id.to_uppercase(), id, NodeKind::Page)).unwrap();
}

/// root
/// ├── docs/
/// │   ├── intro
/// │   └── guides/
/// │       └── setup
/// └── about
#[allow(dead_code)]
pub fn sample_tree() -> Tree {
    let mut tree = Tree::new();
    add_section(&mut tree, ROOT_ID, "docs");
    add_page(&mut tree, "docs", "intro");
    add_section(&mut tree, "docs", "guides");
    add_page(&mut tree, "guides", "setup");
    add_page(&mut tree, ROOT_ID, "about");
    tree
}

/// Child ids of `parent_id` in position order
#[allow(dead_code)]
pub fn child_ids(tree: &Tree, parent_id: &str) -> Vec<String> {
    tree.sorted_children(parent_id)
        .unwrap()
        .into_iter()
        .map(|n| n.id.clone())
        .collect()
}
