pub mod tree_ops;

pub use tree_ops::{
    apply_sort_order, attach_child, detach_child, new_node_id, reindex_positions, remove_subtree,
    rename_node, reparent, set_kind,
};
