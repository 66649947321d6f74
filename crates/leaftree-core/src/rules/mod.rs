pub mod invariants;
pub mod validation;

pub use validation::{validate_move, validate_move_structure, validate_slug_available, validate_sort_order, validate_tree};
