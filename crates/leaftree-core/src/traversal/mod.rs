pub mod ancestry;
pub mod path;

pub use ancestry::{compute_ancestry, is_descendant, node_path};
pub use path::{find_by_path, lookup_path, normalize_route_path, PathLookup, PathSegment};
