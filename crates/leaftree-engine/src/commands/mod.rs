//! Command and query dispatch
//!
//! Outer layers (the CLI) describe what they want as a `TreeCommand` or a
//! `TreeQuery` value and hand it to `apply_command` / `apply_query`, which
//! call the matching `TreeService` operation.

pub mod tree_command;
pub mod tree_query;

pub use tree_command::{apply_command, TreeCommand, TreeCommandResult};
pub use tree_query::{apply_query, TreeQuery, TreeQueryResult};
