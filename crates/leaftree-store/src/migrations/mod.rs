//! Schema migrations
//!
//! Each step upgrades the tree document and the content files by one
//! schema version. The runner persists the tree and the version marker
//! after every step so an interrupted upgrade resumes where it stopped.

pub mod backfill_frontmatter;
pub mod backfill_kinds;
pub mod backfill_metadata;
pub mod runner;

pub use runner::{run_migrations, MigrationReport};
