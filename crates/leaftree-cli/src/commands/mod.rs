//! Subcommand implementations
//!
//! `read` holds the query commands, `write` the mutating ones. Both build a
//! `TreeService` over `--storage-dir` and print their result as JSON.

pub mod read;
pub mod write;

use clap::ValueEnum;
use leaftree_core::NodeKind;
use leaftree_engine::{TreeService, TreeServiceConfig};
use serde::Serialize;

use crate::GlobalArgs;

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Page,
    Section,
}

impl From<KindArg> for NodeKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Page => NodeKind::Page,
            KindArg::Section => NodeKind::Section,
        }
    }
}

pub fn open_service(global: &GlobalArgs) -> Result<TreeService, Box<dyn std::error::Error>> {
    tracing::debug!(storage_dir = %global.storage_dir.display(), "opening storage");
    let config = TreeServiceConfig::with_storage_dir(&global.storage_dir);
    Ok(TreeService::open(config)?)
}

pub fn print_json<T: Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
