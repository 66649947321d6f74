//! Query commands
//!
//! Usage: leaftree tree | show <ID> | show --path <PATH> | lookup <PATH> | hash

use clap::Args;
use leaftree_engine::commands::{apply_query, TreeQuery};

use super::{open_service, print_json, CliResult};
use crate::GlobalArgs;

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Node id
    #[arg(required_unless_present = "path", conflicts_with = "path")]
    pub id: Option<String>,

    /// Slug path such as docs/setup
    #[arg(long)]
    pub path: Option<String>,
}

#[derive(Debug, Args)]
pub struct LookupArgs {
    /// Slug path such as docs/setup
    pub path: String,
}

pub fn execute_tree(global: &GlobalArgs) -> CliResult {
    let service = open_service(global)?;
    print_json(&apply_query(&service, TreeQuery::Tree)?)
}

pub fn execute_show(global: &GlobalArgs, args: ShowArgs) -> CliResult {
    let service = open_service(global)?;
    let query = match (args.id, args.path) {
        (Some(node_id), _) => TreeQuery::Page { node_id },
        (None, Some(path)) => TreeQuery::PageByPath { path },
        (None, None) => return Err("either an id or --path is required".into()),
    };
    print_json(&apply_query(&service, query)?)
}

pub fn execute_lookup(global: &GlobalArgs, args: LookupArgs) -> CliResult {
    let service = open_service(global)?;
    print_json(&apply_query(&service, TreeQuery::LookupPath { path: args.path })?)
}

pub fn execute_hash(global: &GlobalArgs) -> CliResult {
    let service = open_service(global)?;
    print_json(&apply_query(&service, TreeQuery::TreeHash)?)
}
