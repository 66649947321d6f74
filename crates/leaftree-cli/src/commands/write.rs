//! Mutating commands
//!
//! Each prints the command result, which includes the tree hash taken
//! right after the change.

use std::path::PathBuf;

use clap::Args;
use leaftree_engine::commands::{apply_command, apply_query, TreeCommand, TreeQuery, TreeQueryResult};
use leaftree_engine::TreeService;

use super::{open_service, print_json, CliResult, KindArg};
use crate::GlobalArgs;

#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Display title
    #[arg(long)]
    pub title: String,

    /// Slug; derived from the title when omitted
    #[arg(long)]
    pub slug: Option<String>,

    /// Parent node id (default: root)
    #[arg(long)]
    pub parent: Option<String>,

    #[arg(long, value_enum, default_value_t = KindArg::Page)]
    pub kind: KindArg,
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    pub id: String,

    /// New title (default: unchanged)
    #[arg(long)]
    pub title: Option<String>,

    /// New slug (default: unchanged)
    #[arg(long)]
    pub slug: Option<String>,

    /// Replacement body text
    #[arg(long, conflicts_with = "content_file")]
    pub content: Option<String>,

    /// Read the replacement body from a file
    #[arg(long)]
    pub content_file: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct MoveArgs {
    pub id: String,

    /// New parent id (default: root)
    #[arg(long)]
    pub parent: Option<String>,
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    pub id: String,

    /// Also delete all descendants
    #[arg(short, long)]
    pub recursive: bool,
}

#[derive(Debug, Args)]
pub struct SortArgs {
    /// Every child id of the parent, in the new order
    #[arg(required = true)]
    pub ids: Vec<String>,

    /// Parent id (default: root)
    #[arg(long)]
    pub parent: Option<String>,
}

#[derive(Debug, Args)]
pub struct ConvertArgs {
    pub id: String,

    #[arg(long, value_enum)]
    pub kind: KindArg,
}

#[derive(Debug, Args)]
pub struct EnsureArgs {
    /// Slug path such as docs/setup/install
    pub path: String,

    /// Title of the last segment (default: its slug)
    #[arg(long)]
    pub title: Option<String>,

    /// Kind of the last segment
    #[arg(long, value_enum, default_value_t = KindArg::Page)]
    pub kind: KindArg,
}

pub fn execute_create(global: &GlobalArgs, args: CreateArgs) -> CliResult {
    let service = open_service(global)?;
    let slug = match args.slug {
        Some(slug) => slug,
        None => suggest_slug(&service, args.parent.clone(), &args.title)?,
    };
    let cmd = TreeCommand::CreateNode {
        parent_id: args.parent,
        title: args.title,
        slug,
        kind: args.kind.into(),
    };
    print_json(&apply_command(&service, &global.user, cmd)?)
}

pub fn execute_update(global: &GlobalArgs, args: UpdateArgs) -> CliResult {
    let service = open_service(global)?;
    let current = service.get_node(&args.id)?;
    let content = match (args.content, args.content_file) {
        (Some(text), _) => Some(text),
        (None, Some(path)) => Some(std::fs::read_to_string(&path)?),
        (None, None) => None,
    };
    let cmd = TreeCommand::UpdateNode {
        node_id: args.id,
        title: args.title.unwrap_or(current.title),
        slug: args.slug.unwrap_or(current.slug),
        content,
    };
    print_json(&apply_command(&service, &global.user, cmd)?)
}

pub fn execute_move(global: &GlobalArgs, args: MoveArgs) -> CliResult {
    let service = open_service(global)?;
    let cmd = TreeCommand::MoveNode {
        node_id: args.id,
        parent_id: args.parent,
    };
    print_json(&apply_command(&service, &global.user, cmd)?)
}

pub fn execute_delete(global: &GlobalArgs, args: DeleteArgs) -> CliResult {
    let service = open_service(global)?;
    let cmd = TreeCommand::DeleteNode {
        node_id: args.id,
        recursive: args.recursive,
    };
    print_json(&apply_command(&service, &global.user, cmd)?)
}

pub fn execute_sort(global: &GlobalArgs, args: SortArgs) -> CliResult {
    let service = open_service(global)?;
    let cmd = TreeCommand::SortChildren {
        parent_id: args.parent,
        ordered_ids: args.ids,
    };
    print_json(&apply_command(&service, &global.user, cmd)?)
}

pub fn execute_convert(global: &GlobalArgs, args: ConvertArgs) -> CliResult {
    let service = open_service(global)?;
    let cmd = TreeCommand::ConvertNode {
        node_id: args.id,
        kind: args.kind.into(),
    };
    print_json(&apply_command(&service, &global.user, cmd)?)
}

pub fn execute_ensure(global: &GlobalArgs, args: EnsureArgs) -> CliResult {
    let service = open_service(global)?;
    let title = match args.title {
        Some(title) => title,
        None => args
            .path
            .rsplit('/')
            .find(|segment| !segment.is_empty())
            .unwrap_or_default()
            .to_string(),
    };
    let cmd = TreeCommand::EnsurePath {
        path: args.path,
        title,
        kind: args.kind.into(),
    };
    print_json(&apply_command(&service, &global.user, cmd)?)
}

pub fn execute_rebuild(global: &GlobalArgs) -> CliResult {
    let service = open_service(global)?;
    print_json(&apply_command(&service, &global.user, TreeCommand::Rebuild)?)
}

fn suggest_slug(
    service: &TreeService,
    parent_id: Option<String>,
    title: &str,
) -> Result<String, Box<dyn std::error::Error>> {
    let query = TreeQuery::SuggestSlug {
        parent_id,
        current_id: None,
        title: title.to_string(),
    };
    match apply_query(service, query)? {
        TreeQueryResult::Slug { slug } => Ok(slug),
        other => Err(format!("unexpected slug query result: {:?}", other).into()),
    }
}
