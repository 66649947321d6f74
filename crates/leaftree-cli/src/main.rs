//! LeafTree CLI
//!
//! Command-line interface for a leaftree storage directory. Every command
//! prints JSON on stdout; logs go to stderr.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use leaftree_core::logging_facility::{init, Profile};
use leaftree_core::TreeError;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "leaftree")]
#[command(about = "LeafTree - filesystem-mirrored content tree", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, clap::Args)]
pub struct GlobalArgs {
    /// Storage directory holding tree.json, schema.json and root/
    #[arg(long, global = true, env = "LEAFTREE_STORAGE_DIR", default_value = "./data")]
    pub storage_dir: PathBuf,

    /// Log output format (logs go to stderr)
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Author id recorded in node metadata
    #[arg(long, global = true, default_value = "cli")]
    pub user: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl From<LogFormat> for Profile {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Pretty => Profile::Development,
            LogFormat::Json => Profile::Production,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the whole tree
    Tree,
    /// Print one node with its content, by id or by path
    Show(commands::read::ShowArgs),
    /// Report which segments of a slug path exist
    Lookup(commands::read::LookupArgs),
    /// Print the structural hash of the tree
    Hash,
    /// Create a page or section
    Create(commands::write::CreateArgs),
    /// Change title, slug or content of a node
    Update(commands::write::UpdateArgs),
    /// Move a node under another parent
    Move(commands::write::MoveArgs),
    /// Delete a node
    Delete(commands::write::DeleteArgs),
    /// Reorder the children of a node
    Sort(commands::write::SortArgs),
    /// Switch a node between page and section
    Convert(commands::write::ConvertArgs),
    /// Create every missing segment of a slug path
    Ensure(commands::write::EnsureArgs),
    /// Rebuild the tree from the content directory
    Rebuild,
}

fn main() {
    let cli = Cli::parse();
    init(cli.global.log_format.into());

    let global = &cli.global;
    let result = match cli.command {
        Commands::Tree => commands::read::execute_tree(global),
        Commands::Show(args) => commands::read::execute_show(global, args),
        Commands::Lookup(args) => commands::read::execute_lookup(global, args),
        Commands::Hash => commands::read::execute_hash(global),
        Commands::Create(args) => commands::write::execute_create(global, args),
        Commands::Update(args) => commands::write::execute_update(global, args),
        Commands::Move(args) => commands::write::execute_move(global, args),
        Commands::Delete(args) => commands::write::execute_delete(global, args),
        Commands::Sort(args) => commands::write::execute_sort(global, args),
        Commands::Convert(args) => commands::write::execute_convert(global, args),
        Commands::Ensure(args) => commands::write::execute_ensure(global, args),
        Commands::Rebuild => commands::write::execute_rebuild(global),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        let client_error = e
            .downcast_ref::<TreeError>()
            .is_some_and(|err| err.kind().is_client_error());
        std::process::exit(if client_error { 2 } else { 1 });
    }
}
