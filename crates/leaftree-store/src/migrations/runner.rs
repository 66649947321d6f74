//! Migration runner
//!
//! Applies every step newer than the recorded schema version, in order

use leaftree_core::Tree;
use leaftree_core_types::schema::EVENT_MIGRATION;
use tracing::{error, info, warn};

use crate::errors::Result;
use crate::migrations::{backfill_frontmatter, backfill_kinds, backfill_metadata};
use crate::node_store::NodeStore;
use crate::repo::TreeRepository;
use crate::schema::CURRENT_SCHEMA_VERSION;

/// Migration metadata
struct Migration {
    /// Version reached after this step
    version: u32,
    name: &'static str,
    apply: fn(&NodeStore, &mut Tree) -> Result<()>,
}

fn migrations() -> Vec<Migration> {
    vec![
        Migration {
            version: 1,
            name: "backfill_metadata",
            apply: |store, tree| backfill_metadata::backfill_metadata(store, tree).map(|_| ()),
        },
        Migration {
            version: 2,
            name: "backfill_kinds_and_frontmatter",
            apply: |store, tree| {
                backfill_kinds::backfill_kinds(store, tree)?;
                backfill_frontmatter::backfill_frontmatter(store, tree).map(|_| ())
            },
        },
    ]
}

/// Outcome of `run_migrations`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub from_version: u32,
    pub to_version: u32,
    pub applied: Vec<&'static str>,
}

impl MigrationReport {
    pub fn is_noop(&self) -> bool {
        self.applied.is_empty()
    }
}

/// Apply all pending migrations to `tree` and the files under `repo`
pub fn run_migrations(repo: &TreeRepository, tree: &mut Tree) -> Result<MigrationReport> {
    let from_version = repo.schema_version()?;
    let mut report = MigrationReport {
        from_version,
        to_version: from_version,
        applied: Vec::new(),
    };

    if from_version > CURRENT_SCHEMA_VERSION {
        warn!(
            version = from_version,
            supported = CURRENT_SCHEMA_VERSION,
            "schema marker is newer than this build; skipping migrations"
        );
        return Ok(report);
    }

    for migration in migrations().into_iter().filter(|m| m.version > from_version) {
        info!(
            event = EVENT_MIGRATION,
            version = migration.version,
            name = migration.name,
            "applying migration"
        );

        if let Err(err) = (migration.apply)(repo.node_store(), tree) {
            error!(
                event = EVENT_MIGRATION,
                version = migration.version,
                name = migration.name,
                error = %err,
                "migration failed"
            );
            return Err(err);
        }

        repo.save_tree(tree)?;
        repo.set_schema_version(migration.version)?;

        report.applied.push(migration.name);
        report.to_version = migration.version;
    }

    Ok(report)
}
