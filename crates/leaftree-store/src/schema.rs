//! Schema version marker (`schema.json`)

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::atomic::atomic_write;
use crate::errors::{io_error, Result};

/// Layout version written by this build
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaInfo {
    pub version: u32,
}

/// Version recorded at `path`; a missing marker means version 0
pub fn load_schema(path: &Path) -> Result<SchemaInfo> {
    match fs::read(path) {
        Ok(data) => Ok(serde_json::from_slice(&data)?),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!(path = %path.display(), "schema marker not found, assuming version 0");
            Ok(SchemaInfo { version: 0 })
        }
        Err(e) => Err(io_error("load_schema", path, e)),
    }
}

pub fn save_schema(path: &Path, version: u32) -> Result<()> {
    let data = serde_json::to_vec_pretty(&SchemaInfo { version })?;
    atomic_write(path, &data)?;
    info!(path = %path.display(), version, "saved schema version");
    Ok(())
}
