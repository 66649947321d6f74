//! Atomic write primitives
//!
//! Uses temp→rename so readers never observe a partially written file

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::errors::{io_error, Result};

/// Atomically write bytes to a file
///
/// The temp file lives next to the target (`.<name>.tmp`) so the final
/// rename never crosses filesystems. When the target already exists its
/// permission bits are carried over to the new file. Missing parent
/// directories are created.
pub fn atomic_write(target_path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = target_path.parent() {
        fs::create_dir_all(parent).map_err(|e| io_error("create_parent_dir", parent, e))?;
    }

    let existing_permissions = fs::metadata(target_path).ok().map(|m| m.permissions());
    let temp_path = temp_path_for(target_path);

    let written = write_temp(&temp_path, content, existing_permissions)
        .and_then(|_| {
            fs::rename(&temp_path, target_path)
                .map_err(|e| io_error("rename_temp", target_path, e))
        });

    if written.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    written
}

fn write_temp(
    temp_path: &Path,
    content: &[u8],
    permissions: Option<fs::Permissions>,
) -> Result<()> {
    let mut file = fs::File::create(temp_path).map_err(|e| io_error("create_temp", temp_path, e))?;
    file.write_all(content)
        .map_err(|e| io_error("write_temp", temp_path, e))?;
    file.sync_all()
        .map_err(|e| io_error("sync_temp", temp_path, e))?;
    if let Some(permissions) = permissions {
        fs::set_permissions(temp_path, permissions)
            .map_err(|e| io_error("set_permissions", temp_path, e))?;
    }
    Ok(())
}

fn temp_path_for(target_path: &Path) -> PathBuf {
    let name = target_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    target_path.with_file_name(format!(".{}.tmp", name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("tree.json");

        atomic_write(&target, b"{}").unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"{}");
    }

    #[test]
    fn test_atomic_write_creates_parent() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("docs").join("intro.md");

        atomic_write(&target, b"# Intro\n").unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"# Intro\n");
    }

    #[test]
    fn test_overwrite_leaves_no_temp_files() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("page.md");

        atomic_write(&target, b"one").unwrap();
        atomic_write(&target, b"two").unwrap();

        let leftovers = fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .count();
        assert_eq!(leftovers, 0);
        assert_eq!(fs::read(&target).unwrap(), b"two");
    }

    #[cfg(unix)]
    #[test]
    fn test_overwrite_preserves_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("page.md");
        fs::write(&target, b"old").unwrap();
        fs::set_permissions(&target, fs::Permissions::from_mode(0o640)).unwrap();

        atomic_write(&target, b"new").unwrap();

        let mode = fs::metadata(&target).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
    }
}
