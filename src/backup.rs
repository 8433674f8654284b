//! Locating the SMS backup store and making a disposable working copy.
//!
//! The live backup is never queried directly: each run copies it to a
//! temporary file and opens that. The copy disappears when the run ends.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{info, warn};
use walkdir::WalkDir;

/// Backup filename of the SMS database inside a MobileSync backup.
pub const BACKUP_DB_NAME: &str = "3d0d7e5fb2ce288813306e4d4636395e047a3d28";

/// Standard MobileSync backup directory.
pub fn default_backup_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Library")
        .join("Application Support")
        .join("MobileSync")
}

/// Find the SMS database in the standard backup location.
///
/// Exactly one candidate is required: none means there is nothing to read,
/// several means we cannot tell which device's messages were asked for.
/// Both are resource errors; --input sidesteps discovery entirely.
pub fn find_backup_db() -> Result<PathBuf> {
    find_backup_db_in(&default_backup_dir())
}

fn find_backup_db_in(dir: &Path) -> Result<PathBuf> {
    let mut candidates = Vec::new();
    for entry in WalkDir::new(dir).into_iter().filter_map(|e| e.ok()) {
        if entry.file_type().is_file() && entry.file_name() == BACKUP_DB_NAME {
            candidates.push(entry.path().to_path_buf());
        }
    }

    match candidates.len() {
        0 => {
            warn!("No SMS db found under {:?}", dir);
            bail!("no SMS database found under {:?}; pass --input FILE", dir)
        }
        1 => Ok(candidates.remove(0)),
        n => {
            warn!("Multiple SMS dbs found under {:?}", dir);
            bail!(
                "{} SMS databases found under {:?}; pass --input FILE to choose one",
                n,
                dir
            )
        }
    }
}

/// A temporary copy of the backup store, removed on drop.
pub struct WorkingCopy {
    file: NamedTempFile,
}

impl WorkingCopy {
    /// Copy the store at `src` into a fresh temporary file.
    pub fn create(src: &Path) -> Result<Self> {
        let file = NamedTempFile::new().context("Unable to make tmp file")?;
        std::fs::copy(src, file.path())
            .with_context(|| format!("Unable to copy DB file: {:?}", src))?;
        info!("Copied {:?} to working copy {:?}", src, file.path());
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}
