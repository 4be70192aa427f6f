//! Whole-file backups of the store.
//!
//! A backup is a plain copy of the database file, named `<name>.sqlite` or
//! `<unix seconds>.sqlite`. Listing keeps only files that hold a category
//! registry, newest first by modification time.

use crate::commands::{CmdMessage, CmdResult};
use crate::error::{PensiveError, Result};
use crate::store::sqlite::is_store_file;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

const EXTENSION: &str = "sqlite";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupFile {
    pub path: PathBuf,
    pub modified: SystemTime,
}

impl BackupFile {
    pub fn name(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

fn backup_name(name: Option<&str>) -> Result<String> {
    match name {
        Some(n) if n.is_empty() || n.contains(['/', '\\']) || n == "." || n == ".." => {
            Err(PensiveError::InvalidName(n.to_string()))
        }
        Some(n) => Ok(n.to_string()),
        None => {
            let secs = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default();
            Ok(secs.to_string())
        }
    }
}

/// Copies the store file into `backup_dir`.
pub fn create(database: &Path, backup_dir: &Path, name: Option<&str>) -> Result<CmdResult> {
    let name = backup_name(name)?;
    fs::create_dir_all(backup_dir)?;
    let target = backup_dir.join(format!("{}.{}", name, EXTENSION));
    fs::copy(database, &target)?;
    info!(path = %target.display(), "backup written");

    Ok(CmdResult::default()
        .with_message(CmdMessage::success(format!(
            "Backup written to {}",
            target.display()
        )))
        .with_paths(vec![target]))
}

/// Valid backups, newest first. A missing directory has none.
pub fn list_backups(backup_dir: &Path) -> Result<Vec<BackupFile>> {
    if !backup_dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut backups = Vec::new();
    for dir_entry in fs::read_dir(backup_dir)? {
        let path = dir_entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
            continue;
        }
        if !is_store_file(&path) {
            warn!(path = %path.display(), "skipping invalid backup");
            continue;
        }
        let modified = fs::metadata(&path)?.modified()?;
        backups.push(BackupFile { path, modified });
    }
    backups.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| b.path.cmp(&a.path)));
    Ok(backups)
}

pub fn list(backup_dir: &Path) -> Result<CmdResult> {
    let backups = list_backups(backup_dir)?;
    let mut result = CmdResult::default();
    if backups.is_empty() {
        result.add_message(CmdMessage::info(format!(
            "No valid backups found in {}",
            backup_dir.display()
        )));
    }
    Ok(result.with_backups(backups))
}

/// Copies backup `index` of [`list_backups`] over the store file.
///
/// The caller must reopen the store afterwards.
pub fn restore(database: &Path, backup_dir: &Path, index: usize) -> Result<CmdResult> {
    let backups = list_backups(backup_dir)?;
    let backup = backups.get(index).ok_or(PensiveError::IndexOutOfRange {
        index,
        count: backups.len(),
    })?;
    fs::copy(&backup.path, database)?;
    info!(from = %backup.path.display(), "restored backup");
    Ok(CmdResult::default().with_message(CmdMessage::success(format!(
        "Restored backup '{}'",
        backup.name()
    ))))
}
