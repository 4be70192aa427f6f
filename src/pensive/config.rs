//! # Configuration
//!
//! Pensive configuration is loaded with [`confique`], layering environment
//! variables over an optional TOML file over compiled defaults.
//!
//! ## Storage Hierarchy
//!
//! Configuration is resolved in priority order:
//! 1. **Environment variables**: `PENSIVE_DATABASE`, `PENSIVE_EDITOR`, `PENSIVE_BROWSER`.
//! 2. **Config file**: `<data dir>/pensive.toml`.
//! 3. **Compiled Defaults**: Built-in fallbacks via `#[config(default = ...)]`.
//!
//! The data directory itself is `--data`, else `$PENSIVE_DATA`, else the OS
//! data directory (via the `directories` crate).
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `database` | `pensive.sqlite` | Store file |
//! | `backup_dir` | `backups` | Where `backup` writes copies |
//! | `export_dir` | `exports` | Where `export` writes text files |
//! | `editor` | `$EDITOR`, then `vi` | Editor for entries |
//! | `browser` | `firefox` | Opens URL attachments |
//! | `highlight_tags` | `true` | Mark known tags in displayed text |
//! | `attachment_layout` | `lines` | `lines` or `inline` listing of format 2 entries |
//!
//! Relative paths are taken relative to the data directory.

use crate::error::{PensiveError, Result};
use confique::Config;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "pensive.toml";

/// How format 2 listings show attachments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum AttachmentLayout {
    /// Title line, then the attachment on its own indented line.
    Lines,
    /// One line per entry with a status mark in the index.
    Inline,
}

impl TryFrom<String> for AttachmentLayout {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        match value.to_ascii_lowercase().as_str() {
            "lines" => Ok(AttachmentLayout::Lines),
            "inline" => Ok(AttachmentLayout::Inline),
            other => Err(format!(
                "unknown attachment layout '{}', expected 'lines' or 'inline'",
                other
            )),
        }
    }
}

/// Configuration for pensive, stored in `pensive.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PensiveConfig {
    #[config(default = "pensive.sqlite", env = "PENSIVE_DATABASE")]
    pub database: PathBuf,

    #[config(default = "backups")]
    pub backup_dir: PathBuf,

    #[config(default = "exports")]
    pub export_dir: PathBuf,

    /// Editor command. When absent, `$EDITOR` is used, then `vi`.
    #[config(env = "PENSIVE_EDITOR")]
    pub editor: Option<String>,

    #[config(default = "firefox", env = "PENSIVE_BROWSER")]
    pub browser: String,

    #[config(default = true)]
    pub highlight_tags: bool,

    #[config(default = "lines")]
    pub attachment_layout: AttachmentLayout,
}

impl Default for PensiveConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from("pensive.sqlite"),
            backup_dir: PathBuf::from("backups"),
            export_dir: PathBuf::from("exports"),
            editor: None,
            browser: "firefox".to_string(),
            highlight_tags: true,
            attachment_layout: AttachmentLayout::Lines,
        }
    }
}

impl PensiveConfig {
    /// Loads `<data_dir>/pensive.toml` (if present) under the environment.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let config = PensiveConfig::builder()
            .env()
            .file(data_dir.join(CONFIG_FILE))
            .load()?;
        Ok(config)
    }

    pub fn editor(&self) -> String {
        if let Some(editor) = self.editor.as_ref().filter(|e| !e.trim().is_empty()) {
            return editor.clone();
        }
        match env::var("EDITOR") {
            Ok(editor) if !editor.trim().is_empty() => editor,
            _ => "vi".to_string(),
        }
    }
}

/// Resolves the data directory: explicit flag, `$PENSIVE_DATA`, OS default.
pub fn data_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir);
    }
    if let Ok(dir) = env::var("PENSIVE_DATA") {
        if !dir.is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    ProjectDirs::from("org", "pensive", "pensive")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| PensiveError::Api("Could not determine data directory".to_string()))
}

/// Filesystem locations derived from the data directory and config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PensivePaths {
    pub data_dir: PathBuf,
    pub database: PathBuf,
    pub backup_dir: PathBuf,
    pub export_dir: PathBuf,
}

impl PensivePaths {
    pub fn new(data_dir: PathBuf, config: &PensiveConfig) -> Self {
        let resolve = |p: &Path| {
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                data_dir.join(p)
            }
        };
        Self {
            database: resolve(&config.database),
            backup_dir: resolve(&config.backup_dir),
            export_dir: resolve(&config.export_dir),
            data_dir,
        }
    }
}
