//! # Command Layer
//!
//! This module contains the **core business logic** of pensive. Each group of
//! operations lives in its own submodule as plain functions over a
//! [`DataStore`](crate::store::DataStore).
//!
//! ## Role and Responsibilities
//!
//! Commands are where the real work happens:
//! - Enforce the category and tag rules (format binding, cascades, conflicts)
//! - Address titled entries by display index
//! - Move entries between categories
//! - Search and highlight
//! - Return structured [`CmdResult`] values with messages
//!
//! ## What Commands Do NOT Do
//!
//! - **Any terminal I/O**: No stdout, stderr, colors or prompts
//! - **Argument parsing**: Category letters are resolved before a command runs
//! - **Exit codes**: Return `Result`, let the caller decide
//! - **Confirmation**: Destructive commands run when called; asking is the UI's job
//!
//! ## Testing Strategy
//!
//! Command tests run against [`InMemoryStore`](crate::store::memory::InMemoryStore)
//! and cover every branch, including error conditions.
//!
//! ## Command Modules
//!
//! - [`categories`]: Category registry
//! - [`tags`]: Tag set, cascades and patterns
//! - [`entries`]: Per-format create, read, update, delete
//! - [`overview`]: Everything filed under a tag
//! - [`transfer`]: Moving entries between categories
//! - [`search`]: Search across all categories
//! - [`export`]: Plain text export per tag
//! - [`backup`]: Store file backups
//! - [`helpers`]: Shared lookups

use crate::model::Category;
use serde::Serialize;
use std::path::PathBuf;

pub mod backup;
pub mod categories;
pub mod entries;
pub mod export;
pub mod helpers;
pub mod overview;
pub mod search;
pub mod tags;
pub mod transfer;

pub use backup::BackupFile;
pub use overview::{EntryView, Section, SectionBody};
pub use search::SearchHit;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

/// Search results for one tag, in category then position order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagHits {
    pub tag: String,
    pub hits: Vec<SearchHit>,
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub messages: Vec<CmdMessage>,
    pub categories: Vec<Category>,
    pub tags: Vec<String>,
    pub sections: Vec<Section>,
    pub entry: Option<EntryView>,
    pub hits: Vec<TagHits>,
    pub backups: Vec<BackupFile>,
    pub paths: Vec<PathBuf>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_message(mut self, message: CmdMessage) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_categories(mut self, categories: Vec<Category>) -> Self {
        self.categories = categories;
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_sections(mut self, sections: Vec<Section>) -> Self {
        self.sections = sections;
        self
    }

    pub fn with_entry(mut self, entry: EntryView) -> Self {
        self.entry = Some(entry);
        self
    }

    pub fn with_hits(mut self, hits: Vec<TagHits>) -> Self {
        self.hits = hits;
        self
    }

    pub fn with_backups(mut self, backups: Vec<BackupFile>) -> Self {
        self.backups = backups;
        self
    }

    pub fn with_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.paths = paths;
        self
    }
}
