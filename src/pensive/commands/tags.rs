//! Tag management commands.
//!
//! This module provides operations over the tag set:
//! - `list`: All tags, or those matching a `*` pattern
//! - `add`: Add tags (idempotent)
//! - `remove`: Delete a tag (cascades to its entries in every category)
//! - `rename`: Rename a tag (refiles its entries in every category)

use super::helpers::plural;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{PensiveError, Result};
use crate::store::DataStore;
use crate::tags::{match_tags, normalize_tag};
use tracing::info;

/// Lists tags in order, optionally filtered by a glob pattern.
pub fn list<S: DataStore>(store: &S, pattern: Option<&str>) -> Result<CmdResult> {
    let all = store.list_tags()?;
    let tags: Vec<String> = match pattern {
        Some(p) => match_tags(p, &all),
        None => all.into_iter().collect(),
    };

    let mut result = CmdResult::default();
    if tags.is_empty() {
        let msg = match pattern {
            Some(p) => format!("No tags match '{}'", p),
            None => "No tags defined".to_string(),
        };
        result.add_message(CmdMessage::info(msg));
    }
    Ok(result.with_tags(tags))
}

/// Adds each tag. Existing tags are reported, not treated as errors.
pub fn add<S: DataStore, I: AsRef<str>>(store: &mut S, names: &[I]) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    for raw in names {
        let name = normalize_tag(raw.as_ref())?;
        if store.insert_tag(&name)? {
            info!(tag = %name, "added tag");
            result.add_message(CmdMessage::success(format!("Added tag '{}'", name)));
        } else {
            result.add_message(CmdMessage::info(format!("Tag '{}' already exists", name)));
        }
    }
    Ok(result)
}

/// Removes a tag and every entry filed under it.
pub fn remove<S: DataStore>(store: &mut S, name: &str) -> Result<CmdResult> {
    let name = normalize_tag(name)?;
    let dropped = store.delete_tag(&name)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!("Removed tag '{}'", name)));
    if dropped > 0 {
        result.add_message(CmdMessage::info(format!(
            "Removed {} entr{} filed under it",
            dropped,
            if dropped == 1 { "y" } else { "ies" }
        )));
    }
    Ok(result)
}

/// Renames a tag in the tag set and in every category.
pub fn rename<S: DataStore>(store: &mut S, old: &str, new: &str) -> Result<CmdResult> {
    let old = normalize_tag(old)?;
    let new = normalize_tag(new)?;
    if old == new {
        return Err(PensiveError::NameConflict(new));
    }
    let refiled = store.rename_tag(&old, &new)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Renamed tag '{}' to '{}'",
        old, new
    )));
    if refiled > 0 {
        result.add_message(CmdMessage::info(format!(
            "Updated {} entr{}",
            refiled,
            if refiled == 1 { "y" } else { "ies" }
        )));
    }
    Ok(result)
}

/// How many tags a listing shows, for a trailing summary line.
pub fn summary(count: usize) -> String {
    format!("{} tag{}", count, plural(count))
}
