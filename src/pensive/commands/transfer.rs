//! Moving entries between categories and tags.
//!
//! Entries only move between categories of the same format. The target tag is
//! created when missing; asking the user first is the caller's business.
//!
//! - Format 0: the source note is appended (newline-joined) to the target
//!   note, or becomes the target note, and the source note is deleted.
//! - Titled formats: the selected entry is inserted unchanged under the
//!   target tag and only then deleted from the source. A collision at the
//!   target fails with `DuplicateEntry` and leaves the source in place.

use super::helpers::{entry_at, require_indexed};
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{PensiveError, Result};
use crate::model::{Category, Entry, Format};
use crate::store::DataStore;
use crate::tags::normalize_tag;
use tracing::info;

/// Where an entry is taken from.
#[derive(Debug, Clone, Copy)]
pub struct Source<'a> {
    pub category: &'a Category,
    pub tag: &'a str,
    /// Display index; required for titled formats, absent for format 0.
    pub index: Option<usize>,
}

/// Where an entry goes.
#[derive(Debug, Clone, Copy)]
pub struct Target<'a> {
    pub category: &'a Category,
    pub tag: &'a str,
}

pub fn run<S: DataStore>(store: &mut S, source: Source<'_>, target: Target<'_>) -> Result<CmdResult> {
    if source.category.format != target.category.format {
        return Err(PensiveError::FormatMismatch {
            from: source.category.format,
            to: target.category.format,
        });
    }
    let target_tag = normalize_tag(target.tag)?;
    if source.category.id == target.category.id && source.tag == target_tag {
        return Err(PensiveError::SameLocation);
    }

    let mut result = CmdResult::default();
    let moved = match source.category.format {
        Format::Note => {
            if source.index.is_some() {
                require_indexed(source.category)?;
            }
            let text = store
                .entries(source.category.id, source.tag)?
                .into_iter()
                .next()
                .map(|e| e.body().to_string())
                .ok_or_else(|| PensiveError::EntryNotFound(source.tag.to_string()))?;
            ensure_tag(store, &target_tag, &mut result)?;
            move_note(store, source, target.category, &target_tag, &text)?;
            format!("{} note", source.category.name)
        }
        Format::Titled | Format::Attached => {
            let index = source.index.ok_or_else(|| {
                PensiveError::Api(format!(
                    "Select an entry of '{}' by index to move it",
                    source.category.name
                ))
            })?;
            let entry = entry_at(store, source.category, source.tag, index)?;
            ensure_tag(store, &target_tag, &mut result)?;
            move_titled(store, source, target.category, &target_tag, entry)?
        }
    };

    info!(
        from = %source.category.name,
        to = %target.category.name,
        tag = %target_tag,
        "moved entry"
    );
    result.add_message(CmdMessage::success(format!(
        "Moved '{}' from {}@{} to {}@{}",
        moved, source.category.name, source.tag, target.category.name, target_tag
    )));
    Ok(result)
}

fn ensure_tag<S: DataStore>(store: &mut S, tag: &str, result: &mut CmdResult) -> Result<()> {
    if store.insert_tag(tag)? {
        result.add_message(CmdMessage::info(format!("Added tag '{}'", tag)));
    }
    Ok(())
}

fn move_note<S: DataStore>(
    store: &mut S,
    source: Source<'_>,
    target: &Category,
    target_tag: &str,
    text: &str,
) -> Result<()> {
    let existing = store.entries(target.id, target_tag)?.into_iter().next();
    match existing {
        Some(current) => {
            let merged = Entry::note(target_tag, format!("{}\n{}", current.body(), text));
            store.update_entry(target.id, &current.key(), &merged)?;
        }
        None => store.insert_entry(target.id, &Entry::note(target_tag, text))?,
    }
    store.delete_entry(source.category.id, &Entry::note(source.tag, "").key())?;
    Ok(())
}

fn move_titled<S: DataStore>(
    store: &mut S,
    source: Source<'_>,
    target: &Category,
    target_tag: &str,
    entry: Entry,
) -> Result<String> {
    let key = entry.key();
    let title = entry.title().unwrap_or_default().to_string();
    store.insert_entry(target.id, &entry.with_tag(target_tag))?;
    store.delete_entry(source.category.id, &key)?;
    Ok(title)
}
