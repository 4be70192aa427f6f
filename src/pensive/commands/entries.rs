//! Entry commands, per format.
//!
//! Format 0 categories hold at most one note per tag, addressed by the tag
//! alone. Titled formats hold any number of entries per tag, addressed by
//! display index (rank by position, starting at 0).
//!
//! Uniqueness is left to the store: a colliding write fails with
//! [`PensiveError::DuplicateEntry`] and changes nothing.

use super::helpers::{entry_at, require_indexed};
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{PensiveError, Result};
use crate::model::{Category, Entry, EntryKey, Format};
use crate::store::DataStore;
use tracing::info;

fn require_note(category: &Category) -> Result<()> {
    if category.format == Format::Note {
        Ok(())
    } else {
        Err(PensiveError::FormatMismatch {
            from: Format::Note,
            to: category.format,
        })
    }
}

/// The note filed under `tag`, or an empty string.
pub fn note_text<S: DataStore>(store: &S, category: &Category, tag: &str) -> Result<String> {
    require_note(category)?;
    Ok(store
        .entries(category.id, tag)?
        .into_iter()
        .next()
        .map(|e| e.body().to_string())
        .unwrap_or_default())
}

/// Inserts or replaces the note filed under `tag`.
pub fn upsert_note<S: DataStore>(
    store: &mut S,
    category: &Category,
    tag: &str,
    text: &str,
) -> Result<()> {
    require_note(category)?;
    let entry = Entry::note(tag, text);
    if store.entries(category.id, tag)?.is_empty() {
        store.insert_entry(category.id, &entry)
    } else {
        store.update_entry(category.id, &entry.key(), &entry)
    }
}

/// Saves an edited note. An empty note removes the entry.
pub fn save_note<S: DataStore>(
    store: &mut S,
    category: &Category,
    tag: &str,
    text: &str,
) -> Result<CmdResult> {
    if text.trim().is_empty() {
        return remove_note(store, category, tag);
    }
    upsert_note(store, category, tag, text)?;
    info!(category = %category.name, tag, "saved note");
    Ok(CmdResult::default().with_message(CmdMessage::success(format!(
        "Saved {} note for '{}'",
        category.name, tag
    ))))
}

pub fn remove_note<S: DataStore>(
    store: &mut S,
    category: &Category,
    tag: &str,
) -> Result<CmdResult> {
    require_note(category)?;
    let removed = store.delete_entry(
        category.id,
        &EntryKey::Note {
            tag: tag.to_string(),
        },
    )?;
    let msg = if removed {
        CmdMessage::success(format!("Removed {} note for '{}'", category.name, tag))
    } else {
        CmdMessage::info(format!("No {} note for '{}'", category.name, tag))
    };
    Ok(CmdResult::default().with_message(msg))
}

/// The titled entry at display index `index`.
pub fn get<S: DataStore>(
    store: &S,
    category: &Category,
    tag: &str,
    index: usize,
) -> Result<Entry> {
    require_indexed(category)?;
    entry_at(store, category, tag, index)
}

pub fn create<S: DataStore>(store: &mut S, category: &Category, entry: &Entry) -> Result<CmdResult> {
    require_indexed(category)?;
    store.insert_entry(category.id, entry)?;
    info!(category = %category.name, tag = entry.tag(), "created entry");
    Ok(CmdResult::default().with_message(CmdMessage::success(format!(
        "Added '{}' to {}",
        entry.title().unwrap_or_default(),
        category.name
    ))))
}

/// Rewrites the entry at `index`, matched by its uniqueness key as read
/// before the edit.
pub fn update<S: DataStore>(
    store: &mut S,
    category: &Category,
    tag: &str,
    index: usize,
    entry: &Entry,
) -> Result<CmdResult> {
    let current = get(store, category, tag, index)?;
    store.update_entry(category.id, &current.key(), entry)?;
    info!(category = %category.name, tag, index, "updated entry");
    Ok(CmdResult::default().with_message(CmdMessage::success(format!(
        "Updated '{}' in {}",
        entry.title().unwrap_or_default(),
        category.name
    ))))
}

pub fn remove<S: DataStore>(
    store: &mut S,
    category: &Category,
    tag: &str,
    index: usize,
) -> Result<CmdResult> {
    let current = get(store, category, tag, index)?;
    store.delete_entry(category.id, &current.key())?;
    info!(category = %category.name, tag, index, "removed entry");
    Ok(CmdResult::default().with_message(CmdMessage::success(format!(
        "Removed '{}' from {}",
        current.title().unwrap_or_default(),
        category.name
    ))))
}
