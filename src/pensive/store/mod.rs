//! # Storage Layer
//!
//! This module defines the storage abstraction for pensive. The [`DataStore`]
//! trait allows the application to work with different storage backends.
//!
//! ## Data Layout
//!
//! Three relations, independent of how many categories exist:
//!
//! ```text
//! categories(id, ordinal, name, format)      registry, ordinals dense from 0
//! tags(name)                                 the tag set
//! entries(id, category_id, format, tag,      one generic row per entry
//!         position, title, body, attachment)
//! ```
//!
//! Entry rows reference their category by the stable `id`, never by ordinal
//! or name, so renaming or renumbering categories touches only the registry.
//!
//! ## Uniqueness
//!
//! Inside one category:
//! - format 0: one entry per tag
//! - format 1: one entry per `(tag, title, body)`
//! - format 2: one entry per `(tag, title, attachment)`
//!
//! Callers do not check this beforehand. Stores reject a colliding write with
//! [`PensiveError::DuplicateEntry`](crate::error::PensiveError::DuplicateEntry)
//! and leave existing rows untouched.
//!
//! ## Cascades
//!
//! - Removing a category removes its entries and renumbers the remaining
//!   ordinals in their current order.
//! - Removing a tag removes every entry filed under it, in every category.
//! - Renaming a tag rewrites every entry filed under it.
//!
//! Each of these is a single atomic step as seen from the caller.
//!
//! ## Implementations
//!
//! - [`sqlite::SqliteStore`]: Production store, one SQLite file.
//! - [`memory::InMemoryStore`]: For testing logic without touching the disk.

use crate::error::Result;
use crate::model::{Category, CategoryId, Entry, EntryKey, Format};
use std::collections::BTreeSet;

pub mod memory;
pub mod sqlite;

/// Abstract interface for pensive storage.
pub trait DataStore {
    /// All categories, ordered by ordinal.
    fn list_categories(&self) -> Result<Vec<Category>>;

    /// Appends a category with `ordinal = count`.
    fn insert_category(&mut self, name: &str, format: Format) -> Result<Category>;

    /// Removes a category and its entries, then closes the ordinal gap.
    /// Returns the number of entries dropped.
    fn delete_category(&mut self, id: CategoryId) -> Result<usize>;

    fn rename_category(&mut self, id: CategoryId, new_name: &str) -> Result<()>;

    fn list_tags(&self) -> Result<BTreeSet<String>>;

    /// Adds a tag. Returns false if it already existed.
    fn insert_tag(&mut self, name: &str) -> Result<bool>;

    /// Removes a tag and every entry filed under it.
    /// Returns the number of entries removed.
    fn delete_tag(&mut self, name: &str) -> Result<usize>;

    /// Renames a tag, refiling every entry under the new name.
    /// Returns the number of entries refiled.
    fn rename_tag(&mut self, old: &str, new: &str) -> Result<usize>;

    /// Entries of one tag in one category, ordered by position.
    fn entries(&self, category: CategoryId, tag: &str) -> Result<Vec<Entry>>;

    /// Every entry of a category, ordered by position.
    fn all_entries(&self, category: CategoryId) -> Result<Vec<Entry>>;

    fn insert_entry(&mut self, category: CategoryId, entry: &Entry) -> Result<()>;

    /// Replaces the entry identified by `key` with `entry`.
    fn update_entry(&mut self, category: CategoryId, key: &EntryKey, entry: &Entry)
        -> Result<()>;

    /// Deletes the entry identified by `key`. Returns false if there was none.
    fn delete_entry(&mut self, category: CategoryId, key: &EntryKey) -> Result<bool>;
}
