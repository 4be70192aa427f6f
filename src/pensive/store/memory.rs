use super::DataStore;
use crate::error::{PensiveError, Result};
use crate::model::{Category, CategoryId, Entry, EntryKey, Format};
use std::collections::BTreeSet;

/// Store keeping everything in memory, with the same constraints as
/// [`SqliteStore`](super::sqlite::SqliteStore).
#[derive(Debug, Default)]
pub struct InMemoryStore {
    categories: Vec<Category>,
    tags: BTreeSet<String>,
    entries: Vec<StoredEntry>,
    next_category: i64,
    next_entry: u64,
}

#[derive(Debug)]
struct StoredEntry {
    seq: u64,
    category: CategoryId,
    entry: Entry,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn category(&self, id: CategoryId) -> Result<&Category> {
        self.categories
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| PensiveError::CategoryNotFound(format!("#{}", id.0)))
    }

    fn check_write(&self, category: CategoryId, entry: &Entry) -> Result<()> {
        let expected = self.category(category)?.format;
        if entry.format() != expected {
            return Err(PensiveError::FormatMismatch {
                from: entry.format(),
                to: expected,
            });
        }
        if !self.tags.contains(entry.tag()) {
            return Err(PensiveError::TagNotFound(entry.tag().to_string()));
        }
        Ok(())
    }

    fn position_of(&self, category: CategoryId, key: &EntryKey) -> Option<usize> {
        self.entries
            .iter()
            .position(|s| s.category == category && s.entry.key() == *key)
    }

    fn sorted(&self, filter: impl Fn(&StoredEntry) -> bool) -> Vec<Entry> {
        let mut rows: Vec<&StoredEntry> = self.entries.iter().filter(|s| filter(s)).collect();
        rows.sort_by_key(|s| (s.entry.position(), s.seq));
        rows.into_iter().map(|s| s.entry.clone()).collect()
    }
}

impl DataStore for InMemoryStore {
    fn list_categories(&self) -> Result<Vec<Category>> {
        let mut cats = self.categories.clone();
        cats.sort_by_key(|c| c.ordinal);
        Ok(cats)
    }

    fn insert_category(&mut self, name: &str, format: Format) -> Result<Category> {
        if self.categories.iter().any(|c| c.name == name) {
            return Err(PensiveError::DuplicateCategory(name.to_string()));
        }
        self.next_category += 1;
        let category = Category {
            id: CategoryId(self.next_category),
            ordinal: self.categories.len(),
            name: name.to_string(),
            format,
        };
        self.categories.push(category.clone());
        Ok(category)
    }

    fn delete_category(&mut self, id: CategoryId) -> Result<usize> {
        self.category(id)?;
        let before = self.entries.len();
        self.entries.retain(|s| s.category != id);
        let dropped = before - self.entries.len();

        self.categories.retain(|c| c.id != id);
        self.categories.sort_by_key(|c| c.ordinal);
        for (ordinal, cat) in self.categories.iter_mut().enumerate() {
            cat.ordinal = ordinal;
        }
        Ok(dropped)
    }

    fn rename_category(&mut self, id: CategoryId, new_name: &str) -> Result<()> {
        if self
            .categories
            .iter()
            .any(|c| c.name == new_name && c.id != id)
        {
            return Err(PensiveError::NameConflict(new_name.to_string()));
        }
        let cat = self
            .categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| PensiveError::CategoryNotFound(format!("#{}", id.0)))?;
        cat.name = new_name.to_string();
        Ok(())
    }

    fn list_tags(&self) -> Result<BTreeSet<String>> {
        Ok(self.tags.clone())
    }

    fn insert_tag(&mut self, name: &str) -> Result<bool> {
        Ok(self.tags.insert(name.to_string()))
    }

    fn delete_tag(&mut self, name: &str) -> Result<usize> {
        if !self.tags.remove(name) {
            return Err(PensiveError::TagNotFound(name.to_string()));
        }
        let before = self.entries.len();
        self.entries.retain(|s| s.entry.tag() != name);
        Ok(before - self.entries.len())
    }

    fn rename_tag(&mut self, old: &str, new: &str) -> Result<usize> {
        if !self.tags.contains(old) {
            return Err(PensiveError::TagNotFound(old.to_string()));
        }
        if self.tags.contains(new) {
            return Err(PensiveError::NameConflict(new.to_string()));
        }
        self.tags.remove(old);
        self.tags.insert(new.to_string());

        let mut refiled = 0;
        for stored in self.entries.iter_mut().filter(|s| s.entry.tag() == old) {
            stored.entry = stored.entry.clone().with_tag(new);
            refiled += 1;
        }
        Ok(refiled)
    }

    fn entries(&self, category: CategoryId, tag: &str) -> Result<Vec<Entry>> {
        Ok(self.sorted(|s| s.category == category && s.entry.tag() == tag))
    }

    fn all_entries(&self, category: CategoryId) -> Result<Vec<Entry>> {
        Ok(self.sorted(|s| s.category == category))
    }

    fn insert_entry(&mut self, category: CategoryId, entry: &Entry) -> Result<()> {
        self.check_write(category, entry)?;
        if self.position_of(category, &entry.key()).is_some() {
            return Err(PensiveError::DuplicateEntry);
        }
        self.next_entry += 1;
        self.entries.push(StoredEntry {
            seq: self.next_entry,
            category,
            entry: entry.clone(),
        });
        Ok(())
    }

    fn update_entry(
        &mut self,
        category: CategoryId,
        key: &EntryKey,
        entry: &Entry,
    ) -> Result<()> {
        self.check_write(category, entry)?;
        let idx = self
            .position_of(category, key)
            .ok_or_else(|| PensiveError::EntryNotFound(key.tag().to_string()))?;
        if let Some(other) = self.position_of(category, &entry.key()) {
            if other != idx {
                return Err(PensiveError::DuplicateEntry);
            }
        }
        self.entries[idx].entry = entry.clone();
        Ok(())
    }

    fn delete_entry(&mut self, category: CategoryId, key: &EntryKey) -> Result<bool> {
        match self.position_of(category, key) {
            Some(idx) => {
                self.entries.remove(idx);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

// --- Test Fixtures ---

#[cfg(test)]
pub mod fixtures {
    use super::*;

    /// Builder for a populated [`InMemoryStore`].
    pub struct StoreFixture {
        pub store: InMemoryStore,
    }

    impl Default for StoreFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl StoreFixture {
        pub fn new() -> Self {
            Self {
                store: InMemoryStore::new(),
            }
        }

        pub fn with_category(mut self, name: &str, format: Format) -> Self {
            self.store.insert_category(name, format).unwrap();
            self
        }

        pub fn with_tag(mut self, tag: &str) -> Self {
            self.store.insert_tag(tag).unwrap();
            self
        }

        /// Files `entry` under the category named `category`.
        pub fn with_entry(mut self, category: &str, entry: Entry) -> Self {
            let id = self.id(category);
            self.store.insert_entry(id, &entry).unwrap();
            self
        }

        pub fn id(&self, category: &str) -> CategoryId {
            self.store
                .categories
                .iter()
                .find(|c| c.name == category)
                .map(|c| c.id)
                .unwrap()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::StoreFixture;
    use super::*;

    #[test]
    fn update_into_existing_key_is_rejected() {
        let fx = StoreFixture::new()
            .with_category("howtos", Format::Titled)
            .with_tag("rust")
            .with_entry("howtos", Entry::titled("rust", 0, "a", "x"))
            .with_entry("howtos", Entry::titled("rust", 1, "b", "x"));
        let id = fx.id("howtos");
        let mut store = fx.store;

        let a = Entry::titled("rust", 0, "a", "x");
        let clash = Entry::titled("rust", 0, "b", "x");
        assert!(matches!(
            store.update_entry(id, &a.key(), &clash),
            Err(PensiveError::DuplicateEntry)
        ));
        assert_eq!(store.entries(id, "rust").unwrap().len(), 2);
    }

    #[test]
    fn equal_positions_keep_insertion_order() {
        let fx = StoreFixture::new()
            .with_category("howtos", Format::Titled)
            .with_tag("t")
            .with_entry("howtos", Entry::titled("t", 0, "second", ""))
            .with_entry("howtos", Entry::titled("t", 0, "first", ""));
        let id = fx.id("howtos");
        let titles: Vec<_> = fx
            .store
            .entries(id, "t")
            .unwrap()
            .into_iter()
            .filter_map(|e| e.title().map(str::to_string))
            .collect();
        assert_eq!(titles, vec!["second", "first"]);
    }

    #[test]
    fn tag_rename_conflict_leaves_state() {
        let mut store = StoreFixture::new().with_tag("a").with_tag("b").store;
        assert!(matches!(
            store.rename_tag("a", "b"),
            Err(PensiveError::NameConflict(_))
        ));
        assert!(store.list_tags().unwrap().contains("a"));
        assert!(matches!(
            store.rename_tag("zz", "c"),
            Err(PensiveError::TagNotFound(_))
        ));
    }
}
