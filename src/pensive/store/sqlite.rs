//! SQLite-backed store.
//!
//! One database file holds the registry, the tag set and every entry. The
//! schema is created on first open; a file that already has the registry table
//! is used as is.

use super::DataStore;
use crate::error::{PensiveError, Result};
use crate::model::{Category, CategoryId, Entry, EntryKey, Format};
use rusqlite::types::Value;
use rusqlite::{ffi, params, params_from_iter, Connection, OpenFlags, OptionalExtension};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

const SCHEMA: &str = "
    CREATE TABLE categories (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        ordinal INTEGER NOT NULL,
        name TEXT NOT NULL UNIQUE,
        format INTEGER NOT NULL CHECK (format IN (0, 1, 2))
    );

    CREATE TABLE tags (
        name TEXT PRIMARY KEY
    );

    CREATE TABLE entries (
        id INTEGER PRIMARY KEY,
        category_id INTEGER NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
        format INTEGER NOT NULL,
        tag TEXT NOT NULL REFERENCES tags(name),
        position INTEGER NOT NULL DEFAULT 0,
        title TEXT,
        body TEXT NOT NULL,
        attachment TEXT
    );

    CREATE UNIQUE INDEX uniq_note ON entries(category_id, tag)
        WHERE format = 0;
    CREATE UNIQUE INDEX uniq_titled ON entries(category_id, tag, title, body)
        WHERE format = 1;
    CREATE UNIQUE INDEX uniq_attached ON entries(category_id, tag, title, attachment)
        WHERE format = 2;
    CREATE INDEX idx_entries_tag ON entries(tag);
";

const ENTRY_COLUMNS: &str = "format, tag, position, title, body, attachment";

pub struct SqliteStore {
    conn: Connection,
    initialized: bool,
}

impl SqliteStore {
    /// Opens (or creates) the store file at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        debug!(path = %path.display(), "opening store");
        Self::with_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let initialized = if has_registry(&conn)? {
            false
        } else {
            conn.execute_batch(SCHEMA)?;
            info!("created pensive schema");
            true
        };
        Ok(Self { conn, initialized })
    }

    /// True if opening this store created the schema.
    pub fn initialized(&self) -> bool {
        self.initialized
    }

    fn category_format(&self, id: CategoryId) -> Result<Format> {
        let format: Option<i64> = self
            .conn
            .query_row(
                "SELECT format FROM categories WHERE id = ?1",
                params![id.0],
                |row| row.get(0),
            )
            .optional()?;
        match format {
            Some(f) => Format::from_id(f),
            None => Err(PensiveError::CategoryNotFound(format!("#{}", id.0))),
        }
    }

    fn check_format(&self, category: CategoryId, entry: &Entry) -> Result<()> {
        let expected = self.category_format(category)?;
        if entry.format() != expected {
            return Err(PensiveError::FormatMismatch {
                from: entry.format(),
                to: expected,
            });
        }
        Ok(())
    }

    fn query_entries(&self, sql: &str, args: Vec<Value>) -> Result<Vec<Entry>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map(params_from_iter(args), |row| {
                Ok(RawEntry {
                    format: row.get(0)?,
                    tag: row.get(1)?,
                    position: row.get(2)?,
                    title: row.get(3)?,
                    body: row.get(4)?,
                    attachment: row.get(5)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(RawEntry::into_entry).collect()
    }
}

/// Checks whether the database behind `conn` has the registry table.
pub fn has_registry(conn: &Connection) -> Result<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'categories'",
            [],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

/// True if `path` is a readable SQLite file carrying the registry table.
pub fn is_store_file(path: &Path) -> bool {
    Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .map_err(PensiveError::from)
        .and_then(|conn| has_registry(&conn))
        .unwrap_or(false)
}

struct RawEntry {
    format: i64,
    tag: String,
    position: i64,
    title: Option<String>,
    body: String,
    attachment: Option<String>,
}

impl RawEntry {
    fn into_entry(self) -> Result<Entry> {
        let entry = match Format::from_id(self.format)? {
            Format::Note => Entry::note(self.tag, self.body),
            Format::Titled => Entry::titled(
                self.tag,
                self.position,
                self.title.unwrap_or_default(),
                self.body,
            ),
            Format::Attached => Entry::attached(
                self.tag,
                self.position,
                self.title.unwrap_or_default(),
                self.body,
                self.attachment.unwrap_or_default(),
            ),
        };
        Ok(entry)
    }
}

/// Column values for an entry in `format, tag, position, title, body, attachment` order.
fn entry_values(entry: &Entry) -> Vec<Value> {
    vec![
        Value::Integer(i64::from(entry.format().id())),
        Value::Text(entry.tag().to_string()),
        Value::Integer(entry.position()),
        entry.title().map(str::to_string).into(),
        Value::Text(entry.body().to_string()),
        entry.attachment().map(str::to_string).into(),
    ]
}

/// WHERE clause (without category) selecting the row a key names.
fn key_filter(key: &EntryKey) -> (&'static str, Vec<Value>) {
    match key {
        EntryKey::Note { tag } => ("format = 0 AND tag = ?", vec![Value::Text(tag.clone())]),
        EntryKey::Titled { tag, title, body } => (
            "format = 1 AND tag = ? AND title = ? AND body = ?",
            vec![
                Value::Text(tag.clone()),
                Value::Text(title.clone()),
                Value::Text(body.clone()),
            ],
        ),
        EntryKey::Attached {
            tag,
            title,
            attachment,
        } => (
            "format = 2 AND tag = ? AND title = ? AND attachment = ?",
            vec![
                Value::Text(tag.clone()),
                Value::Text(title.clone()),
                Value::Text(attachment.clone()),
            ],
        ),
    }
}

enum Violation {
    Unique,
    ForeignKey,
}

fn violation(err: &rusqlite::Error) -> Option<Violation> {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => match e.extended_code {
            ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                Some(Violation::Unique)
            }
            ffi::SQLITE_CONSTRAINT_FOREIGNKEY => Some(Violation::ForeignKey),
            _ => None,
        },
        _ => None,
    }
}

/// Maps constraint failures of an entry write to domain errors.
fn entry_write_error(err: rusqlite::Error, tag: &str) -> PensiveError {
    match violation(&err) {
        Some(Violation::Unique) => PensiveError::DuplicateEntry,
        Some(Violation::ForeignKey) => PensiveError::TagNotFound(tag.to_string()),
        None => PensiveError::Database(err),
    }
}

impl DataStore for SqliteStore {
    fn list_categories(&self) -> Result<Vec<Category>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, ordinal, name, format FROM categories ORDER BY ordinal")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, i64>(3)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(id, ordinal, name, format)| {
                Ok(Category {
                    id: CategoryId(id),
                    ordinal: ordinal as usize,
                    name,
                    format: Format::from_id(format)?,
                })
            })
            .collect()
    }

    fn insert_category(&mut self, name: &str, format: Format) -> Result<Category> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))?;
        self.conn
            .execute(
                "INSERT INTO categories (ordinal, name, format) VALUES (?1, ?2, ?3)",
                params![count, name, format.id()],
            )
            .map_err(|e| match violation(&e) {
                Some(Violation::Unique) => PensiveError::DuplicateCategory(name.to_string()),
                _ => PensiveError::Database(e),
            })?;
        let id = CategoryId(self.conn.last_insert_rowid());
        info!(name, %format, ordinal = count, "added category");
        Ok(Category {
            id,
            ordinal: count as usize,
            name: name.to_string(),
            format,
        })
    }

    fn delete_category(&mut self, id: CategoryId) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let dropped = tx.execute("DELETE FROM entries WHERE category_id = ?1", params![id.0])?;
        let removed = tx.execute("DELETE FROM categories WHERE id = ?1", params![id.0])?;
        if removed == 0 {
            return Err(PensiveError::CategoryNotFound(format!("#{}", id.0)));
        }

        let remaining: Vec<i64> = {
            let mut stmt = tx.prepare("SELECT id FROM categories ORDER BY ordinal")?;
            let ids = stmt
                .query_map([], |row| row.get(0))?
                .collect::<rusqlite::Result<Vec<i64>>>()?;
            ids
        };
        for (ordinal, cat_id) in remaining.iter().enumerate() {
            tx.execute(
                "UPDATE categories SET ordinal = ?1 WHERE id = ?2",
                params![ordinal as i64, cat_id],
            )?;
        }
        tx.commit()?;
        info!(id = id.0, dropped, "removed category");
        Ok(dropped)
    }

    fn rename_category(&mut self, id: CategoryId, new_name: &str) -> Result<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE categories SET name = ?1 WHERE id = ?2",
                params![new_name, id.0],
            )
            .map_err(|e| match violation(&e) {
                Some(Violation::Unique) => PensiveError::NameConflict(new_name.to_string()),
                _ => PensiveError::Database(e),
            })?;
        if changed == 0 {
            return Err(PensiveError::CategoryNotFound(format!("#{}", id.0)));
        }
        info!(id = id.0, new_name, "renamed category");
        Ok(())
    }

    fn list_tags(&self) -> Result<BTreeSet<String>> {
        let mut stmt = self.conn.prepare("SELECT name FROM tags")?;
        let tags = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<BTreeSet<String>>>()?;
        Ok(tags)
    }

    fn insert_tag(&mut self, name: &str) -> Result<bool> {
        let changed = self
            .conn
            .execute("INSERT OR IGNORE INTO tags (name) VALUES (?1)", params![name])?;
        debug!(name, added = changed == 1, "insert tag");
        Ok(changed == 1)
    }

    fn delete_tag(&mut self, name: &str) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let dropped = tx.execute("DELETE FROM entries WHERE tag = ?1", params![name])?;
        let removed = tx.execute("DELETE FROM tags WHERE name = ?1", params![name])?;
        if removed == 0 {
            return Err(PensiveError::TagNotFound(name.to_string()));
        }
        tx.commit()?;
        info!(name, dropped, "removed tag");
        Ok(dropped)
    }

    fn rename_tag(&mut self, old: &str, new: &str) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let exists: Option<i64> = tx
            .query_row("SELECT 1 FROM tags WHERE name = ?1", params![old], |row| {
                row.get(0)
            })
            .optional()?;
        if exists.is_none() {
            return Err(PensiveError::TagNotFound(old.to_string()));
        }
        tx.execute("INSERT INTO tags (name) VALUES (?1)", params![new])
            .map_err(|e| match violation(&e) {
                Some(Violation::Unique) => PensiveError::NameConflict(new.to_string()),
                _ => PensiveError::Database(e),
            })?;
        let refiled = tx.execute(
            "UPDATE entries SET tag = ?1 WHERE tag = ?2",
            params![new, old],
        )?;
        tx.execute("DELETE FROM tags WHERE name = ?1", params![old])?;
        tx.commit()?;
        info!(old, new, refiled, "renamed tag");
        Ok(refiled)
    }

    fn entries(&self, category: CategoryId, tag: &str) -> Result<Vec<Entry>> {
        debug!(category = category.0, tag, "load entries");
        self.query_entries(
            &format!(
                "SELECT {} FROM entries WHERE category_id = ? AND tag = ? ORDER BY position, id",
                ENTRY_COLUMNS
            ),
            vec![Value::Integer(category.0), Value::Text(tag.to_string())],
        )
    }

    fn all_entries(&self, category: CategoryId) -> Result<Vec<Entry>> {
        debug!(category = category.0, "load all entries");
        self.query_entries(
            &format!(
                "SELECT {} FROM entries WHERE category_id = ? ORDER BY position, id",
                ENTRY_COLUMNS
            ),
            vec![Value::Integer(category.0)],
        )
    }

    fn insert_entry(&mut self, category: CategoryId, entry: &Entry) -> Result<()> {
        self.check_format(category, entry)?;
        let mut args = vec![Value::Integer(category.0)];
        args.extend(entry_values(entry));
        self.conn
            .execute(
                &format!(
                    "INSERT INTO entries (category_id, {}) VALUES (?, ?, ?, ?, ?, ?, ?)",
                    ENTRY_COLUMNS
                ),
                params_from_iter(args),
            )
            .map_err(|e| entry_write_error(e, entry.tag()))?;
        debug!(category = category.0, tag = entry.tag(), "inserted entry");
        Ok(())
    }

    fn update_entry(
        &mut self,
        category: CategoryId,
        key: &EntryKey,
        entry: &Entry,
    ) -> Result<()> {
        self.check_format(category, entry)?;
        let (filter, key_args) = key_filter(key);
        let mut args = entry_values(entry);
        args.push(Value::Integer(category.0));
        args.extend(key_args);
        let changed = self
            .conn
            .execute(
                &format!(
                    "UPDATE entries SET format = ?, tag = ?, position = ?, title = ?, body = ?, attachment = ? \
                     WHERE category_id = ? AND {}",
                    filter
                ),
                params_from_iter(args),
            )
            .map_err(|e| entry_write_error(e, entry.tag()))?;
        if changed == 0 {
            return Err(PensiveError::EntryNotFound(key.tag().to_string()));
        }
        debug!(category = category.0, tag = entry.tag(), "updated entry");
        Ok(())
    }

    fn delete_entry(&mut self, category: CategoryId, key: &EntryKey) -> Result<bool> {
        let (filter, key_args) = key_filter(key);
        let mut args = vec![Value::Integer(category.0)];
        args.extend(key_args);
        let removed = self.conn.execute(
            &format!("DELETE FROM entries WHERE category_id = ? AND {}", filter),
            params_from_iter(args),
        )?;
        debug!(category = category.0, tag = key.tag(), removed, "delete entry");
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store_with(categories: &[(&str, Format)], tags: &[&str]) -> (SqliteStore, Vec<Category>) {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let cats = categories
            .iter()
            .map(|(name, format)| store.insert_category(name, *format).unwrap())
            .collect();
        for tag in tags {
            store.insert_tag(tag).unwrap();
        }
        (store, cats)
    }

    #[test]
    fn first_open_creates_schema_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("pensive.sqlite");

        let store = SqliteStore::open(&path).unwrap();
        assert!(store.initialized());
        drop(store);

        let store = SqliteStore::open(&path).unwrap();
        assert!(!store.initialized());
        assert!(is_store_file(&path));
    }

    #[test]
    fn foreign_files_are_not_store_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("other.sqlite");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch("CREATE TABLE unrelated (x INTEGER);")
            .unwrap();
        drop(conn);
        assert!(!is_store_file(&path));

        let text = dir.path().join("notes.sqlite");
        std::fs::write(&text, "not a database").unwrap();
        assert!(!is_store_file(&text));
    }

    #[test]
    fn categories_get_dense_ordinals() {
        let (mut store, cats) = store_with(
            &[
                ("commands", Format::Note),
                ("howtos", Format::Titled),
                ("links", Format::Attached),
            ],
            &[],
        );
        store.delete_category(cats[0].id).unwrap();

        let listed = store.list_categories().unwrap();
        let summary: Vec<(usize, &str)> = listed
            .iter()
            .map(|c| (c.ordinal, c.name.as_str()))
            .collect();
        assert_eq!(summary, vec![(0, "howtos"), (1, "links")]);

        let added = store.insert_category("more", Format::Note).unwrap();
        assert_eq!(added.ordinal, 2);
    }

    #[test]
    fn duplicate_category_and_rename_conflict() {
        let (mut store, cats) =
            store_with(&[("a", Format::Note), ("b", Format::Titled)], &[]);
        assert!(matches!(
            store.insert_category("a", Format::Titled),
            Err(PensiveError::DuplicateCategory(_))
        ));
        assert!(matches!(
            store.rename_category(cats[0].id, "b"),
            Err(PensiveError::NameConflict(_))
        ));
        store.rename_category(cats[0].id, "c").unwrap();
        let listed = store.list_categories().unwrap();
        assert_eq!(listed[0].name, "c");
        assert_eq!(listed[0].ordinal, 0);
    }

    #[test]
    fn titled_collision_keeps_single_row() {
        let (mut store, cats) = store_with(&[("howtos", Format::Titled)], &["rust"]);
        let entry = Entry::titled("rust", 0, "Traits", "impl blocks");
        store.insert_entry(cats[0].id, &entry).unwrap();

        let again = Entry::titled("rust", 5, "Traits", "impl blocks");
        assert!(matches!(
            store.insert_entry(cats[0].id, &again),
            Err(PensiveError::DuplicateEntry)
        ));
        assert_eq!(store.entries(cats[0].id, "rust").unwrap(), vec![entry]);
    }

    #[test]
    fn attached_key_ignores_body() {
        let (mut store, cats) = store_with(&[("links", Format::Attached)], &["rust"]);
        let id = cats[0].id;
        store
            .insert_entry(id, &Entry::attached("rust", 0, "Book", "a", "https://x"))
            .unwrap();
        assert!(matches!(
            store.insert_entry(id, &Entry::attached("rust", 1, "Book", "b", "https://x")),
            Err(PensiveError::DuplicateEntry)
        ));
        store
            .insert_entry(id, &Entry::attached("rust", 1, "Book", "a", "https://y"))
            .unwrap();
        assert_eq!(store.entries(id, "rust").unwrap().len(), 2);
    }

    #[test]
    fn entry_requires_known_tag_and_matching_format() {
        let (mut store, cats) = store_with(&[("notes", Format::Note)], &["rust"]);
        assert!(matches!(
            store.insert_entry(cats[0].id, &Entry::note("nope", "x")),
            Err(PensiveError::TagNotFound(_))
        ));
        assert!(matches!(
            store.insert_entry(cats[0].id, &Entry::titled("rust", 0, "t", "b")),
            Err(PensiveError::FormatMismatch { .. })
        ));
    }

    #[test]
    fn entries_come_back_by_position() {
        let (mut store, cats) = store_with(&[("howtos", Format::Titled)], &["rust"]);
        let id = cats[0].id;
        for (pos, title) in [(3, "c"), (1, "a"), (2, "b")] {
            store
                .insert_entry(id, &Entry::titled("rust", pos, title, ""))
                .unwrap();
        }
        let titles: Vec<String> = store
            .entries(id, "rust")
            .unwrap()
            .iter()
            .filter_map(|e| e.title().map(str::to_string))
            .collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
    }

    #[test]
    fn update_by_pre_edit_key() {
        let (mut store, cats) = store_with(&[("howtos", Format::Titled)], &["rust"]);
        let id = cats[0].id;
        let before = Entry::titled("rust", 0, "Old", "body");
        store.insert_entry(id, &before).unwrap();

        let after = Entry::titled("rust", 4, "New", "body\nmore");
        store.update_entry(id, &before.key(), &after).unwrap();
        assert_eq!(store.entries(id, "rust").unwrap(), vec![after.clone()]);

        assert!(matches!(
            store.update_entry(id, &before.key(), &after),
            Err(PensiveError::EntryNotFound(_))
        ));
    }

    #[test]
    fn removing_tag_cascades_everywhere() {
        let (mut store, cats) = store_with(
            &[("notes", Format::Note), ("howtos", Format::Titled)],
            &["x", "y"],
        );
        store
            .insert_entry(cats[0].id, &Entry::note("x", "text"))
            .unwrap();
        store
            .insert_entry(cats[1].id, &Entry::titled("x", 0, "t", "b"))
            .unwrap();
        store
            .insert_entry(cats[1].id, &Entry::titled("y", 0, "t", "b"))
            .unwrap();

        assert_eq!(store.delete_tag("x").unwrap(), 2);
        let count: i64 = store
            .conn
            .query_row("SELECT COUNT(*) FROM entries WHERE tag = 'x'", [], |r| {
                r.get(0)
            })
            .unwrap();
        assert_eq!(count, 0);
        assert!(!store.list_tags().unwrap().contains("x"));
        assert_eq!(store.entries(cats[1].id, "y").unwrap().len(), 1);
    }

    #[test]
    fn renaming_tag_refiles_all_categories() {
        let (mut store, cats) = store_with(
            &[
                ("notes", Format::Note),
                ("howtos", Format::Titled),
                ("links", Format::Attached),
            ],
            &["old", "taken"],
        );
        store.insert_entry(cats[0].id, &Entry::note("old", "n")).unwrap();
        store
            .insert_entry(cats[1].id, &Entry::titled("old", 0, "t", "b"))
            .unwrap();
        store
            .insert_entry(cats[2].id, &Entry::attached("old", 0, "t", "", "x/y"))
            .unwrap();

        assert!(matches!(
            store.rename_tag("old", "taken"),
            Err(PensiveError::NameConflict(_))
        ));
        assert_eq!(store.entries(cats[0].id, "old").unwrap().len(), 1);

        assert_eq!(store.rename_tag("old", "new").unwrap(), 3);
        let tags = store.list_tags().unwrap();
        assert!(tags.contains("new") && !tags.contains("old"));
        for cat in &cats {
            assert_eq!(store.entries(cat.id, "new").unwrap().len(), 1);
            assert!(store.entries(cat.id, "old").unwrap().is_empty());
        }
    }

    #[test]
    fn removing_category_drops_its_entries() {
        let (mut store, cats) = store_with(
            &[("a", Format::Note), ("b", Format::Note)],
            &["t"],
        );
        store.insert_entry(cats[0].id, &Entry::note("t", "1")).unwrap();
        store.insert_entry(cats[1].id, &Entry::note("t", "2")).unwrap();
        assert_eq!(store.delete_category(cats[0].id).unwrap(), 1);
        assert_eq!(
            store.entries(cats[1].id, "t").unwrap(),
            vec![Entry::note("t", "2")]
        );
    }
}
