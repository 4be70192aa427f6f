//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer. It is the single
//! entry point for all pensive operations, whatever the UI.
//!
//! ## Role and Responsibilities
//!
//! The API facade:
//! - **Dispatches** to the appropriate command function
//! - **Normalizes inputs** (tag names, category letters, entry selectors)
//! - **Owns the catalog**: the category registry and tag set as last read,
//!   refreshed after every mutating call
//! - **Returns structured types** (`Result<CmdResult>`)
//!
//! ## What the API Does NOT Do
//!
//! - **Business logic**: That belongs in `commands/*.rs`
//! - **I/O operations**: No stdout, stderr, prompts or editor launches
//! - **Presentation concerns**: Returns data structures, not strings
//!
//! ## Generic Over DataStore
//!
//! `PensiveApi<S: DataStore>` is generic over the storage backend:
//! - Production: `PensiveApi<SqliteStore>`
//! - Testing: `PensiveApi<InMemoryStore>`
//!
//! Restoring a backup replaces the database file, so it is only offered on
//! the SQLite-backed API.

use crate::commands::{self, entries, transfer, CmdResult};
use crate::config::PensivePaths;
use crate::editor::{parse_buffer, template};
use crate::error::{PensiveError, Result};
use crate::index::{MoveTarget, Selector};
use crate::model::{Catalog, Category, Format};
use crate::store::sqlite::SqliteStore;
use crate::store::DataStore;
use crate::tags::normalize_tag;

/// An entry opened for editing: the buffer to hand to an editor and where
/// the result goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    pub category: Category,
    pub tag: String,
    /// Existing titled entry being edited; `None` for notes and new entries.
    pub index: Option<usize>,
    pub buffer: String,
}

/// The main API facade for pensive operations.
pub struct PensiveApi<S: DataStore> {
    store: S,
    catalog: Catalog,
    paths: PensivePaths,
    highlight_tags: bool,
}

impl<S: DataStore> PensiveApi<S> {
    pub fn new(store: S, paths: PensivePaths, highlight_tags: bool) -> Result<Self> {
        let catalog = commands::helpers::load_catalog(&store)?;
        Ok(Self {
            store,
            catalog,
            paths,
            highlight_tags,
        })
    }

    /// Re-reads the registry and tag set.
    pub fn refresh(&mut self) -> Result<()> {
        self.catalog = commands::helpers::load_catalog(&self.store)?;
        Ok(())
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn paths(&self) -> &PensivePaths {
        &self.paths
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        normalize_tag(tag).is_ok_and(|t| self.catalog.has_tag(&t))
    }

    fn refreshed(&mut self, result: Result<CmdResult>) -> Result<CmdResult> {
        let result = result?;
        self.refresh()?;
        Ok(result)
    }

    fn category(&self, selector: &str) -> Result<(Category, Option<usize>)> {
        let selector: Selector = selector.parse()?;
        let category = selector.resolve(&self.catalog)?.clone();
        Ok((category, selector.index))
    }

    // --- categories ---

    pub fn list_categories(&self) -> Result<CmdResult> {
        commands::categories::list(&self.store)
    }

    pub fn add_category(&mut self, name: &str, format: Format) -> Result<CmdResult> {
        let result = commands::categories::add(&mut self.store, name, format);
        self.refreshed(result)
    }

    pub fn remove_category(&mut self, name: &str) -> Result<CmdResult> {
        let result = commands::categories::remove(&mut self.store, &self.catalog, name);
        self.refreshed(result)
    }

    pub fn rename_category(&mut self, old: &str, new: &str) -> Result<CmdResult> {
        let result = commands::categories::rename(&mut self.store, &self.catalog, old, new);
        self.refreshed(result)
    }

    // --- tags ---

    pub fn list_tags(&self, pattern: Option<&str>) -> Result<CmdResult> {
        commands::tags::list(&self.store, pattern)
    }

    pub fn add_tags<I: AsRef<str>>(&mut self, names: &[I]) -> Result<CmdResult> {
        let result = commands::tags::add(&mut self.store, names);
        self.refreshed(result)
    }

    pub fn remove_tag(&mut self, name: &str) -> Result<CmdResult> {
        let result = commands::tags::remove(&mut self.store, name);
        self.refreshed(result)
    }

    pub fn rename_tag(&mut self, old: &str, new: &str) -> Result<CmdResult> {
        let result = commands::tags::rename(&mut self.store, old, new);
        self.refreshed(result)
    }

    // --- entries ---

    /// Everything under `tag`, one category (`A`), or one entry (`B3`).
    pub fn show(&self, tag: &str, selector: Option<&str>) -> Result<CmdResult> {
        let tag = normalize_tag(tag)?;
        let highlight = self.highlight_tags;
        match selector {
            None => commands::overview::run(&self.store, &self.catalog, &tag, highlight),
            Some(s) => match self.category(s)? {
                (category, None) => commands::overview::category(
                    &self.store,
                    &self.catalog,
                    &category,
                    &tag,
                    highlight,
                ),
                (category, Some(index)) => commands::overview::entry(
                    &self.store,
                    &self.catalog,
                    &category,
                    &tag,
                    index,
                    highlight,
                ),
            },
        }
    }

    /// Prepares the editor buffer for `selector` under `tag`.
    ///
    /// `L` opens the note of a format 0 category or a blank template for a
    /// new titled entry; `Ln` opens an existing titled entry.
    pub fn begin_edit(&self, tag: &str, selector: &str) -> Result<EditSession> {
        let tag = normalize_tag(tag)?;
        commands::helpers::require_tag(&self.catalog, &tag)?;
        let (category, index) = self.category(selector)?;
        if index.is_some() {
            commands::helpers::require_indexed(&category)?;
        }
        let buffer = match (category.format, index) {
            (Format::Note, _) => entries::note_text(&self.store, &category, &tag)?,
            (format, None) => template(format, None),
            (format, Some(i)) => {
                let entry = entries::get(&self.store, &category, &tag, i)?;
                template(format, Some(&entry))
            }
        };
        Ok(EditSession {
            category,
            tag,
            index,
            buffer,
        })
    }

    /// Stores an edited buffer.
    pub fn finish_edit(&mut self, session: &EditSession, buffer: &str) -> Result<CmdResult> {
        let entry = parse_buffer(session.category.format, &session.tag, buffer)?;
        let result = match (session.category.format, session.index) {
            (Format::Note, _) => {
                entries::save_note(&mut self.store, &session.category, &session.tag, entry.body())
            }
            (_, None) => entries::create(&mut self.store, &session.category, &entry),
            (_, Some(i)) => {
                entries::update(&mut self.store, &session.category, &session.tag, i, &entry)
            }
        };
        self.refreshed(result)
    }

    /// Removes the note (`L`) or titled entry (`Ln`) under `tag`.
    pub fn remove(&mut self, tag: &str, selector: &str) -> Result<CmdResult> {
        let tag = normalize_tag(tag)?;
        commands::helpers::require_tag(&self.catalog, &tag)?;
        let (category, index) = self.category(selector)?;
        if index.is_some() {
            commands::helpers::require_indexed(&category)?;
        }
        let result = match (category.format, index) {
            (Format::Note, _) => entries::remove_note(&mut self.store, &category, &tag),
            (_, Some(i)) => entries::remove(&mut self.store, &category, &tag, i),
            (_, None) => Err(PensiveError::Api(format!(
                "Select an entry of '{}' by index to remove it",
                category.name
            ))),
        };
        self.refreshed(result)
    }

    /// Moves `source` (`L` or `Ln`) under `tag` to `target` (`L` or `L@tag`).
    pub fn move_entry(&mut self, tag: &str, source: &str, target: &str) -> Result<CmdResult> {
        let tag = normalize_tag(tag)?;
        commands::helpers::require_tag(&self.catalog, &tag)?;
        let (source_category, index) = self.category(source)?;
        let target: MoveTarget = target.parse()?;
        let target_category = target.resolve(&self.catalog)?.clone();
        let target_tag = target.tag.unwrap_or_else(|| tag.clone());

        let result = transfer::run(
            &mut self.store,
            transfer::Source {
                category: &source_category,
                tag: &tag,
                index,
            },
            transfer::Target {
                category: &target_category,
                tag: &target_tag,
            },
        );
        self.refreshed(result)
    }

    // --- search, export, backups ---

    pub fn search(&self, pattern: &str) -> Result<CmdResult> {
        commands::search::run(&self.store, &self.catalog, pattern)
    }

    pub fn export(&self) -> Result<CmdResult> {
        commands::export::run(&self.store, &self.catalog, &self.paths.export_dir)
    }

    pub fn backup(&self, name: Option<&str>) -> Result<CmdResult> {
        commands::backup::create(&self.paths.database, &self.paths.backup_dir, name)
    }

    pub fn backups(&self) -> Result<CmdResult> {
        commands::backup::list(&self.paths.backup_dir)
    }
}

impl PensiveApi<SqliteStore> {
    /// Whether opening the store created its schema.
    pub fn initialized(&self) -> bool {
        self.store.initialized()
    }

    /// Copies backup `index` over the database and reopens it.
    pub fn restore(&mut self, index: usize) -> Result<CmdResult> {
        // Close the live connection before its file is replaced.
        self.store = SqliteStore::open_in_memory()?;
        let restored = commands::backup::restore(&self.paths.database, &self.paths.backup_dir, index);
        self.store = SqliteStore::open(&self.paths.database)?;
        let result = restored?;
        self.refresh()?;
        Ok(result)
    }
}

pub use crate::commands::{CmdMessage, MessageLevel};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::SectionBody;
    use crate::config::PensiveConfig;
    use crate::model::Entry;
    use crate::store::memory::InMemoryStore;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn api() -> PensiveApi<InMemoryStore> {
        let paths = PensivePaths::new(PathBuf::from("/tmp/pensive-test"), &PensiveConfig::default());
        let mut api = PensiveApi::new(InMemoryStore::new(), paths, false).unwrap();
        api.add_category("commands", Format::Note).unwrap();
        api.add_category("howtos", Format::Titled).unwrap();
        api.add_category("links", Format::Attached).unwrap();
        api.add_tags(&["git"]).unwrap();
        api
    }

    #[test]
    fn catalog_follows_mutations() {
        let mut api = api();
        assert_eq!(api.catalog().categories.len(), 3);
        assert!(api.has_tag("git"));

        api.rename_tag("git", "vcs").unwrap();
        assert!(!api.has_tag("git"));
        assert!(api.has_tag(" vcs "));

        api.remove_category("commands").unwrap();
        assert_eq!(api.catalog().categories[0].name, "howtos");
        assert_eq!(api.catalog().categories[0].ordinal, 0);
    }

    #[test]
    fn note_edit_round_trip() {
        let mut api = api();
        let session = api.begin_edit("git", "A").unwrap();
        assert_eq!(session.buffer, "");
        api.finish_edit(&session, "git log\n").unwrap();

        let session = api.begin_edit("git", "A").unwrap();
        assert_eq!(session.buffer, "git log");
    }

    #[test]
    fn titled_edit_creates_then_updates() {
        let mut api = api();
        let new = api.begin_edit("git", "B").unwrap();
        assert!(new.buffer.contains("[title]: title"));
        api.finish_edit(&new, "[position]: 1\n[title]: Rebase\n[body]:\ngit rebase -i\n")
            .unwrap();

        let existing = api.begin_edit("git", "B0").unwrap();
        assert!(existing.buffer.contains("[title]: Rebase"));
        let edited = existing.buffer.replace("Rebase", "Interactive rebase");
        api.finish_edit(&existing, &edited).unwrap();

        let view = api.show("git", Some("B0")).unwrap().entry.unwrap();
        assert_eq!(view.entry, Entry::titled("git", 1, "Interactive rebase", "git rebase -i"));
    }

    #[test]
    fn edit_needs_known_tag_and_category() {
        let api = api();
        assert!(matches!(
            api.begin_edit("nope", "A"),
            Err(PensiveError::TagNotFound(_))
        ));
        assert!(matches!(
            api.begin_edit("git", "Z"),
            Err(PensiveError::CategoryNotFound(_))
        ));
        assert!(matches!(api.begin_edit("git", "A1"), Err(PensiveError::Api(_))));
    }

    #[test]
    fn show_by_selector() {
        let mut api = api();
        let session = api.begin_edit("git", "A").unwrap();
        api.finish_edit(&session, "git log").unwrap();

        let all = api.show("git", None).unwrap();
        assert_eq!(all.sections.len(), 1);
        let one = api.show("git", Some("B")).unwrap();
        assert!(matches!(&one.sections[0].body, SectionBody::Titled(items) if items.is_empty()));
        assert!(matches!(
            api.show("git", Some("B0")),
            Err(PensiveError::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn remove_titled_needs_index() {
        let mut api = api();
        assert!(matches!(api.remove("git", "B"), Err(PensiveError::Api(_))));
    }

    #[test]
    fn move_to_other_tag_creates_it() {
        let mut api = api();
        let session = api.begin_edit("git", "A").unwrap();
        api.finish_edit(&session, "git log").unwrap();

        api.move_entry("git", "A", "A@vcs").unwrap();
        assert!(api.has_tag("vcs"));
        assert_eq!(api.begin_edit("vcs", "A").unwrap().buffer, "git log");
        assert_eq!(api.begin_edit("git", "A").unwrap().buffer, "");
    }

    #[test]
    fn sqlite_restore_reopens_store() {
        let dir = tempdir().unwrap();
        let paths = PensivePaths::new(dir.path().to_path_buf(), &PensiveConfig::default());
        let store = SqliteStore::open(&paths.database).unwrap();
        let mut api = PensiveApi::new(store, paths, false).unwrap();
        assert!(api.initialized());

        api.add_tags(&["kept"]).unwrap();
        api.backup(Some("one")).unwrap();
        api.add_tags(&["dropped"]).unwrap();

        api.restore(0).unwrap();
        assert!(api.has_tag("kept"));
        assert!(!api.has_tag("dropped"));
    }
}
