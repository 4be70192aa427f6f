//! Plain text export.
//!
//! One file per tag under `<export_dir>/<timestamp>/`, holding the tag's
//! non-empty section of every category in ordinal order.

use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::index::index_label;
use crate::model::{Catalog, Category, Entry, Format};
use crate::store::DataStore;
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Text of one category's section, or `None` when nothing is filed.
pub fn section_text(category: &Category, entries: &[Entry]) -> Option<String> {
    if entries.is_empty() {
        return None;
    }
    let mut out = format!("{}:\n", category.name);
    match category.format {
        Format::Note => {
            for line in entries[0].body().split('\n') {
                out.push_str(&format!("    {}\n", line));
            }
        }
        Format::Titled | Format::Attached => {
            for (i, entry) in entries.iter().enumerate() {
                let title = entry.title().unwrap_or_default();
                match entry.attachment() {
                    Some(attachment) => {
                        let description = if entry.body().is_empty() {
                            String::new()
                        } else {
                            format!(" - {}", entry.body())
                        };
                        out.push_str(&format!("{} {}{}\n", index_label(i), title, description));
                        out.push_str(&format!("        {}\n", attachment));
                    }
                    None => {
                        out.push_str(&format!("{} {}\n", index_label(i), title));
                        for line in entry.body().split('\n') {
                            out.push_str(&format!("        {}\n", line));
                        }
                    }
                }
                out.push('\n');
            }
        }
    }
    Some(out)
}

/// Turns a tag into a safe file name.
///
/// Path separators become `_`; `.` and `..` get a leading `_`.
pub fn file_name(tag: &str) -> String {
    let name: String = tag
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | '\0') { '_' } else { c })
        .collect();
    if name == "." || name == ".." {
        format!("_{}", name)
    } else {
        name
    }
}

pub fn run<S: DataStore>(store: &S, catalog: &Catalog, export_dir: &Path) -> Result<CmdResult> {
    let target: PathBuf = export_dir.join(Local::now().format("%Y%m%d-%H%M%S").to_string());
    fs::create_dir_all(&target)?;

    for tag in &catalog.tags {
        let mut text = String::new();
        for category in &catalog.categories {
            let entries = store.entries(category.id, tag)?;
            if let Some(section) = section_text(category, &entries) {
                text.push_str(&section);
            }
        }
        fs::write(target.join(file_name(tag)), text)?;
    }
    info!(dir = %target.display(), tags = catalog.tags.len(), "exported");

    Ok(CmdResult::default()
        .with_message(CmdMessage::success(format!(
            "Exported {} tag{} to {}",
            catalog.tags.len(),
            super::helpers::plural(catalog.tags.len()),
            target.display()
        )))
        .with_paths(vec![target]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::helpers::load_catalog;
    use crate::store::memory::fixtures::StoreFixture;
    use tempfile::tempdir;

    fn fixture() -> StoreFixture {
        StoreFixture::new()
            .with_category("commands", Format::Note)
            .with_category("howtos", Format::Titled)
            .with_category("links", Format::Attached)
            .with_tag("git")
            .with_tag("empty")
            .with_entry("commands", Entry::note("git", "git log\ngit status"))
            .with_entry("howtos", Entry::titled("git", 0, "Rebase", "step 1\nstep 2"))
            .with_entry("links", Entry::attached("git", 0, "Book", "", "https://git-scm.com/book"))
            .with_entry("links", Entry::attached("git", 1, "Man", "local", "/usr/share/man"))
    }

    #[test]
    fn writes_one_file_per_tag() {
        let fx = fixture();
        let catalog = load_catalog(&fx.store).unwrap();
        let dir = tempdir().unwrap();
        let result = run(&fx.store, &catalog, dir.path()).unwrap();

        let out = &result.paths[0];
        assert!(out.starts_with(dir.path()));
        let git = fs::read_to_string(out.join("git")).unwrap();
        assert_eq!(
            git,
            "commands:\n    git log\n    git status\n\
             howtos:\n    [0] Rebase\n        step 1\n        step 2\n\n\
             links:\n    [0] Book\n        https://git-scm.com/book\n\n    \
             [1] Man - local\n        /usr/share/man\n\n"
        );
        assert_eq!(fs::read_to_string(out.join("empty")).unwrap(), "");
    }

    #[test]
    fn empty_categories_are_skipped() {
        let category = Category {
            id: crate::model::CategoryId(1),
            ordinal: 0,
            name: "x".into(),
            format: Format::Titled,
        };
        assert_eq!(section_text(&category, &[]), None);
    }

    #[test]
    fn tags_become_safe_file_names() {
        assert_eq!(file_name("c/c++"), "c_c++");
        assert_eq!(file_name(".."), "_..");
        assert_eq!(file_name("rust"), "rust");
    }
}
