//! Everything filed under a tag.
//!
//! An overview has one [`Section`] per category, in ordinal order. Format 0
//! sections carry the note's lines, titled formats carry their indexed title
//! lists. Attachment kind and existence are probed here, on every call.

use super::helpers::{require_indexed, require_tag, text_lines};
use crate::attachment::{probe, AttachmentStatus};
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::highlight::Highlighted;
use crate::model::{Catalog, Category, Entry, Format};
use crate::store::DataStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitledItem {
    pub index: usize,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachedItem {
    pub index: usize,
    pub title: String,
    pub description: String,
    pub attachment: String,
    pub status: AttachmentStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionBody {
    Note(Vec<Highlighted>),
    Titled(Vec<TitledItem>),
    Attached(Vec<AttachedItem>),
}

impl SectionBody {
    pub fn is_empty(&self) -> bool {
        match self {
            SectionBody::Note(lines) => lines.is_empty(),
            SectionBody::Titled(items) => items.is_empty(),
            SectionBody::Attached(items) => items.is_empty(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub category: Category,
    pub body: SectionBody,
}

/// One titled entry shown in full.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryView {
    pub category: Category,
    pub index: usize,
    pub entry: Entry,
    pub lines: Vec<Highlighted>,
    pub attachment: Option<AttachmentStatus>,
}

/// Builds the section of `category` for `tag`. Empty if nothing is filed.
pub fn section<S: DataStore>(
    store: &S,
    catalog: &Catalog,
    category: &Category,
    tag: &str,
    highlight_tags: bool,
) -> Result<Section> {
    let entries = store.entries(category.id, tag)?;
    let body = match category.format {
        Format::Note => SectionBody::Note(
            entries
                .first()
                .map(|e| text_lines(e.body(), &catalog.tags, highlight_tags))
                .unwrap_or_default(),
        ),
        Format::Titled => SectionBody::Titled(
            entries
                .iter()
                .enumerate()
                .map(|(index, e)| TitledItem {
                    index,
                    title: e.title().unwrap_or_default().to_string(),
                })
                .collect(),
        ),
        Format::Attached => SectionBody::Attached(
            entries
                .iter()
                .enumerate()
                .map(|(index, e)| {
                    let attachment = e.attachment().unwrap_or_default().to_string();
                    AttachedItem {
                        index,
                        title: e.title().unwrap_or_default().to_string(),
                        description: e.body().to_string(),
                        status: probe(&attachment, &catalog.tags),
                        attachment,
                    }
                })
                .collect(),
        ),
    };
    Ok(Section {
        category: category.clone(),
        body,
    })
}

/// Non-empty sections for `tag` across all categories.
pub fn run<S: DataStore>(
    store: &S,
    catalog: &Catalog,
    tag: &str,
    highlight_tags: bool,
) -> Result<CmdResult> {
    require_tag(catalog, tag)?;
    let mut sections = Vec::new();
    for category in &catalog.categories {
        let section = section(store, catalog, category, tag, highlight_tags)?;
        if !section.body.is_empty() {
            sections.push(section);
        }
    }

    let mut result = CmdResult::default();
    if sections.is_empty() {
        result.add_message(CmdMessage::info(format!("Nothing filed under '{}'", tag)));
    }
    Ok(result.with_sections(sections))
}

/// The section of a single category, shown even when empty.
pub fn category<S: DataStore>(
    store: &S,
    catalog: &Catalog,
    category: &Category,
    tag: &str,
    highlight_tags: bool,
) -> Result<CmdResult> {
    require_tag(catalog, tag)?;
    let section = section(store, catalog, category, tag, highlight_tags)?;
    Ok(CmdResult::default().with_sections(vec![section]))
}

/// A single titled entry with its body lines and, for format 2, the probed
/// attachment.
pub fn entry<S: DataStore>(
    store: &S,
    catalog: &Catalog,
    category: &Category,
    tag: &str,
    index: usize,
    highlight_tags: bool,
) -> Result<CmdResult> {
    require_tag(catalog, tag)?;
    require_indexed(category)?;
    let entry = super::helpers::entry_at(store, category, tag, index)?;
    let lines = text_lines(entry.body(), &catalog.tags, highlight_tags);
    let attachment = entry.attachment().map(|a| probe(a, &catalog.tags));
    Ok(CmdResult::default().with_entry(EntryView {
        category: category.clone(),
        index,
        entry,
        lines,
        attachment,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attachment::AttachmentKind;
    use crate::commands::helpers::load_catalog;
    use crate::error::PensiveError;
    use crate::highlight::MatchSegment;
    use crate::model::Format;
    use crate::store::memory::fixtures::StoreFixture;

    fn fixture() -> StoreFixture {
        StoreFixture::new()
            .with_category("commands", Format::Note)
            .with_category("howtos", Format::Titled)
            .with_category("links", Format::Attached)
            .with_category("empty", Format::Titled)
            .with_tag("git")
            .with_tag("rust")
            .with_entry("commands", Entry::note("git", "git log\nsee rust"))
            .with_entry("howtos", Entry::titled("git", 2, "Second", ""))
            .with_entry("howtos", Entry::titled("git", 1, "First", ""))
            .with_entry("links", Entry::attached("git", 0, "Book", "the book", "https://git-scm.com"))
            .with_entry("links", Entry::attached("git", 1, "Ref", "", "rust"))
            .with_entry("links", Entry::attached("git", 2, "Gone", "", "/no/such/file"))
    }

    #[test]
    fn overview_skips_empty_categories() {
        let store = fixture().store;
        let catalog = load_catalog(&store).unwrap();
        let result = run(&store, &catalog, "git", false).unwrap();
        let names: Vec<&str> = result
            .sections
            .iter()
            .map(|s| s.category.name.as_str())
            .collect();
        assert_eq!(names, vec!["commands", "howtos", "links"]);
    }

    #[test]
    fn titled_items_are_ranked_by_position() {
        let store = fixture().store;
        let catalog = load_catalog(&store).unwrap();
        let result = run(&store, &catalog, "git", false).unwrap();
        match &result.sections[1].body {
            SectionBody::Titled(items) => {
                assert_eq!(items[0], TitledItem { index: 0, title: "First".into() });
                assert_eq!(items[1].title, "Second");
            }
            other => panic!("unexpected section {:?}", other),
        }
    }

    #[test]
    fn attachments_are_probed() {
        let store = fixture().store;
        let catalog = load_catalog(&store).unwrap();
        let result = run(&store, &catalog, "git", false).unwrap();
        let SectionBody::Attached(items) = &result.sections[2].body else {
            panic!("expected attachments");
        };
        assert_eq!(items[0].status.kind, AttachmentKind::Url);
        assert!(items[0].status.exists);
        assert_eq!(items[1].status.kind, AttachmentKind::Tag);
        assert!(items[1].status.exists);
        assert_eq!(items[2].status.kind, AttachmentKind::File);
        assert!(!items[2].status.exists);
    }

    #[test]
    fn note_lines_highlight_known_tags() {
        let store = fixture().store;
        let catalog = load_catalog(&store).unwrap();
        let result = run(&store, &catalog, "git", true).unwrap();
        let SectionBody::Note(lines) = &result.sections[0].body else {
            panic!("expected note");
        };
        assert_eq!(lines.len(), 2);
        assert!(lines[1]
            .segments
            .contains(&MatchSegment::Match("rust".into())));
    }

    #[test]
    fn single_category_shows_empty_section() {
        let fx = fixture();
        let store = fx.store;
        let catalog = load_catalog(&store).unwrap();
        let empty = catalog.category("empty").unwrap().clone();
        let result = category(&store, &catalog, &empty, "git", false).unwrap();
        assert_eq!(result.sections.len(), 1);
        assert!(result.sections[0].body.is_empty());
    }

    #[test]
    fn unknown_tag_is_reported() {
        let store = fixture().store;
        let catalog = load_catalog(&store).unwrap();
        assert!(matches!(
            run(&store, &catalog, "nope", false),
            Err(PensiveError::TagNotFound(_))
        ));
    }

    #[test]
    fn single_entry_view() {
        let store = fixture().store;
        let catalog = load_catalog(&store).unwrap();
        let links = catalog.category("links").unwrap().clone();
        let result = entry(&store, &catalog, &links, "git", 0, false).unwrap();
        let view = result.entry.unwrap();
        assert_eq!(view.entry.title(), Some("Book"));
        assert_eq!(view.lines[0].text(), "the book");
        assert!(view.attachment.unwrap().exists);
    }
}
