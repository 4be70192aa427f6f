use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{PensiveError, Result};

/// The shape of entries a category stores. Fixed when the category is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Format {
    /// One free-text note per tag, shown in full whenever the tag is queried.
    Note,
    /// Any number of titled notes per tag, listed by title.
    Titled,
    /// Titled notes carrying an attachment (URL, file path or tag reference).
    Attached,
}

impl Format {
    pub fn id(self) -> u8 {
        match self {
            Format::Note => 0,
            Format::Titled => 1,
            Format::Attached => 2,
        }
    }

    pub fn from_id(id: i64) -> Result<Self> {
        match id {
            0 => Ok(Format::Note),
            1 => Ok(Format::Titled),
            2 => Ok(Format::Attached),
            other => Err(PensiveError::Api(format!(
                "Unknown format {}, expected 0, 1 or 2",
                other
            ))),
        }
    }

    /// Formats whose entries are addressed by a display index.
    pub fn is_indexed(self) -> bool {
        !matches!(self, Format::Note)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for Format {
    type Err = PensiveError;

    fn from_str(s: &str) -> Result<Self> {
        let id: i64 = s
            .trim()
            .parse()
            .map_err(|_| PensiveError::Api(format!("Format must be 0, 1 or 2, got '{}'", s)))?;
        Format::from_id(id)
    }
}

/// Stable identifier of a category. Unlike the ordinal it never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CategoryId(pub i64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    /// Dense, zero-based position in creation order.
    pub ordinal: usize,
    pub name: String,
    pub format: Format,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub tag: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitledNote {
    pub tag: String,
    pub position: i64,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachedNote {
    pub tag: String,
    pub position: i64,
    pub title: String,
    pub body: String,
    pub attachment: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Note(Note),
    Titled(TitledNote),
    Attached(AttachedNote),
}

/// The columns that identify an entry inside its category.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntryKey {
    Note {
        tag: String,
    },
    Titled {
        tag: String,
        title: String,
        body: String,
    },
    Attached {
        tag: String,
        title: String,
        attachment: String,
    },
}

impl EntryKey {
    pub fn tag(&self) -> &str {
        match self {
            EntryKey::Note { tag }
            | EntryKey::Titled { tag, .. }
            | EntryKey::Attached { tag, .. } => tag,
        }
    }
}

impl Entry {
    pub fn note(tag: impl Into<String>, text: impl Into<String>) -> Self {
        Entry::Note(Note {
            tag: tag.into(),
            text: text.into(),
        })
    }

    pub fn titled(
        tag: impl Into<String>,
        position: i64,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Entry::Titled(TitledNote {
            tag: tag.into(),
            position,
            title: title.into(),
            body: body.into(),
        })
    }

    pub fn attached(
        tag: impl Into<String>,
        position: i64,
        title: impl Into<String>,
        body: impl Into<String>,
        attachment: impl Into<String>,
    ) -> Self {
        Entry::Attached(AttachedNote {
            tag: tag.into(),
            position,
            title: title.into(),
            body: body.into(),
            attachment: attachment.into(),
        })
    }

    pub fn format(&self) -> Format {
        match self {
            Entry::Note(_) => Format::Note,
            Entry::Titled(_) => Format::Titled,
            Entry::Attached(_) => Format::Attached,
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            Entry::Note(n) => &n.tag,
            Entry::Titled(t) => &t.tag,
            Entry::Attached(a) => &a.tag,
        }
    }

    /// Format 0 entries have no title.
    pub fn title(&self) -> Option<&str> {
        match self {
            Entry::Note(_) => None,
            Entry::Titled(t) => Some(&t.title),
            Entry::Attached(a) => Some(&a.title),
        }
    }

    /// The free text of the entry: the note itself, or the body of a titled entry.
    pub fn body(&self) -> &str {
        match self {
            Entry::Note(n) => &n.text,
            Entry::Titled(t) => &t.body,
            Entry::Attached(a) => &a.body,
        }
    }

    pub fn position(&self) -> i64 {
        match self {
            Entry::Note(_) => 0,
            Entry::Titled(t) => t.position,
            Entry::Attached(a) => a.position,
        }
    }

    pub fn attachment(&self) -> Option<&str> {
        match self {
            Entry::Attached(a) => Some(&a.attachment),
            _ => None,
        }
    }

    pub fn key(&self) -> EntryKey {
        match self {
            Entry::Note(n) => EntryKey::Note { tag: n.tag.clone() },
            Entry::Titled(t) => EntryKey::Titled {
                tag: t.tag.clone(),
                title: t.title.clone(),
                body: t.body.clone(),
            },
            Entry::Attached(a) => EntryKey::Attached {
                tag: a.tag.clone(),
                title: a.title.clone(),
                attachment: a.attachment.clone(),
            },
        }
    }

    /// Same entry filed under another tag, every other field untouched.
    pub fn with_tag(self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        match self {
            Entry::Note(n) => Entry::Note(Note { tag, ..n }),
            Entry::Titled(t) => Entry::Titled(TitledNote { tag, ..t }),
            Entry::Attached(a) => Entry::Attached(AttachedNote { tag, ..a }),
        }
    }
}

/// Snapshot of the registry and tag set, recomputed after every write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    pub categories: Vec<Category>,
    pub tags: BTreeSet<String>,
}

impl Catalog {
    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn category_at(&self, ordinal: usize) -> Option<&Category> {
        self.categories.iter().find(|c| c.ordinal == ordinal)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}
