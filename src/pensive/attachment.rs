//! Attachment classification and existence probing.
//!
//! The kind of an attachment is read off its syntax:
//! - contains `://` → URL
//! - contains `/` → filesystem path (`~/` is expanded to the home directory)
//! - anything else → a tag reference; a trailing `.` turns `stem.` into the
//!   pattern `stem.*`
//!
//! Nothing here is cached: the result reflects the filesystem and the tag set
//! at the time of the call.

use directories::BaseDirs;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AttachmentKind {
    Url,
    File,
    Tag,
    /// `stem.` referencing every tag below `stem`.
    TagPattern,
}

impl fmt::Display for AttachmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AttachmentKind::Url => "URL",
            AttachmentKind::File => "File",
            AttachmentKind::Tag | AttachmentKind::TagPattern => "Tag",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentStatus {
    pub kind: AttachmentKind,
    pub exists: bool,
}

pub fn classify(attachment: &str) -> AttachmentKind {
    if attachment.contains("://") {
        AttachmentKind::Url
    } else if attachment.contains('/') {
        AttachmentKind::File
    } else if attachment.len() > 1 && attachment.ends_with('.') {
        AttachmentKind::TagPattern
    } else {
        AttachmentKind::Tag
    }
}

/// Classifies `attachment` and checks whether its target is there.
/// URLs are assumed to exist.
pub fn probe(attachment: &str, tags: &BTreeSet<String>) -> AttachmentStatus {
    let kind = classify(attachment);
    let exists = match kind {
        AttachmentKind::Url => true,
        AttachmentKind::File => expand_home(attachment).exists(),
        AttachmentKind::Tag => tags.contains(attachment),
        AttachmentKind::TagPattern => {
            tags.contains(attachment) || tags.contains(tag_stem(attachment))
        }
    };
    AttachmentStatus { kind, exists }
}

/// `stem.` → `stem`. Other input is returned unchanged.
pub fn tag_stem(attachment: &str) -> &str {
    attachment.strip_suffix('.').unwrap_or(attachment)
}

/// The glob a `stem.` reference expands to.
pub fn tag_pattern(attachment: &str) -> String {
    format!("{}.*", tag_stem(attachment))
}

/// Expands a leading `~/` to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(dirs) = BaseDirs::new() {
            return dirs.home_dir().join(rest);
        }
    }
    PathBuf::from(path)
}
