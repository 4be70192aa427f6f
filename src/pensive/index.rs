//! # Category Letters and Entry Selectors
//!
//! Internally categories are addressed by [`CategoryId`](crate::model::CategoryId),
//! which never changes. Users address them by letter instead: the category at
//! ordinal 0 is `A`, ordinal 1 is `B`, and so on up to `Z`. Letters are a view
//! over the current ordinals, so removing a category shifts the letters of every
//! category created after it.
//!
//! Categories past the 26th are kept and listed, but cannot be addressed by
//! letter.
//!
//! ## Selector Grammar
//!
//! - **Category**: `L` (e.g. `A`), the whole category, or for titled formats a
//!   new entry when editing
//! - **Entry**: `Ln` (e.g. `B3`), display index `n` inside category `L`
//! - **Move target**: `L` or `L@TAG`, the category and an optional other tag
//!
//! Display indexes are ranks after sorting a tag's entries by position, so
//! they start at 0 and have no gaps.

use crate::error::{PensiveError, Result};
use crate::model::{Catalog, Category};
use std::fmt;
use std::str::FromStr;

pub const MAX_LETTERS: usize = 26;

/// The letter addressing `ordinal`, if it has one.
pub fn letter_for(ordinal: usize) -> Option<char> {
    if ordinal < MAX_LETTERS {
        Some((b'A' + ordinal as u8) as char)
    } else {
        None
    }
}

/// The ordinal a letter addresses.
pub fn ordinal_for(letter: char) -> Option<usize> {
    if letter.is_ascii_uppercase() {
        Some((letter as u8 - b'A') as usize)
    } else {
        None
    }
}

/// A category letter with an optional entry index: `A`, `B3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selector {
    pub letter: char,
    pub index: Option<usize>,
}

impl Selector {
    pub fn ordinal(&self) -> usize {
        // Parsing guarantees an uppercase letter.
        (self.letter as u8 - b'A') as usize
    }

    /// Looks the letter up in the current catalog.
    pub fn resolve<'a>(&self, catalog: &'a Catalog) -> Result<&'a Category> {
        catalog
            .category_at(self.ordinal())
            .ok_or_else(|| PensiveError::CategoryNotFound(self.letter.to_string()))
    }
}

impl FromStr for Selector {
    type Err = PensiveError;

    fn from_str(s: &str) -> Result<Self> {
        let mut chars = s.chars();
        let letter = chars
            .next()
            .filter(|c| ordinal_for(*c).is_some())
            .ok_or_else(|| invalid_selector(s))?;
        let rest = chars.as_str();
        let index = if rest.is_empty() {
            None
        } else {
            if !rest.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid_selector(s));
            }
            Some(rest.parse().map_err(|_| invalid_selector(s))?)
        };
        Ok(Selector { letter, index })
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(i) => write!(f, "{}{}", self.letter, i),
            None => write!(f, "{}", self.letter),
        }
    }
}

/// Destination of a move: `B` keeps the tag, `B@other` refiles under `other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveTarget {
    pub letter: char,
    pub tag: Option<String>,
}

impl MoveTarget {
    pub fn resolve<'a>(&self, catalog: &'a Catalog) -> Result<&'a Category> {
        let ordinal = (self.letter as u8 - b'A') as usize;
        catalog
            .category_at(ordinal)
            .ok_or_else(|| PensiveError::CategoryNotFound(self.letter.to_string()))
    }
}

impl FromStr for MoveTarget {
    type Err = PensiveError;

    fn from_str(s: &str) -> Result<Self> {
        let (head, tag) = match s.split_once('@') {
            Some((head, tag)) => (head, Some(tag.to_string())),
            None => (s, None),
        };
        let mut chars = head.chars();
        let letter = match (chars.next(), chars.next()) {
            (Some(c), None) if ordinal_for(c).is_some() => c,
            _ => return Err(invalid_selector(s)),
        };
        if matches!(tag.as_deref(), Some("")) {
            return Err(invalid_selector(s));
        }
        Ok(MoveTarget { letter, tag })
    }
}

/// `[i]` right-aligned so one- and two-digit indexes line up.
pub fn index_label(index: usize) -> String {
    if index < 10 {
        format!("    [{}]", index)
    } else {
        format!("   [{}]", index)
    }
}

fn invalid_selector(s: &str) -> PensiveError {
    PensiveError::Api(format!(
        "Invalid selector '{}', expected a category letter A-Z optionally followed by an index",
        s
    ))
}
