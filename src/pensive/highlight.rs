//! Highlighting of search hits and tag mentions.
//!
//! Highlighting never changes text; it splits a line into segments and marks
//! some of them. Rendering (colors) is up to the UI.

use std::collections::BTreeSet;

/// A segment of text, either plain or highlighted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchSegment {
    Plain(String),
    Match(String),
}

/// A line split into plain and highlighted segments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Highlighted {
    pub segments: Vec<MatchSegment>,
}

impl Highlighted {
    pub fn plain(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.is_empty() {
            return Self::default();
        }
        Self {
            segments: vec![MatchSegment::Plain(text)],
        }
    }

    pub fn has_match(&self) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, MatchSegment::Match(_)))
    }

    /// The plain text with all markup dropped.
    pub fn text(&self) -> String {
        self.segments
            .iter()
            .map(|s| match s {
                MatchSegment::Plain(t) | MatchSegment::Match(t) => t.as_str(),
            })
            .collect()
    }

    fn push_plain(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(MatchSegment::Plain(last)) = self.segments.last_mut() {
            last.push_str(text);
        } else {
            self.segments.push(MatchSegment::Plain(text.to_string()));
        }
    }

    fn push_match(&mut self, text: &str) {
        self.segments.push(MatchSegment::Match(text.to_string()));
    }
}

/// Marks every case-sensitive occurrence of `pattern` in `line`.
///
/// Occurrences are taken left to right and never overlap: after a match the
/// scan resumes at its end, so `"aa"` in `"aaa"` is marked once.
pub fn highlight_pattern(line: &str, pattern: &str) -> Highlighted {
    if pattern.is_empty() {
        return Highlighted::plain(line);
    }
    let mut out = Highlighted::default();
    let mut last = 0;
    for (start, matched) in line.match_indices(pattern) {
        out.push_plain(&line[last..start]);
        out.push_match(matched);
        last = start + matched.len();
    }
    out.push_plain(&line[last..]);
    out
}

/// Marks words of `line` naming a known tag.
///
/// Words are separated by single spaces. A word counts if it is a tag, or if
/// it becomes one after dropping one non-letter character from its start, its
/// end, or both (`(rust`, `rust,`, `(rust)`). Only the tag part is marked.
pub fn highlight_tags(line: &str, tags: &BTreeSet<String>) -> Highlighted {
    let mut out = Highlighted::default();
    for (n, word) in line.split(' ').enumerate() {
        if n > 0 {
            out.push_plain(" ");
        }
        match tag_span(word, tags) {
            Some((start, end)) => {
                out.push_plain(&word[..start]);
                out.push_match(&word[start..end]);
                out.push_plain(&word[end..]);
            }
            None => out.push_plain(word),
        }
    }
    out
}

/// Byte range of the tag inside `word`, if any.
fn tag_span(word: &str, tags: &BTreeSet<String>) -> Option<(usize, usize)> {
    if word.is_empty() {
        return None;
    }
    if tags.contains(word) {
        return Some((0, word.len()));
    }

    let first = word.chars().next()?;
    let last = word.chars().next_back()?;
    let head = if first.is_ascii_alphabetic() {
        None
    } else {
        Some(first.len_utf8())
    };
    let tail = if last.is_ascii_alphabetic() {
        None
    } else {
        Some(word.len() - last.len_utf8())
    };

    if let Some(start) = head {
        if tags.contains(&word[start..]) {
            return Some((start, word.len()));
        }
    }
    if let Some(end) = tail {
        if tags.contains(&word[..end]) {
            return Some((0, end));
        }
    }
    if let (Some(start), Some(end)) = (head, tail) {
        if start < end && tags.contains(&word[start..end]) {
            return Some((start, end));
        }
    }
    None
}
